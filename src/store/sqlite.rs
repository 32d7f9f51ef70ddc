//! SQLite-based record store implementation.
//!
//! Ranking snapshots are written with `INSERT ... ON CONFLICT DO UPDATE` on
//! the snapshot key so that re-running a ranking job rewrites rows in place.

use super::{check_scope, PatternOrder, PatternQuery, RecordStore, VideoFilter, RANKING_CONFLICT_KEY};
use crate::error::{Result, SynthError};
use crate::models::{Pattern, RankingSnapshot, VideoRecord};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

const VIDEO_COLUMNS: &str = "id, url, niche, transcript, visual_style, onscreen_text, \
                             audio_id, audio_url, audio_hash, likes, comments";

const PATTERN_COLUMNS: &str = "id, niche, hook, core_value_loop, narrative_arc, \
                               visual_formula, cta, prevalence, engagement_score";

/// SQLite-based record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) a SQLite record store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::create_schema(&conn)?;

        info!("Initialized SQLite record store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT,
                niche TEXT,
                transcript TEXT,
                visual_style TEXT,
                onscreen_text TEXT,
                audio_id TEXT,
                audio_url TEXT,
                audio_hash TEXT,
                likes INTEGER,
                comments INTEGER,
                ingested_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_videos_niche ON videos(niche);

            CREATE TABLE IF NOT EXISTS patterns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                niche TEXT NOT NULL,
                hook TEXT NOT NULL,
                core_value_loop TEXT NOT NULL,
                narrative_arc TEXT NOT NULL,
                visual_formula TEXT NOT NULL,
                cta TEXT NOT NULL,
                prevalence REAL NOT NULL,
                engagement_score REAL NOT NULL,
                mined_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_patterns_niche ON patterns(niche);

            CREATE TABLE IF NOT EXISTS audio_daily_rankings (
                ranking_date TEXT NOT NULL,
                niche TEXT NOT NULL,
                audio_id TEXT NOT NULL,
                audio_hash TEXT NOT NULL,
                url TEXT,
                count INTEGER NOT NULL,
                avg_engagement REAL NOT NULL,
                rank INTEGER NOT NULL,
                UNIQUE ({key})
            );
            "#,
            key = RANKING_CONFLICT_KEY
        ))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SynthError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn video_from_row(row: &Row<'_>) -> rusqlite::Result<VideoRecord> {
        let likes: Option<i64> = row.get(9)?;
        let comments: Option<i64> = row.get(10)?;
        Ok(VideoRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            niche: row.get(2)?,
            transcript: row.get(3)?,
            visual_style: row.get(4)?,
            onscreen_text: row.get(5)?,
            audio_id: row.get(6)?,
            audio_url: row.get(7)?,
            audio_hash: row.get(8)?,
            likes: likes.map(|v| v.max(0) as u64),
            comments: comments.map(|v| v.max(0) as u64),
        })
    }

    fn pattern_from_row(row: &Row<'_>) -> rusqlite::Result<Pattern> {
        Ok(Pattern {
            id: row.get(0)?,
            niche: row.get(1)?,
            hook: row.get(2)?,
            core_value_loop: row.get(3)?,
            narrative_arc: row.get(4)?,
            visual_formula: row.get(5)?,
            cta: row.get(6)?,
            prevalence: row.get(7)?,
            engagement_score: row.get(8)?,
        })
    }
}

/// Counter as a SQLite integer. Values beyond `i64::MAX` are rejected.
fn sql_counter(field: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        SynthError::InvalidInput(format!(
            "{} {} exceeds the storable maximum {}",
            field,
            value,
            i64::MAX
        ))
    })
}

/// Build `?, ?, ?` for an `IN` clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self, records))]
    async fn insert_videos(&self, records: &[VideoRecord]) -> Result<Vec<i64>> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let ingested_at = Utc::now().to_rfc3339();
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let likes = record.likes.map(|v| sql_counter("likes", v)).transpose()?;
            let comments = record.comments.map(|v| sql_counter("comments", v)).transpose()?;
            tx.execute(
                r#"
                INSERT INTO videos
                (url, niche, transcript, visual_style, onscreen_text,
                 audio_id, audio_url, audio_hash, likes, comments, ingested_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    record.url,
                    record.niche,
                    record.transcript,
                    record.visual_style,
                    record.onscreen_text,
                    record.audio_id,
                    record.audio_url,
                    record.audio_hash,
                    likes,
                    comments,
                    ingested_at,
                ],
            )?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        info!("Stored {} video records", ids.len());
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn videos(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;

        let (clause, values): (String, Vec<Value>) = match (&filter.ids, &filter.niche) {
            (Some(ids), _) => (
                format!("WHERE id IN ({})", placeholders(ids.len())),
                ids.iter().map(|id| Value::Integer(*id)).collect(),
            ),
            (None, Some(niche)) => ("WHERE niche = ?".to_string(), vec![Value::Text(niche.clone())]),
            (None, None) => (String::new(), Vec::new()),
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM videos {} ORDER BY id",
            VIDEO_COLUMNS, clause
        ))?;
        let rows = stmt.query_map(params_from_iter(values.iter()), Self::video_from_row)?;
        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Fetched {} video records", result.len());
        Ok(result)
    }

    #[instrument(skip(self, patterns))]
    async fn insert_patterns(&self, patterns: &[Pattern]) -> Result<Vec<i64>> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let mined_at = Utc::now().to_rfc3339();
        let mut ids = Vec::with_capacity(patterns.len());

        for p in patterns {
            tx.execute(
                r#"
                INSERT INTO patterns
                (niche, hook, core_value_loop, narrative_arc, visual_formula, cta,
                 prevalence, engagement_score, mined_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    p.niche,
                    p.hook,
                    p.core_value_loop,
                    p.narrative_arc,
                    p.visual_formula,
                    p.cta,
                    p.prevalence,
                    p.engagement_score,
                    mined_at,
                ],
            )?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        info!("Stored {} patterns", ids.len());
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn patterns(&self, query: &PatternQuery) -> Result<Vec<Pattern>> {
        let conn = self.lock()?;

        let sql;
        let values: Vec<Value>;
        if let Some(ids) = &query.ids {
            sql = format!(
                "SELECT {} FROM patterns WHERE id IN ({}) ORDER BY id",
                PATTERN_COLUMNS,
                placeholders(ids.len())
            );
            values = ids.iter().map(|id| Value::Integer(*id)).collect();
        } else {
            let order = match query.order {
                PatternOrder::Prevalence => "prevalence",
                PatternOrder::Engagement => "engagement_score",
            };
            let mut clause = String::new();
            let mut v = Vec::new();
            if let Some(niche) = &query.niche {
                clause.push_str("WHERE niche = ?");
                v.push(Value::Text(niche.clone()));
            }
            let limit = query.limit.map(|l| l as i64).unwrap_or(-1);
            v.push(Value::Integer(limit));
            sql = format!(
                "SELECT {} FROM patterns {} ORDER BY {} DESC, id ASC LIMIT ?",
                PATTERN_COLUMNS, clause, order
            );
            values = v;
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), Self::pattern_from_row)?;
        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Fetched {} patterns", result.len());
        Ok(result)
    }

    #[instrument(skip(self, rows))]
    async fn replace_rankings(
        &self,
        ranking_date: NaiveDate,
        niche: &str,
        rows: &[RankingSnapshot],
    ) -> Result<usize> {
        check_scope(ranking_date, niche, rows)?;
        let date = ranking_date.format(DATE_FORMAT).to_string();

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let mut stale: Vec<Value> = vec![Value::Text(date.clone()), Value::Text(niche.to_string())];
        stale.extend(rows.iter().map(|r| Value::Text(r.audio_id.clone())));
        let removed = tx.execute(
            &format!(
                "DELETE FROM audio_daily_rankings \
                 WHERE ranking_date = ? AND niche = ? AND audio_id NOT IN ({})",
                placeholders(rows.len())
            ),
            params_from_iter(stale.iter()),
        )?;

        let sql = format!(
            r#"
            INSERT INTO audio_daily_rankings
            (ranking_date, niche, audio_id, audio_hash, url, count, avg_engagement, rank)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT ({}) DO UPDATE SET
                audio_hash = excluded.audio_hash,
                url = excluded.url,
                count = excluded.count,
                avg_engagement = excluded.avg_engagement,
                rank = excluded.rank
            "#,
            RANKING_CONFLICT_KEY
        );

        for row in rows {
            tx.execute(
                &sql,
                params![
                    date,
                    row.niche,
                    row.audio_id,
                    row.audio_hash,
                    row.url,
                    sql_counter("count", row.count)?,
                    row.avg_engagement,
                    row.rank as i64,
                ],
            )?;
        }

        tx.commit()?;
        debug!(
            "Upserted {} ranking rows for {} / {}, removed {} stale",
            rows.len(),
            ranking_date,
            niche,
            removed
        );
        Ok(rows.len())
    }

    #[instrument(skip(self))]
    async fn rankings(
        &self,
        ranking_date: NaiveDate,
        niche: &str,
        limit: usize,
    ) -> Result<Vec<RankingSnapshot>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT ranking_date, niche, audio_id, audio_hash, url, count, avg_engagement, rank
            FROM audio_daily_rankings
            WHERE ranking_date = ?1 AND niche = ?2
            ORDER BY rank
            LIMIT ?3
            "#,
        )?;

        let rows = stmt.query_map(
            params![ranking_date.format(DATE_FORMAT).to_string(), niche, limit as i64],
            |row| {
                let count: i64 = row.get(5)?;
                let rank: i64 = row.get(7)?;
                Ok((
                    row.get::<_, String>(0)?,
                    RankingSnapshot {
                        ranking_date,
                        niche: row.get(1)?,
                        audio_id: row.get(2)?,
                        audio_hash: row.get(3)?,
                        url: row.get(4)?,
                        count: count.max(0) as u64,
                        avg_engagement: row.get(6)?,
                        rank: rank.max(0) as u32,
                    },
                ))
            },
        )?;

        let mut result = Vec::new();
        for row in rows {
            let (stored_date, mut snapshot) = row?;
            snapshot.ranking_date = NaiveDate::parse_from_str(&stored_date, DATE_FORMAT)?;
            result.push(snapshot);
        }

        debug!("Fetched {} ranking rows for {} / {}", result.len(), ranking_date, niche);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(date: NaiveDate, niche: &str, audio_id: &str, count: u64, rank: u32) -> RankingSnapshot {
        RankingSnapshot {
            ranking_date: date,
            niche: niche.to_string(),
            audio_id: audio_id.to_string(),
            audio_hash: format!("h-{}", audio_id),
            url: Some(format!("https://example.com/{}", audio_id)),
            count,
            avg_engagement: count as f64 * 1.5,
            rank,
        }
    }

    #[tokio::test]
    async fn test_sqlite_record_store_videos() {
        let store = SqliteRecordStore::in_memory().unwrap();

        let ids = store
            .insert_videos(&[
                VideoRecord {
                    niche: Some("tech".to_string()),
                    transcript: Some("Hook. Body. Cta.".to_string()),
                    audio_id: Some("a1".to_string()),
                    likes: Some(10),
                    ..Default::default()
                },
                VideoRecord {
                    niche: Some("fitness".to_string()),
                    ..Default::default()
                },
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let tech = store.videos(&VideoFilter::niche(Some("tech"))).await.unwrap();
        assert_eq!(tech.len(), 1);
        assert_eq!(tech[0].id, Some(ids[0]));
        assert_eq!(tech[0].likes, Some(10));
        assert_eq!(tech[0].comments, None);
        assert_eq!(tech[0].audio_id.as_deref(), Some("a1"));

        let all = store.videos(&VideoFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let picked = store.videos(&VideoFilter::ids(vec![ids[1]])).await.unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].niche.as_deref(), Some("fitness"));
    }

    #[tokio::test]
    async fn test_sqlite_patterns_roundtrip_ids_and_order() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let patterns = vec![
            Pattern {
                hook: "low".to_string(),
                niche: "tech".to_string(),
                prevalence: 0.25,
                engagement_score: 40.0,
                ..Default::default()
            },
            Pattern {
                hook: "high".to_string(),
                niche: "tech".to_string(),
                prevalence: 0.75,
                engagement_score: 10.0,
                ..Default::default()
            },
        ];
        let ids = store.insert_patterns(&patterns).await.unwrap();
        assert_eq!(ids.len(), 2);

        let by_prevalence = store
            .patterns(&PatternQuery {
                niche: Some("tech".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_prevalence[0].hook, "high");
        assert_eq!(by_prevalence[0].id, Some(ids[1]));

        let by_engagement = store
            .patterns(&PatternQuery {
                niche: Some("tech".to_string()),
                order: PatternOrder::Engagement,
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_engagement.len(), 1);
        assert_eq!(by_engagement[0].hook, "low");

        let other = store
            .patterns(&PatternQuery {
                niche: Some("fitness".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_rankings_upsert_in_place() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let rows = [snapshot(date, "tech", "a1", 2, 1), snapshot(date, "tech", "a2", 1, 2)];

        store.replace_rankings(date, "tech", &rows).await.unwrap();
        let first = store.rankings(date, "tech", 10).await.unwrap();
        store.replace_rankings(date, "tech", &rows).await.unwrap();
        let second = store.rankings(date, "tech", 10).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.len(), 2);

        // overwrite on the key, other niches keep their own rows
        store
            .replace_rankings(date, "fitness", &[snapshot(date, "fitness", "a1", 1, 1)])
            .await
            .unwrap();
        store
            .replace_rankings(
                date,
                "tech",
                &[snapshot(date, "tech", "a1", 2, 1), snapshot(date, "tech", "a2", 5, 2)],
            )
            .await
            .unwrap();
        let tech = store.rankings(date, "tech", 10).await.unwrap();
        assert_eq!(tech.len(), 2);
        assert_eq!(tech[0].audio_id, "a1");
        assert_eq!(tech[1].audio_id, "a2");
        assert_eq!(tech[1].count, 5);
        assert_eq!(store.rankings(date, "fitness", 10).await.unwrap().len(), 1);

        let limited = store.rankings(date, "tech", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].ranking_date, date);
    }

    #[tokio::test]
    async fn test_sqlite_replace_drops_stale_rows() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let next_day = date.succ_opt().unwrap();

        store
            .replace_rankings(
                date,
                "tech",
                &[snapshot(date, "tech", "a1", 2, 1), snapshot(date, "tech", "a2", 1, 2)],
            )
            .await
            .unwrap();
        store
            .replace_rankings(next_day, "tech", &[snapshot(next_day, "tech", "a1", 1, 1)])
            .await
            .unwrap();

        let latest = vec![snapshot(date, "tech", "a2", 3, 1)];
        store.replace_rankings(date, "tech", &latest).await.unwrap();
        assert_eq!(store.rankings(date, "tech", 10).await.unwrap(), latest);
        assert_eq!(store.rankings(next_day, "tech", 10).await.unwrap().len(), 1);

        store.replace_rankings(date, "tech", &[]).await.unwrap();
        assert!(store.rankings(date, "tech", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_replace_rejects_rows_outside_scope() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        let err = store
            .replace_rankings(date, "tech", &[snapshot(date, "fitness", "a1", 1, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, SynthError::InvalidInput(_)));
        assert!(store.rankings(date, "fitness", 10).await.unwrap().is_empty());
    }

    #[test]
    fn test_ranking_conflict_key_in_schema() {
        assert_eq!(RANKING_CONFLICT_KEY, "ranking_date, niche, audio_id");

        let store = SqliteRecordStore::in_memory().unwrap();
        let conn = store.lock().unwrap();
        let schema: String = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'audio_daily_rankings'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(schema.contains("UNIQUE (ranking_date, niche, audio_id)"));
    }

    #[tokio::test]
    async fn test_sqlite_rejects_counters_beyond_i64() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let huge = i64::MAX as u64 + 10;

        let err = store
            .insert_videos(&[
                VideoRecord {
                    audio_id: Some("ok".to_string()),
                    likes: Some(1),
                    ..Default::default()
                },
                VideoRecord {
                    likes: Some(huge),
                    ..Default::default()
                },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, SynthError::InvalidInput(ref m) if m.contains("likes")));
        // the whole batch is rolled back
        assert!(store.videos(&VideoFilter::all()).await.unwrap().is_empty());

        let max = i64::MAX as u64;
        store
            .insert_videos(&[VideoRecord {
                likes: Some(max),
                comments: Some(max),
                ..Default::default()
            }])
            .await
            .unwrap();
        let stored = store.videos(&VideoFilter::all()).await.unwrap();
        assert_eq!(stored[0].likes, Some(max));
        assert_eq!(stored[0].comments, Some(max));
    }

    #[tokio::test]
    async fn test_sqlite_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("viralsynth.db");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        {
            let store = SqliteRecordStore::new(&path).unwrap();
            store
                .replace_rankings(date, "all", &[snapshot(date, "all", "a1", 3, 1)])
                .await
                .unwrap();
        }

        let store = SqliteRecordStore::new(&path).unwrap();
        let rows = store.rankings(date, "all", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 3);
    }
}
