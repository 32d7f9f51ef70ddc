//! CLI command implementations.

mod choose;
mod config;
mod ingest;
mod init;
mod mine;
mod patterns;
mod rank;
mod trending;

pub use choose::run_choose;
pub use config::run_config;
pub use ingest::{parse_records, run_ingest};
pub use init::run_init;
pub use mine::run_mine;
pub use patterns::run_patterns;
pub use rank::run_rank;
pub use trending::run_trending;
