mod reader;
mod types;

pub use reader::LogReader;
pub use types::*;

/// File name the harness writes inside each run directory
pub const LOG_FILE_NAME: &str = "tsung.log";

/// Prefix shared by every transaction metric
pub const TRANSACTION_PREFIX: &str = "tr_";

/// Continuous metrics recorded by the harness itself
pub const MAIN_NAMES: &[&str] = &["connect", "page", "request"];

/// Byte counters
pub const NETWORK_NAMES: &[&str] = &["size_sent", "size_rcv"];

/// Connection and user counters
pub const USER_NAMES: &[&str] = &["connected", "finish_users_count", "users", "users_count"];
