//! Default configuration values shared by the library and the CLI
//!
//! These constants keep the waiter and the command-line defaults in sync.

/// Application name, used for the state directory
pub const APP_NAME: &str = "cloudmap";

/// Default AWS region when neither a flag nor the environment sets one
pub const DEFAULT_REGION: &str = "us-east-1";

/// File name of the state database inside the data directory
pub const STATE_DB_FILE: &str = "state.db";

/// Default time to wait for a Cloud Map operation to finish (5 minutes)
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 300;

/// Initial delay between operation status polls
pub const OPERATION_POLL_INITIAL_DELAY_MS: u64 = 1000;

/// Cap on the delay between operation status polls
pub const OPERATION_POLL_MAX_DELAY_SECS: u64 = 10;
