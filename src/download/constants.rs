//! Constants for the download module (timeouts, retry budget, file modes).

use std::time::Duration;

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout, body included (10 seconds).
pub const READ_TIMEOUT_SECS: u64 = 10;

/// Attempts per asset, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Constant pause between attempts. Not escalated between retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Permissions for pack directories.
#[cfg(unix)]
pub(crate) const PACK_DIR_MODE: u32 = 0o755;

/// Permissions for downloaded assets: owner read/write, others read.
#[cfg(unix)]
pub(crate) const ASSET_FILE_MODE: u32 = 0o644;
