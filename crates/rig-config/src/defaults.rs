//! Built-in defaults shared by the daemon and the test suites.

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default directory searched for Lua driver scripts.
pub const DEFAULT_SCRIPT_DIR: &str = "/usr/share/rigd/drivers";

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default driver script directory.
#[must_use]
pub fn default_script_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SCRIPT_DIR)
}
