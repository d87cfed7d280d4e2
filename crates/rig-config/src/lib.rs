//! Shared configuration for the rigd daemon.
//!
//! Resolution order is command line, then environment, then built-in
//! defaults. The same [`Config`] type serves the daemon binary and the
//! test suites, which construct it directly or via [`Config::load_from_iter`].

mod defaults;
mod device;
mod logging;

use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SCRIPT_DIR, default_log_filter, default_log_format,
    default_script_dir,
};
pub use device::{DeviceSpec, DeviceSpecParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
///
/// Each managed device is named by a [`DeviceSpec`] directive; its driver
/// script is looked up beneath [`Config::script_dir`].
#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(name = "rigd", version, about = "Per-device hardware control daemon")]
pub struct Config {
    /// Tracing filter expression, e.g. `info` or `rigd::controller=debug`.
    #[arg(long, env = "RIGD_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format.
    #[arg(long, env = "RIGD_LOG_FORMAT", default_value_t = LogFormat::default())]
    pub log_format: LogFormat,

    /// Directory holding the Lua driver scripts.
    #[arg(long, env = "RIGD_SCRIPT_DIR", default_value = DEFAULT_SCRIPT_DIR)]
    pub script_dir: Utf8PathBuf,

    /// Managed device in `name:driver` form; repeatable.
    #[arg(long = "device", env = "RIGD_DEVICES", value_delimiter = ',')]
    pub devices: Vec<DeviceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: defaults::default_log_filter().to_owned(),
            log_format: defaults::default_log_format(),
            script_dir: defaults::default_script_dir(),
            devices: Vec::new(),
        }
    }
}

/// Errors surfaced while resolving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command line or environment values failed to parse.
    #[error(transparent)]
    Invalid(#[from] clap::Error),
}

impl Config {
    /// Loads the configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an argument or environment
    /// override cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::try_parse()?)
    }

    /// Loads the configuration from an explicit argument iterator.
    ///
    /// The first item is treated as the binary name, matching
    /// `std::env::args` conventions. Environment overrides still apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an argument or environment
    /// override cannot be parsed.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Tracing filter expression for the subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Selected log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Directory holding the Lua driver scripts.
    #[must_use]
    pub fn script_dir(&self) -> &camino::Utf8Path {
        &self.script_dir
    }

    /// Devices the daemon manages.
    #[must_use]
    pub fn devices(&self) -> &[DeviceSpec] {
        &self.devices
    }

    /// Filesystem path of the driver script for the given device.
    #[must_use]
    pub fn driver_path(&self, spec: &DeviceSpec) -> Utf8PathBuf {
        self.script_dir.join(format!("{}.lua", spec.driver()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_apply_without_overrides() {
        let config = Config::load_from_iter(["rigd"]).expect("load defaults");
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.script_dir().as_str(), DEFAULT_SCRIPT_DIR);
        assert!(config.devices().is_empty());
    }

    #[test]
    fn cli_overrides_resolve() {
        let config = Config::load_from_iter([
            "rigd",
            "--log-filter",
            "rigd::controller=debug",
            "--log-format",
            "compact",
            "--script-dir",
            "/opt/rigd/drivers",
            "--device",
            "trx0:ft991a",
            "--device",
            "trx1:ic7300",
        ])
        .expect("load overrides");

        assert_eq!(config.log_filter(), "rigd::controller=debug");
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.script_dir().as_str(), "/opt/rigd/drivers");
        assert_eq!(config.devices().len(), 2);
        assert_eq!(config.devices()[0].name(), "trx0");
        assert_eq!(config.devices()[1].driver(), "ic7300");
    }

    #[rstest]
    #[case("trx0:ft991a", "/usr/share/rigd/drivers/ft991a.lua")]
    #[case("gpio0:sbc-gpio", "/usr/share/rigd/drivers/sbc-gpio.lua")]
    fn driver_paths_follow_script_dir(#[case] spec: &str, #[case] expected: &str) {
        let config = Config::default();
        let spec: DeviceSpec = spec.parse().expect("parse spec");
        assert_eq!(config.driver_path(&spec), expected);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let result = Config::load_from_iter(["rigd", "--log-format", "xml"]);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
