use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing [`DeviceSpec`] directives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceSpecParseError {
    /// Driver separator (`:`) was missing from the directive.
    #[error("device directive '{0}' is missing the driver separator ':'")]
    MissingDriver(String),
    /// The device name was empty.
    #[error("device directive '{0}' has an empty device name")]
    EmptyName(String),
    /// The driver name was empty.
    #[error("device directive '{0}' has an empty driver name")]
    EmptyDriver(String),
}

/// Declarative description of one managed device.
///
/// Directives take the form `name:driver`, for example `trx0:ft991a`:
/// the device is addressed as `trx0` and controlled by the driver script
/// `ft991a.lua`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeviceSpec {
    name: String,
    driver: String,
}

impl DeviceSpec {
    /// Creates a device specification.
    #[must_use]
    pub fn new(name: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
        }
    }

    /// Device identity, as callers address it.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Driver script stem controlling the device.
    #[must_use]
    pub fn driver(&self) -> &str {
        &self.driver
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.name, self.driver)
    }
}

impl FromStr for DeviceSpec {
    type Err = DeviceSpecParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (name, driver) = value
            .split_once(':')
            .ok_or_else(|| DeviceSpecParseError::MissingDriver(value.to_owned()))?;
        let name = name.trim();
        let driver = driver.trim();
        if name.is_empty() {
            return Err(DeviceSpecParseError::EmptyName(value.to_owned()));
        }
        if driver.is_empty() {
            return Err(DeviceSpecParseError::EmptyDriver(value.to_owned()));
        }
        Ok(Self::new(name, driver))
    }
}
