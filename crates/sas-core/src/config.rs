//! Client configuration shared by the long-poll parsers.
//!
//! The configuration is injected once, when the parser registry is built,
//! and treated as read-only for the lifetime of every parser.
//!
//! # Example
//!
//! ```
//! use sas_core::SasClientConfig;
//!
//! let config: SasClientConfig = serde_json::from_str(
//!     r#"{ "address": 3, "client_number": 1, "asset_number": 1234 }"#,
//! )
//! .unwrap();
//!
//! config.validate().unwrap();
//! assert_eq!(config.address, 3);
//! assert_eq!(config.accounting_denomination, 0x01);
//! ```

use crate::{
    Result,
    constants::{DEFAULT_ADDRESS, DEFAULT_SAS_VERSION},
    error::Error,
    types::{Address, Denomination},
};
use serde::{Deserialize, Serialize};

/// Per-client (per-host link) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SasClientConfig {
    /// Gaming machine address on this link (1-127)
    pub address: u8,

    /// Index of the host link this configuration belongs to
    pub client_number: u8,

    /// Accounting denomination code reported by machine information polls
    pub accounting_denomination: u8,

    /// AFT asset number the machine answers to
    pub asset_number: u32,

    /// Three-digit SAS version string
    pub sas_version: String,
}

impl Default for SasClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            client_number: 0,
            accounting_denomination: 0x01,
            asset_number: 0,
            sas_version: DEFAULT_SAS_VERSION.to_string(),
        }
    }
}

impl SasClientConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the address is out of range, the accounting
    /// denomination is not in the denomination table, or the SAS version is
    /// not three ASCII digits.
    pub fn validate(&self) -> Result<()> {
        Address::new(self.address)?;

        if Denomination::from_code(self.accounting_denomination).is_none() {
            return Err(Error::config(format!(
                "Unknown accounting denomination code 0x{:02X}",
                self.accounting_denomination
            )));
        }

        if self.sas_version.len() != 3 || !self.sas_version.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::config(format!(
                "SAS version must be three digits, got '{}'",
                self.sas_version
            )));
        }

        Ok(())
    }

    /// Accounting denomination as a table entry.
    #[must_use]
    pub fn accounting_denomination(&self) -> Option<Denomination> {
        Denomination::from_code(self.accounting_denomination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SasClientConfig::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_address() {
        let config = SasClientConfig {
            address: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_accounting_denomination() {
        let config = SasClientConfig {
            accounting_denomination: 0x00,
            ..Default::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("accounting denomination"));
    }

    #[test]
    fn test_invalid_version() {
        let config = SasClientConfig {
            sas_version: "6.03".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SasClientConfig = serde_json::from_str(r#"{ "client_number": 2 }"#).unwrap();
        assert_eq!(config.client_number, 2);
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.sas_version, DEFAULT_SAS_VERSION);
    }
}
