//! Runtime configuration of the GDAL library.
//!
//! GDAL reads its configuration options from environment variables or from
//! `CPLSetConfigOption`. The command line accepts the same `--config KEY=VALUE`
//! pairs as the GDAL utilities and applies them here before any dataset is
//! opened.
//!
//! ```
//! use tileburn::config::ConfigOption;
//!
//! let option: ConfigOption = "GDAL_CACHEMAX=512".parse().unwrap();
//! assert_eq!(option.key, "GDAL_CACHEMAX");
//! assert_eq!(option.value, "512");
//! ```

use std::fmt;
use std::str::FromStr;

use gdal::config::{set_config_option, set_error_handler};
use gdal::errors::CplErrType;
use log::{debug, error, trace, warn};

use crate::errors::{Result, TileburnError};

/// A single `KEY=VALUE` GDAL configuration option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigOption {
    pub key: String,
    pub value: String,
}

impl FromStr for ConfigOption {
    type Err = TileburnError;

    fn from_str(s: &str) -> Result<Self> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| TileburnError::InvalidConfigOption(s.to_string()))?;
        let key = key.trim();
        // GDAL expects a well formed token as key
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TileburnError::InvalidConfigOption(s.to_string()));
        }
        Ok(ConfigOption {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Set every option as a process wide GDAL configuration option.
pub fn apply(options: &[ConfigOption]) -> Result<()> {
    for option in options {
        debug!("Setting GDAL config option {}", option);
        set_config_option(&option.key, &option.value)?;
    }
    Ok(())
}

/// Forward messages emitted by GDAL to the `log` facade instead of stderr.
pub fn route_gdal_messages_to_log() {
    set_error_handler(|class, number, msg| match class {
        CplErrType::None => {}
        CplErrType::Debug => trace!(target: "gdal", "{}", msg),
        CplErrType::Warning => warn!(target: "gdal", "{}", msg),
        CplErrType::Failure | CplErrType::Fatal => {
            error!(target: "gdal", "error {}: {}", number, msg)
        }
    });
}
