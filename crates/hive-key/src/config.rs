use serde::{Deserialize, Serialize};

use crate::error::{KeyError, KeyResult};

/// Accessor read behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorConfig {
    /// How many size-query/fill rounds a variable-length read may take.
    ///
    /// A value that grows between the size query and the fill read fails
    /// the round; after this many rounds the read reports no value. `1`
    /// never retries.
    pub max_read_attempts: u32,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            max_read_attempts: 2,
        }
    }
}

impl AccessorConfig {
    /// Single-round reads: a concurrent resize always reads as absent.
    pub fn no_retry() -> Self {
        Self {
            max_read_attempts: 1,
        }
    }

    pub fn validate(&self) -> KeyResult<()> {
        if self.max_read_attempts == 0 {
            return Err(KeyError::Config(
                "max_read_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> KeyResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| KeyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
