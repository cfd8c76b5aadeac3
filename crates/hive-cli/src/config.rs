use std::path::{Path, PathBuf};

use anyhow::Context;
use hive_key::AccessorConfig;
use hive_store::FileStoreConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration, read from TOML.
///
/// ```toml
/// store = "settings.hive"
///
/// [file]
/// sync_mode = "every-write"
///
/// [accessor]
/// max_read_attempts = 3
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    pub store: PathBuf,
    pub file: FileStoreConfig,
    pub accessor: AccessorConfig,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from("hive.db"),
            file: FileStoreConfig::default(),
            accessor: AccessorConfig::default(),
        }
    }
}

impl HiveConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.accessor.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_store::SyncMode;

    #[test]
    fn default_config() {
        let c = HiveConfig::default();
        assert_eq!(c.store, PathBuf::from("hive.db"));
        assert_eq!(c.file.sync_mode, SyncMode::OsDefault);
        assert_eq!(c.accessor.max_read_attempts, 2);
    }

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.toml");
        std::fs::write(
            &path,
            "store = \"x.db\"\n[file]\nsync_mode = \"every-write\"\n",
        )
        .unwrap();
        let c = HiveConfig::load(&path).unwrap();
        assert_eq!(c.store, PathBuf::from("x.db"));
        assert_eq!(c.file.sync_mode, SyncMode::EveryWrite);
        assert_eq!(c.accessor, AccessorConfig::default());
    }

    #[test]
    fn invalid_accessor_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.toml");
        std::fs::write(&path, "[accessor]\nmax_read_attempts = 0\n").unwrap();
        assert!(HiveConfig::load(&path).is_err());
    }
}
