use serde::Deserialize;

use proc_journal::JournalConfig;

/// Top-level runtime configuration, loadable from a TOML file (§1
/// "Configuration").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub journal: JournalConfig,
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str) -> Result<RuntimeConfig, toml::de::Error> {
        toml::from_str(text)
    }
}
