use serde::Deserialize;

/// Admission limits for a [`crate::JournalQueue`] (§4.H), loadable from
/// the runtime's TOML configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Total approximate byte size of entries in flight before the
    /// queue is considered full.
    pub max_size: i64,
    /// Total number of entries in flight before the queue is considered
    /// full.
    pub max_len: i64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        JournalConfig {
            max_size: i64::MAX,
            max_len: i64::MAX,
        }
    }
}
