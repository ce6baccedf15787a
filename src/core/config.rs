//! Engine configuration, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::directive::MatchMode;
use crate::core::expand::DEFAULT_MAX_DEPTH;
use crate::core::log::LogLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Settings that shape expansion but not the word content itself.
///
/// Every field has a default, so a RON file only needs the fields it
/// changes:
///
/// ```ron
/// (
///     variants: "sp",
///     log_level: Warn,
///     seed: Some(42),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Variant identifier characters; position `i` names variant slot `i`.
    pub variants: String,
    pub log_level: LogLevel,
    pub match_mode: MatchMode,
    /// Maximum nesting of directive expansion.
    pub max_depth: usize,
    /// Fixed RNG seed. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            variants: String::new(),
            log_level: LogLevel::default(),
            match_mode: MatchMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.match_mode, MatchMode::FirstClose);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.seed.is_none());
    }

    #[test]
    fn parse_partial_ron() {
        let config = EngineConfig::parse_ron(
            r#"(
                variants: "sp",
                log_level: Warn,
                match_mode: Balanced,
                seed: Some(7),
            )"#,
        )
        .unwrap();
        assert_eq!(config.variants, "sp");
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.match_mode, MatchMode::Balanced);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn parse_empty_struct() {
        assert_eq!(EngineConfig::parse_ron("()").unwrap(), EngineConfig::default());
    }

    #[test]
    fn ron_round_trip() {
        let config = EngineConfig {
            variants: "abc".to_string(),
            max_depth: 8,
            ..EngineConfig::default()
        };
        let serialized = ron::to_string(&config).unwrap();
        assert_eq!(EngineConfig::parse_ron(&serialized).unwrap(), config);
    }

    #[test]
    fn rejects_bad_ron() {
        assert!(EngineConfig::parse_ron("(log_level: Loud)").is_err());
    }
}
