use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Prover configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Maximum number of rounds of a repeated tactic before it stops on its own.
    #[serde(default = "default_max_repeat_iterations")]
    pub max_repeat_iterations: usize,

    /// Whether replay rewrites recorded identifiers to the ones generated during replay.
    #[serde(default = "default_apply_replay_hints")]
    pub apply_replay_hints: bool,

    /// Maximum depth of a skeleton accepted by the builder. Replay itself does not recurse, but
    /// cloning, comparing and (de)serializing a `ProofSkeleton` does.
    #[serde(default = "default_max_replay_depth")]
    pub max_replay_depth: usize,
}

fn default_max_repeat_iterations() -> usize {
    100
}
fn default_apply_replay_hints() -> bool {
    true
}
fn default_max_replay_depth() -> usize {
    1_000
}

impl ProverConfig {
    /// Parses a configuration and validates it.
    ///
    /// # Example
    /// ```
    /// use seqprove::ProverConfig;
    ///
    /// let cfg = ProverConfig::from_toml_str("max_repeat_iterations = 7").unwrap();
    /// assert_eq!(cfg.max_repeat_iterations, 7);
    /// assert!(cfg.apply_replay_hints);
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ProverConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects limits that make every repeat or replay fail, and warns about suspicious ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_replay_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_replay_depth must be at least 1".to_owned(),
            ));
        }
        if self.max_repeat_iterations == 0 {
            tracing::warn!(
                max_repeat_iterations = self.max_repeat_iterations,
                "repeated tactics will never run"
            );
        }
        if !self.apply_replay_hints {
            tracing::warn!("replay hints disabled; proofs introducing fresh identifiers may not replay");
        }
        Ok(())
    }
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            max_repeat_iterations: default_max_repeat_iterations(),
            apply_replay_hints: default_apply_replay_hints(),
            max_replay_depth: default_max_replay_depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = ProverConfig::default();
        assert_eq!(cfg.max_repeat_iterations, 100);
        assert!(cfg.apply_replay_hints);
        assert_eq!(cfg.max_replay_depth, 1_000);
    }

    #[test]
    fn partial_toml_override() {
        let cfg = ProverConfig::from_toml_str(
            r#"
            apply_replay_hints = false
            max_replay_depth = 12
        "#,
        )
        .unwrap();
        assert!(!cfg.apply_replay_hints);
        assert_eq!(cfg.max_replay_depth, 12);
        // Defaults for unspecified fields
        assert_eq!(cfg.max_repeat_iterations, 100);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ProverConfig::from_toml_str("").unwrap(), ProverConfig::default());
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            ProverConfig::from_toml_str("max_replay_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ProverConfig::from_toml_str("max_replay_depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
