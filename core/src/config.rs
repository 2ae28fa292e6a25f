use serde::{Deserialize, Serialize};

/// Name matching settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Groups of characters OCR confuses with each other. After case-folding,
    /// every character of a group is replaced by the group's first character.
    pub confusables: Vec<Vec<char>>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            confusables: vec![vec!['o', '0'], vec!['l', '1', 'i', '|']],
        }
    }
}

/// Ladder construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LadderConfig {
    /// Highest rank a ladder screenshot can show. Anything above is an OCR
    /// run-on and gets cut back to its leading two digits.
    #[serde(default = "default_max_rank")]
    pub max_rank: u32,
    /// Drop ladder rows whose score reads as zero.
    #[serde(default = "default_drop_zero_scores")]
    pub drop_zero_scores: bool,
}

fn default_max_rank() -> u32 {
    99
}

fn default_drop_zero_scores() -> bool {
    true
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            max_rank: default_max_rank(),
            drop_zero_scores: default_drop_zero_scores(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub ladder: LadderConfig,
}

impl EngineConfig {
    /// Load from the data/ directory.
    /// In tests, use EngineConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/engine_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self::default()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let Some(group) = self.matcher.confusables.iter().find(|g| g.is_empty()) {
            anyhow::bail!("empty confusable group in matcher config: {group:?}");
        }
        if self.ladder.max_rank < 10 {
            anyhow::bail!(
                "ladder.max_rank must be at least 10, got {}",
                self.ladder.max_rank
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_loads_and_matches_defaults() {
        let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let config = EngineConfig::load(data_dir).expect("data/engine_config.json loads");
        assert_eq!(config, EngineConfig::default_test());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/no-such-dir");
        assert!(EngineConfig::load(data_dir).is_err());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "ladder": { "max_rank": 50 } }"#).unwrap();
        assert_eq!(config.ladder.max_rank, 50);
        assert!(config.ladder.drop_zero_scores);
        assert_eq!(config.matcher, MatcherConfig::default());
    }

    #[test]
    fn confusables_parse_from_single_char_strings() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "matcher": { "confusables": [["s", "5"]] } }"#).unwrap();
        assert_eq!(config.matcher.confusables, vec![vec!['s', '5']]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_group_is_rejected() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "matcher": { "confusables": [[]] } }"#).unwrap();
        assert!(config.validate().is_err());
    }
}
