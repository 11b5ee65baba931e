mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/fairrank/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("fairrank")
}

/// Get the default config file path (~/.config/fairrank/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file.
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/fairrank/config.yaml); a missing default file yields the
///   built-in defaults, while an explicitly given path must exist.
///
/// # Errors
///
/// Returns an error if an explicit config file does not exist, cannot be
/// read, or cannot be parsed.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ScoringMethod, SelectionMode};

    #[test]
    fn test_explicit_missing_config_errors() {
        let err = load_config(Some(PathBuf::from("/nonexistent/config.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
scoring:
  method: ROBUST_MAD
  judge_weights:
    j-chief: 2.0
selection:
  mode: PER_JUDGE_TOP_N
  top_n: 5
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let scoring = config.effective_scoring();
        assert_eq!(scoring.method, ScoringMethod::RobustMad);
        assert_eq!(scoring.judge_weight("j-chief"), 2.0);
        let selection = config.selection.unwrap();
        assert_eq!(selection.mode, SelectionMode::PerJudgeTopN);
        assert_eq!(selection.top_n, Some(5));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let yaml = "{}";
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.effective_scoring().method, ScoringMethod::ZScore);
        assert!(config.selection.is_none());
    }

    #[test]
    fn test_config_rejects_unknown_sections() {
        let yaml = "queries: []\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }
}
