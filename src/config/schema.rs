use crate::scoring::{ScoringConfig, SelectionConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Normalization method and judge weights. Defaults apply when absent.
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    /// Selection mode and parameters. Required by the `select` subcommand.
    #[serde(default)]
    pub selection: Option<SelectionConfig>,
}

impl Config {
    /// Scoring configuration with defaults filled in.
    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}
