use std::fs;
use std::path::Path;

use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};

use ere_dialogue::DialogueConfig;
use ere_mechanics::EncounterConfig;

/// Settings for both engines, loaded from an optional JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub encounter: EncounterConfig,
    pub dialogue: DialogueConfig,
}

impl EngineConfig {
    /// Read the config file, or use defaults when none is given.
    pub fn load(path: Option<&Path>) -> miette::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }
}
