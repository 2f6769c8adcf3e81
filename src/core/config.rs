//! Pipeline configuration from YAML

use crate::core::Pipeline;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Pipeline settings loaded from YAML
///
/// Steps themselves are always registered in code; configuration only
/// names the pipeline and switches named steps off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Optional pipeline description
    #[serde(default)]
    pub description: Option<String>,

    /// Names of steps that never run, whatever their own `is_enabled` says
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Pipeline name must not be empty");
        }

        let mut seen = HashSet::new();
        for name in &self.disabled {
            if name.trim().is_empty() {
                anyhow::bail!("Disabled step names must not be empty");
            }
            if !seen.insert(name) {
                anyhow::bail!("Step '{}' is listed as disabled more than once", name);
            }
        }

        Ok(())
    }

    /// Build an empty pipeline from this configuration
    pub fn to_pipeline(&self) -> Pipeline {
        Pipeline::from_config(self)
    }
}
