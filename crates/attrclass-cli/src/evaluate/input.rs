use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use attrclass_classifiers::config::{FailurePolicy, TrainingConfig};

/// Everything one `attrclass` run needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluateConfig {
    /// Dataset to train on and replay. `None` uses the bundled iris data.
    pub data: Option<PathBuf>,
    pub training: TrainingConfig,
    /// Print the one-line self-check summary instead of the per-class report.
    pub summary: bool,
    pub parallel: bool,
    pub failure_policy: FailurePolicy,
    pub matrix_tsv: Option<PathBuf>,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            data: None,
            training: TrainingConfig::default(),
            summary: false,
            parallel: false,
            failure_policy: FailurePolicy::Abort,
            matrix_tsv: None,
        }
    }
}

/// Load an evaluation configuration from a JSON file.
pub fn load_evaluate_config<P: AsRef<Path>>(path: P) -> Result<EvaluateConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: EvaluateConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

impl EvaluateConfig {
    /// Start from the config file (or defaults) and apply command line overrides.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => {
                log::info!("[attrclass] Using config: {:?}", path);
                load_evaluate_config(path)?
            }
            None => EvaluateConfig::default(),
        };

        if let Some(data) = matches.get_one::<PathBuf>("data") {
            config.data = Some(data.clone());
        }
        if let Some(data) = &config.data {
            validate_dataset_file(data)?;
        }
        if matches.get_flag("summary") {
            config.summary = true;
        }
        if matches.get_flag("parallel") {
            config.parallel = true;
        }
        if matches.get_flag("skip_failures") {
            config.failure_policy = FailurePolicy::Skip;
        }
        if let Some(path) = matches.get_one::<PathBuf>("matrix_tsv") {
            config.matrix_tsv = Some(path.clone());
        }
        Ok(config)
    }
}

pub fn validate_dataset_file(path: &Path) -> Result<()> {
    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("arff") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .arff or .csv extension: {}", path.display()),
    }
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrclass_classifiers::config::TransformPolicy;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EvaluateConfig = serde_json::from_str(r#"{"summary": true}"#).unwrap();
        assert!(config.summary);
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn parses_training_section() {
        let config: EvaluateConfig = serde_json::from_str(
            r#"{
                "training": {
                    "algorithm": "ZeroR",
                    "algorithm_args": [],
                    "transform": null,
                    "transform_policy": "training_only"
                },
                "failure_policy": "skip"
            }"#,
        )
        .unwrap();
        assert_eq!(config.training.algorithm, "ZeroR");
        assert_eq!(config.training.transform, None);
        assert_eq!(config.training.transform_policy, TransformPolicy::TrainingOnly);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(validate_dataset_file(Path::new("data.tsv")).is_err());
        assert!(validate_dataset_file(Path::new("/nonexistent/data.arff")).is_err());
    }
}
