use anyhow::{Context, Result};
use std::path::Path;

use attrclass_classifiers::datasets::{self, IRIS_SOURCE};
use attrclass_classifiers::evaluation::{evaluate, evaluate_parallel, Evaluation};
use attrclass_classifiers::io::read_dataset;
use attrclass_classifiers::{ClassifierModel, KeyedInstanceSet, Registry, SelfCheckSummary};

use crate::evaluate::input::EvaluateConfig;

/// Result of one run, ready to print.
#[derive(Debug)]
pub struct EvaluateOutcome {
    pub source: String,
    pub evaluation: Evaluation,
}

impl EvaluateOutcome {
    pub fn summary(&self) -> SelfCheckSummary {
        SelfCheckSummary::from_evaluation(self.source.clone(), &self.evaluation)
    }

    /// Text printed on stdout for this run.
    pub fn render(&self, summary: bool) -> String {
        if summary {
            format!("{}\n", self.summary())
        } else {
            self.evaluation.matrix.get_results()
        }
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Train on the configured dataset and replay every record through the model.
pub fn run_evaluation(config: &EvaluateConfig, registry: &Registry) -> Result<EvaluateOutcome> {
    let (data, source) = match &config.data {
        Some(path) => (read_dataset(path)?, source_name(path)),
        None => (datasets::iris()?, IRIS_SOURCE.to_string()),
    };
    log::info!("[attrclass] Evaluating {} with {}", source, config.training.algorithm);

    let model = ClassifierModel::train(&config.training, registry, &data)?;
    let instances = KeyedInstanceSet::from_dataset(&data)?;

    let evaluation = if config.parallel {
        evaluate_parallel(&model, &instances, config.failure_policy)?
    } else {
        evaluate(&model, &instances, config.failure_policy)?
    };

    if let Some(path) = &config.matrix_tsv {
        evaluation
            .matrix
            .write_tsv(path)
            .with_context(|| format!("Failed to write confusion matrix: {}", path.display()))?;
        log::info!("[attrclass] Wrote confusion matrix to {}", path.display());
    }

    for line in evaluation.matrix.result_lines() {
        log::info!("{}", line);
    }

    Ok(EvaluateOutcome { source, evaluation })
}
