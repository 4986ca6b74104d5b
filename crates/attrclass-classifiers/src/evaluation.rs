//! Replaying a labeled instance set through a trained model.
use rayon::prelude::*;

use crate::config::FailurePolicy;
use crate::error::{ClassifierError, Result};
use crate::instances::{KeyedInstance, KeyedInstanceSet};
use crate::models::builder::ClassifierModel;
use crate::params::ClassifierParams;
use crate::report::ConfidenceMatrix;

/// Outcome of an evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub matrix: ConfidenceMatrix,
    /// Instances that failed to classify under [`FailurePolicy::Skip`].
    pub skipped: usize,
}

impl Evaluation {
    /// Instances replayed, classified or skipped.
    pub fn instances(&self) -> usize {
        self.matrix.total() + self.skipped
    }
}

/// Instances per expected label, in label-domain order. Labels with no
/// instances are listed with a zero count.
pub fn count_per_class(instances: &KeyedInstanceSet) -> Vec<(String, usize)> {
    let schema = instances.schema();
    let mut counts: Vec<(String, usize)> = schema.labels().iter().map(|l| (l.clone(), 0)).collect();
    for instance in instances {
        if let Some(idx) = schema.label_index(instance.expected_class()) {
            counts[idx].1 += 1;
        }
    }
    counts
}

fn classify_instance(
    model: &ClassifierModel,
    params: &mut ClassifierParams,
    instance: &KeyedInstance,
) -> Result<String> {
    params.clear();
    for (key, value) in instance.iter() {
        params.set_value(key, value)?;
    }
    model.classify(params)
}

/// Classify one instance into `matrix`, returning whether it was skipped.
fn record(
    model: &ClassifierModel,
    params: &mut ClassifierParams,
    matrix: &mut ConfidenceMatrix,
    index: usize,
    instance: &KeyedInstance,
    policy: FailurePolicy,
) -> Result<bool> {
    match classify_instance(model, params, instance) {
        Ok(actual) => {
            matrix.add_prediction(instance.expected_class(), &actual)?;
            Ok(false)
        }
        Err(e) if policy == FailurePolicy::Skip && e.is_per_instance() => {
            log::warn!("Skipping instance {} ({}): {}", index + 1, instance.expected_class(), e);
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

fn finish(matrix: ConfidenceMatrix, skipped: usize) -> Evaluation {
    log::info!(
        "Evaluated {} instances: {} correct, {} skipped",
        matrix.total(),
        matrix.correct(),
        skipped
    );
    Evaluation { matrix, skipped }
}

/// Classify every instance in order with one reused [`ClassifierParams`].
pub fn evaluate(
    model: &ClassifierModel,
    instances: &KeyedInstanceSet,
    policy: FailurePolicy,
) -> Result<Evaluation> {
    let mut matrix = ConfidenceMatrix::new(count_per_class(instances));
    let mut params = model.create_params();
    let mut skipped = 0;
    for (index, instance) in instances.iter().enumerate() {
        if record(model, &mut params, &mut matrix, index, instance, policy)? {
            skipped += 1;
        }
    }
    Ok(finish(matrix, skipped))
}

/// Same result as [`evaluate`], spread over the rayon thread pool. Each
/// worker owns its parameters and partial matrix; partials are merged.
pub fn evaluate_parallel(
    model: &ClassifierModel,
    instances: &KeyedInstanceSet,
    policy: FailurePolicy,
) -> Result<Evaluation> {
    let counts = count_per_class(instances);
    let empty = || (model.create_params(), ConfidenceMatrix::new(counts.clone()), 0usize);

    let (_, matrix, skipped) = instances
        .instances()
        .par_iter()
        .enumerate()
        .try_fold(empty, |(mut params, mut matrix, skipped), (index, instance)| {
            let was_skipped = record(model, &mut params, &mut matrix, index, instance, policy)?;
            Ok::<_, ClassifierError>((params, matrix, skipped + usize::from(was_skipped)))
        })
        .try_reduce(empty, |(params, mut left, left_skipped), (_, right, right_skipped)| {
            left.merge(&right)?;
            Ok((params, left, left_skipped + right_skipped))
        })?;
    Ok(finish(matrix, skipped))
}
