use ndarray::ArrayView1;

use crate::data_handling::RawDataset;
use crate::error::{ClassifierError, Result};

/// Contract between the harness and a training/inference engine.
///
/// `fit` receives the (possibly transformed) training dataset and the raw
/// column of the class attribute; nominal class cells hold label indices.
/// After fitting the model is only read, so implementations must be
/// shareable across threads.
pub trait Classifier: Send + Sync {
    fn fit(&mut self, data: &RawDataset, class_index: usize) -> Result<()>;

    /// Predict the class-domain index for one record laid out like the
    /// training records (class cell ignored).
    fn predict_index(&self, row: ArrayView1<'_, f64>) -> Result<usize>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Label domain size of the class column, or a training error if that
/// column is not nominal.
pub fn class_domain_size(data: &RawDataset, class_index: usize) -> Result<usize> {
    data.attributes()
        .get(class_index)
        .and_then(|attr| attr.labels())
        .map(|labels| labels.len())
        .ok_or_else(|| {
            ClassifierError::Training(format!("column {} is not a nominal class attribute", class_index))
        })
}

/// Class index of record `row`, `None` when the class cell is missing or
/// outside the domain.
pub fn class_of(data: &RawDataset, row: usize, class_index: usize, num_classes: usize) -> Option<usize> {
    let raw = data.value(row, class_index);
    if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 {
        return None;
    }
    let idx = raw as usize;
    (idx < num_classes).then_some(idx)
}

/// Index of the largest count, lowest index on ties.
pub fn argmax(counts: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = idx;
        }
    }
    best
}
