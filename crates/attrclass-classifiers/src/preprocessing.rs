//! Fitted preprocessing transforms.
//!
//! A transform is fitted once on the training dataset and can then be applied
//! to that dataset or to a one-record synthetic example with the same header.
//! Only numeric attributes other than the class column are rewritten.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::OptionList;
use crate::data_handling::{AttributeKind, RawDataset};
use crate::error::{ClassifierError, Result};

pub trait Transform: Send + Sync {
    /// Capture whatever statistics the transform needs from `data`.
    fn fit(&mut self, data: &RawDataset, class_index: usize) -> Result<()>;

    /// Apply the fitted transform, returning a new dataset.
    fn apply(&self, data: &RawDataset) -> Result<RawDataset>;

    fn name(&self) -> &str;
}

/// Columns a transform may rewrite.
fn numeric_columns(data: &RawDataset, class_index: usize) -> Vec<usize> {
    data.attributes()
        .iter()
        .enumerate()
        .filter(|(idx, attr)| *idx != class_index && matches!(attr.kind, AttributeKind::Numeric))
        .map(|(idx, _)| idx)
        .collect()
}

fn not_fitted(name: &str) -> ClassifierError {
    ClassifierError::Inference(format!("{} transform applied before it was fitted", name))
}

fn check_width(name: &str, fitted_width: usize, data: &RawDataset) -> Result<()> {
    if fitted_width != data.num_attributes() {
        return Err(ClassifierError::Inference(format!(
            "{} was fitted on {} attributes but input has {}",
            name,
            fitted_width,
            data.num_attributes()
        )));
    }
    Ok(())
}

/// Min/max rescaling: `(v - min) / (max - min) * scale + translation`.
#[derive(Clone, Debug)]
pub struct Normalize {
    scale: f64,
    translation: f64,
    fitted: Option<FittedColumns<(f64, f64)>>,
}

/// Per-column statistics plus the header width they were captured for.
#[derive(Clone, Debug)]
struct FittedColumns<T> {
    width: usize,
    columns: Vec<(usize, T)>,
}

impl Normalize {
    pub fn new(scale: f64, translation: f64) -> Self {
        Self {
            scale,
            translation,
            fitted: None,
        }
    }

    /// `-S <scale>` (default 1.0), `-T <translation>` (default 0.0).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut opts = OptionList::new("Normalize", args);
        let scale = opts.take_parsed('S', 1.0)?;
        let translation = opts.take_parsed('T', 0.0)?;
        opts.finish()?;
        Ok(Self::new(scale, translation))
    }

    /// Fitted `(min, max)` of a column, if it is rescaled.
    pub fn range(&self, column: usize) -> Option<(f64, f64)> {
        self.fitted
            .as_ref()
            .and_then(|f| f.columns.iter().find(|(c, _)| *c == column))
            .map(|(_, r)| *r)
    }
}

impl Default for Normalize {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Transform for Normalize {
    fn fit(&mut self, data: &RawDataset, class_index: usize) -> Result<()> {
        let columns = numeric_columns(data, class_index)
            .into_iter()
            .map(|c| {
                let (min, max) = data
                    .values()
                    .column(c)
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
                (c, (min, max))
            })
            .collect();
        self.fitted = Some(FittedColumns {
            width: data.num_attributes(),
            columns,
        });
        Ok(())
    }

    fn apply(&self, data: &RawDataset) -> Result<RawDataset> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_width(self.name(), fitted.width, data)?;

        let mut x = data.values().clone();
        for &(c, (min, max)) in &fitted.columns {
            let (scale, translation) = (self.scale, self.translation);
            x.column_mut(c).mapv_inplace(|v| {
                if v.is_nan() {
                    v
                } else if !min.is_finite() || !max.is_finite() || max == min {
                    0.0
                } else {
                    (v - min) / (max - min) * scale + translation
                }
            });
        }
        data.with_values(x)
    }

    fn name(&self) -> &str {
        "Normalize"
    }
}

/// Per-column mean/std standardization.
#[derive(Clone, Debug, Default)]
pub struct Standardize {
    fitted: Option<FittedColumns<(f64, f64)>>,
}

impl Standardize {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;

    pub fn from_args(args: &[String]) -> Result<Self> {
        OptionList::new("Standardize", args).finish()?;
        Ok(Self::default())
    }
}

impl Transform for Standardize {
    fn fit(&mut self, data: &RawDataset, class_index: usize) -> Result<()> {
        let columns = numeric_columns(data, class_index)
            .into_iter()
            .map(|c| {
                let column = data.values().column(c);
                let known: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
                if known.is_empty() {
                    return (c, (0.0, 1.0));
                }
                let n = known.len() as f64;
                let mean = known.iter().sum::<f64>() / n;
                let var = known.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                (c, (mean, var.sqrt().max(Self::MIN_STD)))
            })
            .collect();
        self.fitted = Some(FittedColumns {
            width: data.num_attributes(),
            columns,
        });
        Ok(())
    }

    fn apply(&self, data: &RawDataset) -> Result<RawDataset> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_width(self.name(), fitted.width, data)?;

        let mut x = data.values().clone();
        for &(c, (mean, std)) in &fitted.columns {
            x.column_mut(c).mapv_inplace(|v| (v - mean) / std);
        }
        data.with_values(x)
    }

    fn name(&self) -> &str {
        "Standardize"
    }
}

/// Seeded shuffle of record order. Single records pass through unchanged.
#[derive(Clone, Debug)]
pub struct Randomize {
    seed: u64,
    fitted: bool,
}

impl Randomize {
    pub fn new(seed: u64) -> Self {
        Self { seed, fitted: false }
    }

    /// `-S <seed>` (default 42).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut opts = OptionList::new("Randomize", args);
        let seed = opts.take_parsed('S', 42u64)?;
        opts.finish()?;
        Ok(Self::new(seed))
    }
}

impl Transform for Randomize {
    fn fit(&mut self, _data: &RawDataset, _class_index: usize) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn apply(&self, data: &RawDataset) -> Result<RawDataset> {
        if !self.fitted {
            return Err(not_fitted(self.name()));
        }
        if data.num_rows() <= 1 {
            return Ok(data.clone());
        }
        let mut indices: Vec<usize> = (0..data.num_rows()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        Ok(data.select_rows(&indices))
    }

    fn name(&self) -> &str {
        "Randomize"
    }
}
