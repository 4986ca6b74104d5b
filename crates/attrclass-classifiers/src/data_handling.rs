//! Raw tabular datasets as produced by the readers in [`crate::io`].
//!
//! A `RawDataset` is a shared attribute header plus a dense record matrix.
//! Nominal cells store the zero-based index of their label and missing
//! cells are `NaN`, so every record is a plain `f64` row that the models and
//! transforms can consume directly.
use std::sync::Arc;

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{ClassifierError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    Numeric,
    /// Enumerated domain, labels in declaration order.
    Nominal(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    pub fn nominal(name: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal(labels),
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal(_))
    }

    pub fn labels(&self) -> Option<&[String]> {
        match &self.kind {
            AttributeKind::Nominal(labels) => Some(labels),
            AttributeKind::Numeric => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawDataset {
    relation: String,
    attributes: Arc<Vec<Attribute>>,
    x: Array2<f64>,
}

impl RawDataset {
    pub fn new(relation: impl Into<String>, attributes: Vec<Attribute>, x: Array2<f64>) -> Result<Self> {
        Self::with_header(relation.into(), Arc::new(attributes), x)
    }

    fn with_header(relation: String, attributes: Arc<Vec<Attribute>>, x: Array2<f64>) -> Result<Self> {
        if x.ncols() != attributes.len() {
            return Err(ClassifierError::DatasetParse(format!(
                "relation '{}' declares {} attributes but records have {} values",
                relation,
                attributes.len(),
                x.ncols()
            )));
        }
        Ok(Self {
            relation,
            attributes,
            x,
        })
    }

    /// Build a dataset from row-major values.
    pub fn from_rows(relation: impl Into<String>, attributes: Vec<Attribute>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let relation = relation.into();
        let ncols = attributes.len();
        let nrows = rows.len();
        let mut flat = Vec::with_capacity(nrows * ncols);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(ClassifierError::DatasetParse(format!(
                    "record {} has {} values, expected {}",
                    idx + 1,
                    row.len(),
                    ncols
                )));
            }
            flat.extend(row);
        }
        let x = Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|e| ClassifierError::DatasetParse(format!("failed to build record matrix: {}", e)))?;
        Self::new(relation, attributes, x)
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn num_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.x.row(idx)
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.x[(row, col)]
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.x.rows().into_iter()
    }

    /// Same header, new record matrix.
    pub fn with_values(&self, x: Array2<f64>) -> Result<Self> {
        Self::with_header(self.relation.clone(), Arc::clone(&self.attributes), x)
    }

    /// A one-record dataset with this header, used to push a single example
    /// through the same transform a whole dataset went through.
    pub fn single_example(&self, values: Vec<f64>) -> Result<Self> {
        let ncols = values.len();
        let x = Array2::from_shape_vec((1, ncols), values)
            .map_err(|e| ClassifierError::Inference(format!("invalid example shape: {}", e)))?;
        self.with_values(x)
            .map_err(|e| ClassifierError::Inference(e.to_string()))
    }

    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            relation: self.relation.clone(),
            attributes: Arc::clone(&self.attributes),
            x: self.x.select(Axis(0), indices),
        }
    }
}
