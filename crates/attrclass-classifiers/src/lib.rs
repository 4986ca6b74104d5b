//! attrclass-classifiers: train a classifier on a labeled tabular dataset and
//! replay every labeled example through it into a per-class confusion report.
//!
//! The flow is: read a [`RawDataset`] (ARFF or CSV), derive its
//! [`AttributeSchema`], train a [`ClassifierModel`] through the algorithm
//! [`Registry`], materialize a [`KeyedInstanceSet`], then
//! [`evaluate`](evaluation::evaluate) it into a [`ConfidenceMatrix`].
pub mod config;
pub mod data_handling;
pub mod datasets;
pub mod error;
pub mod evaluation;
pub mod instances;
pub mod io;
pub mod models;
pub mod params;
pub mod preprocessing;
pub mod report;
pub mod schema;

pub use config::{FailurePolicy, TrainingConfig, TransformPolicy};
pub use data_handling::{Attribute, AttributeKind, RawDataset};
pub use error::{ClassifierError, ErrorKind, Result};
pub use evaluation::{evaluate, evaluate_parallel, Evaluation};
pub use instances::{KeyedInstance, KeyedInstanceSet};
pub use models::builder::ClassifierModel;
pub use models::factory::Registry;
pub use params::ClassifierParams;
pub use report::{ConfidenceMatrix, SelfCheckSummary};
pub use schema::AttributeSchema;
