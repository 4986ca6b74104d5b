use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ClassifierError, Result};

/// Whether the fitted transform is re-applied to single examples at
/// classification time.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransformPolicy {
    /// Apply the transform fitted on the training data to every example
    /// before prediction.
    #[default]
    Reapply,
    /// Use the transform only to prepare the training matrix.
    TrainingOnly,
}

impl FromStr for TransformPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "reapply" => Ok(TransformPolicy::Reapply),
            "training_only" => Ok(TransformPolicy::TrainingOnly),
            _ => Err(format!("Unknown transform policy: {}", s)),
        }
    }
}

/// What the evaluation loop does when one instance fails to classify.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Skip,
}

/// Algorithm and preprocessing configuration for training a model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Registry identifier of the algorithm, e.g. `J48` or `weka.classifiers.trees.J48`.
    pub algorithm: String,
    pub algorithm_args: Vec<String>,
    /// Registry identifier of the optional preprocessing transform.
    pub transform: Option<String>,
    pub transform_args: Option<Vec<String>>,
    pub transform_policy: TransformPolicy,
}

impl TrainingConfig {
    pub fn new(algorithm: impl Into<String>, algorithm_args: Vec<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            algorithm_args,
            transform: None,
            transform_args: None,
            transform_policy: TransformPolicy::default(),
        }
    }

    pub fn with_transform(mut self, transform: impl Into<String>, transform_args: Vec<String>) -> Self {
        self.transform = Some(transform.into());
        self.transform_args = Some(transform_args);
        self
    }

    pub fn with_transform_policy(mut self, policy: TransformPolicy) -> Self {
        self.transform_policy = policy;
        self
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig::new("J48", args(&["-C", "0.25", "-M", "2"]))
            .with_transform("Normalize", args(&["-S", "1.0", "-T", "0.0"]))
    }
}

/// Convenience for building positional argument lists.
pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Positional `-X value` option list consumed by algorithm and transform
/// factories. Every option must be taken before [`OptionList::finish`],
/// anything left over is rejected.
#[derive(Debug, Clone)]
pub struct OptionList {
    owner: String,
    args: Vec<String>,
}

impl OptionList {
    pub fn new(owner: &str, args: &[String]) -> Self {
        Self {
            owner: owner.to_string(),
            args: args.to_vec(),
        }
    }

    fn position(&self, flag: char) -> Option<usize> {
        let wanted = format!("-{}", flag);
        self.args.iter().position(|a| *a == wanted)
    }

    /// Remove `-<flag> <value>` and return the value.
    pub fn take_value(&mut self, flag: char) -> Result<Option<String>> {
        let Some(idx) = self.position(flag) else {
            return Ok(None);
        };
        if idx + 1 >= self.args.len() {
            return Err(ClassifierError::Training(format!(
                "{}: option -{} requires a value",
                self.owner, flag
            )));
        }
        let value = self.args.remove(idx + 1);
        self.args.remove(idx);
        Ok(Some(value))
    }

    /// Remove a bare `-<flag>` switch, returning whether it was present.
    pub fn take_flag(&mut self, flag: char) -> bool {
        match self.position(flag) {
            Some(idx) => {
                self.args.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn take_parsed<T: FromStr>(&mut self, flag: char, default: T) -> Result<T> {
        match self.take_value(flag)? {
            Some(raw) => raw.trim().parse::<T>().map_err(|_| {
                ClassifierError::Training(format!(
                    "{}: invalid value '{}' for option -{}",
                    self.owner, raw, flag
                ))
            }),
            None => Ok(default),
        }
    }

    /// Fail if any option was not recognised.
    pub fn finish(self) -> Result<()> {
        if self.args.iter().all(|a| a.trim().is_empty()) {
            return Ok(());
        }
        Err(ClassifierError::Training(format!(
            "{}: unrecognised options {:?}",
            self.owner, self.args
        )))
    }
}
