//! Identifier-to-constructor registry for algorithms and transforms.
use std::collections::HashMap;

use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::Classifier;
use crate::models::j48::J48;
use crate::models::zero_r::ZeroR;
use crate::preprocessing::{Normalize, Randomize, Standardize, Transform};

pub type AlgorithmFactory = fn(&[String]) -> Result<Box<dyn Classifier>>;
pub type TransformFactory = fn(&[String]) -> Result<Box<dyn Transform>>;

/// Lookups match the last dot-separated segment, case-insensitively, so
/// `J48` and `weka.classifiers.trees.J48` name the same entry.
#[derive(Clone)]
pub struct Registry {
    algorithms: HashMap<String, AlgorithmFactory>,
    transforms: HashMap<String, TransformFactory>,
}

fn registry_key(identifier: &str) -> String {
    identifier
        .trim()
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

impl Registry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            algorithms: HashMap::new(),
            transforms: HashMap::new(),
        }
    }

    pub fn register_algorithm(&mut self, identifier: &str, factory: AlgorithmFactory) {
        self.algorithms.insert(registry_key(identifier), factory);
    }

    pub fn register_transform(&mut self, identifier: &str, factory: TransformFactory) {
        self.transforms.insert(registry_key(identifier), factory);
    }

    pub fn build_algorithm(&self, identifier: &str, args: &[String]) -> Result<Box<dyn Classifier>> {
        let factory = self.algorithms.get(&registry_key(identifier)).ok_or_else(|| {
            ClassifierError::Training(format!("unknown algorithm identifier '{}'", identifier))
        })?;
        factory(args)
    }

    pub fn build_transform(&self, identifier: &str, args: &[String]) -> Result<Box<dyn Transform>> {
        let factory = self.transforms.get(&registry_key(identifier)).ok_or_else(|| {
            ClassifierError::Training(format!("unknown transform identifier '{}'", identifier))
        })?;
        factory(args)
    }

    /// Registered algorithm keys, sorted.
    pub fn algorithm_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.algorithms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Registered transform keys, sorted.
    pub fn transform_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.transforms.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_algorithm("J48", |args| Ok(Box::new(J48::from_args(args)?)));
        registry.register_algorithm("ZeroR", |args| Ok(Box::new(ZeroR::from_args(args)?)));
        registry.register_transform("Normalize", |args| Ok(Box::new(Normalize::from_args(args)?)));
        registry.register_transform("Standardize", |args| {
            Ok(Box::new(Standardize::from_args(args)?))
        });
        registry.register_transform("Randomize", |args| Ok(Box::new(Randomize::from_args(args)?)));
        registry
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("algorithms", &self.algorithm_ids())
            .field("transforms", &self.transform_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::args;

    #[test]
    fn resolves_short_and_qualified_identifiers() {
        let registry = Registry::default();
        let short = registry.build_algorithm("J48", &[]).unwrap();
        let qualified = registry
            .build_algorithm("weka.classifiers.trees.J48", &args(&["-C", "0.25", "-M", "2"]))
            .unwrap();
        assert_eq!(short.name(), "J48");
        assert_eq!(qualified.name(), "J48");
        let filter = registry
            .build_transform("weka.filters.unsupervised.attribute.Normalize", &[])
            .unwrap();
        assert_eq!(filter.name(), "Normalize");
    }

    #[test]
    fn unknown_identifier_is_a_training_error() {
        let registry = Registry::default();
        assert!(matches!(
            registry.build_algorithm("weka.classifiers.functions.SMO", &[]),
            Err(ClassifierError::Training(_))
        ));
        assert!(matches!(
            registry.build_transform("Discretize", &[]),
            Err(ClassifierError::Training(_))
        ));
    }

    #[test]
    fn bad_options_surface_from_the_factory() {
        let registry = Registry::default();
        assert!(registry.build_algorithm("zeror", &args(&["-X"])).is_err());
    }

    #[test]
    fn callers_can_register_more_entries() {
        let mut registry = Registry::empty();
        assert!(registry.algorithm_ids().is_empty());
        registry.register_algorithm("my.pkg.Majority", |args| Ok(Box::new(ZeroR::from_args(args)?)));
        assert_eq!(registry.algorithm_ids(), vec!["majority".to_string()]);
        assert!(registry.build_algorithm("MAJORITY", &[]).is_ok());
        assert_eq!(
            Registry::default().transform_ids(),
            vec!["normalize", "randomize", "standardize"]
        );
    }
}
