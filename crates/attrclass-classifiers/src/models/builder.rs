//! Training a model from a configuration and classifying single examples.
use std::path::Path;
use std::sync::Arc;

use crate::config::{TrainingConfig, TransformPolicy};
use crate::data_handling::RawDataset;
use crate::error::{ClassifierError, Result};
use crate::io::read_dataset;
use crate::models::classifier_trait::Classifier;
use crate::models::factory::Registry;
use crate::params::ClassifierParams;
use crate::preprocessing::Transform;
use crate::schema::AttributeSchema;

/// A trained predictor plus everything needed to push one named-parameter
/// example through it the same way the training data went.
///
/// Immutable after [`ClassifierModel::train`]; share it across threads by
/// reference and give every caller its own [`ClassifierParams`].
pub struct ClassifierModel {
    schema: Arc<AttributeSchema>,
    classifier: Box<dyn Classifier>,
    transform: Option<Box<dyn Transform>>,
    policy: TransformPolicy,
    /// Zero-record dataset with the training header.
    header: RawDataset,
}

impl ClassifierModel {
    pub fn train(config: &TrainingConfig, registry: &Registry, data: &RawDataset) -> Result<Self> {
        let schema = AttributeSchema::from_dataset(data)?;
        let class_index = schema.class_attribute().column;

        let mut classifier = registry.build_algorithm(&config.algorithm, &config.algorithm_args)?;
        let mut transform = match &config.transform {
            Some(id) => {
                let args = config.transform_args.as_deref().unwrap_or(&[]);
                Some(registry.build_transform(id, args)?)
            }
            None => None,
        };

        log::info!(
            "Training {} on relation '{}' ({} records, {} value attributes, class '{}')",
            classifier.name(),
            data.relation(),
            data.num_rows(),
            schema.num_value_attributes(),
            schema.class_attribute().name
        );

        let transformed;
        let training_data = match transform.as_mut() {
            Some(t) => {
                t.fit(data, class_index)
                    .map_err(|e| ClassifierError::Training(format!("{}: {}", t.name(), e)))?;
                transformed = t
                    .apply(data)
                    .map_err(|e| ClassifierError::Training(format!("{}: {}", t.name(), e)))?;
                log::info!(
                    "Fitted transform {} (inference policy: {:?})",
                    t.name(),
                    config.transform_policy
                );
                &transformed
            }
            None => data,
        };

        classifier.fit(training_data, class_index).map_err(|e| match e {
            ClassifierError::Training(_) => e,
            other => ClassifierError::Training(other.to_string()),
        })?;
        log::info!("Trained {}", classifier.name());

        Ok(Self {
            schema: Arc::new(schema),
            classifier,
            transform,
            policy: config.transform_policy,
            header: data.select_rows(&[]),
        })
    }

    /// Read a dataset file (`.arff` or `.csv`) and train on it.
    pub fn train_from_path<P: AsRef<Path>>(
        config: &TrainingConfig,
        registry: &Registry,
        path: P,
    ) -> Result<Self> {
        let data = read_dataset(path)?;
        Self::train(config, registry, &data)
    }

    /// Fresh, empty parameters bound to this model's schema.
    pub fn create_params(&self) -> ClassifierParams {
        ClassifierParams::new(Arc::clone(&self.schema))
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn algorithm_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn transform_name(&self) -> Option<&str> {
        self.transform.as_ref().map(|t| t.name())
    }

    pub fn transform_policy(&self) -> TransformPolicy {
        self.policy
    }

    /// Predict the label of the example held in `params`.
    pub fn classify(&self, params: &ClassifierParams) -> Result<String> {
        if !Arc::ptr_eq(params.schema(), &self.schema) && **params.schema() != *self.schema {
            return Err(ClassifierError::InvalidAttribute(format!(
                "parameters are bound to a different schema (class '{}')",
                params.schema().class_attribute().name
            )));
        }

        let values = params.get_list()?;
        let row = self.schema.synthetic_row(&values)?;
        let mut example = self.header.single_example(row)?;
        if let (Some(t), TransformPolicy::Reapply) = (self.transform.as_ref(), self.policy) {
            example = t.apply(&example)?;
        }

        let index = self.classifier.predict_index(example.row(0))?;
        self.schema.label(index).map(str::to_string).ok_or_else(|| {
            ClassifierError::Inference(format!(
                "{} predicted class index {} outside a domain of {} labels",
                self.classifier.name(),
                index,
                self.schema.labels().len()
            ))
        })
    }
}

impl std::fmt::Debug for ClassifierModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierModel")
            .field("algorithm", &self.algorithm_name())
            .field("transform", &self.transform_name())
            .field("policy", &self.policy)
            .field("schema", &self.schema)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::args;
    use crate::data_handling::Attribute;
    use ndarray::ArrayView1;

    fn dataset() -> RawDataset {
        let attrs = vec![
            Attribute::numeric("x"),
            Attribute::nominal("class", vec!["small".to_string(), "large".to_string()]),
        ];
        let rows = (0..20)
            .map(|i| vec![i as f64, if i < 10 { 0.0 } else { 1.0 }])
            .collect();
        RawDataset::from_rows("t", attrs, rows).unwrap()
    }

    fn j48() -> TrainingConfig {
        TrainingConfig::new("J48", args(&["-C", "0.25", "-M", "2"]))
            .with_transform("Normalize", args(&["-S", "1.0", "-T", "0.0"]))
    }

    #[test]
    fn classifies_named_parameters() {
        let model = ClassifierModel::train(&j48(), &Registry::default(), &dataset()).unwrap();
        assert_eq!(model.algorithm_name(), "J48");
        assert_eq!(model.transform_name(), Some("Normalize"));

        let mut params = model.create_params();
        params.set_value("x", 2.0).unwrap();
        assert_eq!(model.classify(&params).unwrap(), "small");
        params.clear();
        params.set_value("x", 17.0).unwrap();
        assert_eq!(model.classify(&params).unwrap(), "large");
    }

    #[test]
    fn classifying_the_same_params_twice_agrees() {
        let model = ClassifierModel::train(&j48(), &Registry::default(), &dataset()).unwrap();
        let mut params = model.create_params();
        for x in [0.0, 9.0, 10.0, 19.0] {
            params.clear();
            params.set_value("x", x).unwrap();
            let first = model.classify(&params).unwrap();
            let second = model.classify(&params).unwrap();
            assert_eq!(first, second);
            assert_eq!(params.get_value("x").unwrap(), Some(x));
        }
    }

    #[test]
    fn unset_attribute_propagates() {
        let model = ClassifierModel::train(&j48(), &Registry::default(), &dataset()).unwrap();
        let params = model.create_params();
        assert!(matches!(
            model.classify(&params),
            Err(ClassifierError::AttributeNotSet(name)) if name == "x"
        ));
    }

    #[test]
    fn params_from_another_schema_are_rejected() {
        let model = ClassifierModel::train(&j48(), &Registry::default(), &dataset()).unwrap();
        let other = AttributeSchema::derive(&[
            Attribute::numeric("y"),
            Attribute::nominal("class", vec!["a".to_string()]),
        ])
        .unwrap();
        let mut params = ClassifierParams::new(Arc::new(other));
        params.set_value("y", 1.0).unwrap();
        assert!(matches!(
            model.classify(&params),
            Err(ClassifierError::InvalidAttribute(_))
        ));

        // an equal schema built separately is accepted
        let same = AttributeSchema::from_dataset(&dataset()).unwrap();
        let mut params = ClassifierParams::new(Arc::new(same));
        params.set_value("x", 1.0).unwrap();
        assert!(model.classify(&params).is_ok());
    }

    #[test]
    fn unknown_identifiers_and_options_fail_training() {
        let registry = Registry::default();
        let ds = dataset();
        let bad_algo = TrainingConfig::new("weka.classifiers.bayes.NaiveBayes", vec![]);
        assert!(matches!(
            ClassifierModel::train(&bad_algo, &registry, &ds),
            Err(ClassifierError::Training(_))
        ));
        let bad_opts = TrainingConfig::new("J48", args(&["-Q", "3"]));
        assert!(matches!(
            ClassifierModel::train(&bad_opts, &registry, &ds),
            Err(ClassifierError::Training(_))
        ));
        let bad_transform = TrainingConfig::new("J48", vec![]).with_transform("Sharpen", vec![]);
        assert!(matches!(
            ClassifierModel::train(&bad_transform, &registry, &ds),
            Err(ClassifierError::Training(_))
        ));
    }

    struct OutOfDomain;

    impl Classifier for OutOfDomain {
        fn fit(&mut self, _data: &RawDataset, _class_index: usize) -> Result<()> {
            Ok(())
        }

        fn predict_index(&self, _row: ArrayView1<'_, f64>) -> Result<usize> {
            Ok(99)
        }
    }

    #[test]
    fn prediction_outside_domain_is_an_inference_error() {
        let mut registry = Registry::empty();
        registry.register_algorithm("broken", |_| Ok(Box::new(OutOfDomain)));
        let model = ClassifierModel::train(&TrainingConfig::new("broken", vec![]), &registry, &dataset()).unwrap();
        assert_eq!(model.algorithm_name(), "classifier");
        let mut params = model.create_params();
        params.set_value("x", 1.0).unwrap();
        assert!(matches!(model.classify(&params), Err(ClassifierError::Inference(_))));
    }
}
