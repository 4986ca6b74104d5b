//! Labeled examples keyed by attribute name.
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::data_handling::RawDataset;
use crate::error::{ClassifierError, Result};
use crate::io::read_dataset;
use crate::schema::AttributeSchema;

/// One labeled example: the expected label plus `name -> value` for the
/// value attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedInstance {
    expected_class: String,
    values: HashMap<String, f64>,
}

impl KeyedInstance {
    pub fn new(expected_class: impl Into<String>) -> Self {
        Self {
            expected_class: expected_class.into(),
            values: HashMap::new(),
        }
    }

    pub fn expected_class(&self) -> &str {
        &self.expected_class
    }

    pub fn set_expected_class(&mut self, expected_class: impl Into<String>) {
        self.expected_class = expected_class.into();
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for KeyedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        let components: Vec<String> = keys
            .into_iter()
            .map(|k| format!("{}={}", k, self.values[k]))
            .collect();
        write!(f, "{} for: {}", self.expected_class, components.join("\t\t"))
    }
}

/// Every record of a dataset as a [`KeyedInstance`], in file order.
#[derive(Debug, Clone)]
pub struct KeyedInstanceSet {
    schema: Arc<AttributeSchema>,
    instances: Vec<KeyedInstance>,
}

impl KeyedInstanceSet {
    /// Load and materialize a dataset file (`.arff` or `.csv`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = read_dataset(path)?;
        Self::from_dataset(&dataset)
    }

    pub fn from_dataset(dataset: &RawDataset) -> Result<Self> {
        let schema = AttributeSchema::from_dataset(dataset)?;
        let class_column = schema.class_attribute().column;

        let mut instances = Vec::with_capacity(dataset.num_rows());
        for (idx, row) in dataset.rows().enumerate() {
            let raw_class = row[class_column];
            let label = schema.decode_class_value(raw_class).ok_or_else(|| {
                ClassifierError::DatasetParse(format!(
                    "record {} has no valid value for class attribute '{}'",
                    idx + 1,
                    schema.class_attribute().name
                ))
            })?;
            let mut instance = KeyedInstance::new(label);
            for attr in schema.value_attributes() {
                instance.set_value(attr.name.clone(), row[attr.column]);
            }
            instances.push(instance);
        }

        log::info!(
            "Loaded {} keyed instances from relation '{}' ({} value attributes, {} labels)",
            instances.len(),
            dataset.relation(),
            schema.num_value_attributes(),
            schema.labels().len()
        );

        Ok(Self {
            schema: Arc::new(schema),
            instances,
        })
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn instances(&self) -> &[KeyedInstance] {
        &self.instances
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyedInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl<'a> IntoIterator for &'a KeyedInstanceSet {
    type Item = &'a KeyedInstance;
    type IntoIter = std::slice::Iter<'a, KeyedInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

impl fmt::Display for KeyedInstanceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} instances:", self.instances.len())?;
        for (count, instance) in self.instances.iter().enumerate() {
            writeln!(f, "{}", instance)?;
            if count > 10 {
                writeln!(f, "...")?;
                break;
            }
        }
        Ok(())
    }
}
