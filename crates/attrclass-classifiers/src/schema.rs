//! Feature/label structure derived from a raw dataset header.
//!
//! Exactly one nominal attribute is the class attribute; every numeric
//! attribute is a value attribute with a dense position (0, 1, ...) in
//! header order, skipping the class column. The position is the slot the
//! attribute occupies in the feature vector produced by
//! [`crate::params::ClassifierParams::get_list`].
use std::collections::{HashMap, HashSet};

use crate::data_handling::{Attribute, AttributeKind, RawDataset};
use crate::error::{ClassifierError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassAttribute {
    pub name: String,
    /// Raw column index in the dataset.
    pub column: usize,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueAttribute {
    pub name: String,
    /// Raw column index in the dataset.
    pub column: usize,
    /// Dense slot in the feature vector.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    class_attribute: ClassAttribute,
    value_attributes: Vec<ValueAttribute>,
    positions: HashMap<String, usize>,
    width: usize,
}

impl AttributeSchema {
    pub fn derive(attributes: &[Attribute]) -> Result<Self> {
        let mut class_attribute: Option<ClassAttribute> = None;
        let mut value_attributes = Vec::new();
        let mut seen = HashSet::new();

        for (column, attr) in attributes.iter().enumerate() {
            if !seen.insert(attr.name.as_str()) {
                return Err(ClassifierError::DuplicateAttribute(attr.name.clone()));
            }
            match &attr.kind {
                AttributeKind::Nominal(labels) => {
                    if let Some(first) = &class_attribute {
                        return Err(ClassifierError::MultipleClassAttributes {
                            first: first.name.clone(),
                            second: attr.name.clone(),
                        });
                    }
                    class_attribute = Some(ClassAttribute {
                        name: attr.name.clone(),
                        column,
                        labels: labels.clone(),
                    });
                }
                AttributeKind::Numeric => {
                    let position = value_attributes.len();
                    value_attributes.push(ValueAttribute {
                        name: attr.name.clone(),
                        column,
                        position,
                    });
                }
            }
        }

        let class_attribute = class_attribute.ok_or(ClassifierError::NoClassAttribute)?;
        let positions = value_attributes
            .iter()
            .map(|v| (v.name.clone(), v.position))
            .collect();

        Ok(Self {
            class_attribute,
            value_attributes,
            positions,
            width: attributes.len(),
        })
    }

    pub fn from_dataset(dataset: &RawDataset) -> Result<Self> {
        Self::derive(dataset.attributes())
    }

    pub fn class_attribute(&self) -> &ClassAttribute {
        &self.class_attribute
    }

    /// The label domain in declaration order.
    pub fn labels(&self) -> &[String] {
        &self.class_attribute.labels
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.class_attribute.labels.get(index).map(String::as_str)
    }

    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.class_attribute.labels.iter().position(|l| l == label)
    }

    pub fn value_attributes(&self) -> &[ValueAttribute] {
        &self.value_attributes
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn num_value_attributes(&self) -> usize {
        self.value_attributes.len()
    }

    /// Number of raw attributes, class included.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Resolve a raw class cell (label index stored as `f64`) to its label.
    pub fn decode_class_value(&self, raw: f64) -> Option<&str> {
        if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 {
            return None;
        }
        self.label(raw as usize)
    }

    /// Lay dense feature values out as a raw record: each value at its
    /// attribute's column, the class column missing.
    pub fn synthetic_row(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.value_attributes.len() {
            return Err(ClassifierError::Inference(format!(
                "expected {} feature values, got {}",
                self.value_attributes.len(),
                values.len()
            )));
        }
        let mut row = vec![f64::NAN; self.width];
        for attr in &self.value_attributes {
            row[attr.column] = values[attr.position];
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn class_attribute_in_the_middle_is_skipped_by_positions() {
        let attrs = vec![
            Attribute::numeric("x"),
            Attribute::nominal("class", labels()),
            Attribute::numeric("y"),
        ];
        let schema = AttributeSchema::derive(&attrs).unwrap();
        assert_eq!(schema.class_attribute().column, 1);
        assert_eq!(schema.position_of("x"), Some(0));
        assert_eq!(schema.position_of("y"), Some(1));
        assert_eq!(schema.value_attributes()[1].column, 2);
        assert_eq!(schema.position_of("class"), None);

        let row = schema.synthetic_row(&[1.0, 2.0]).unwrap();
        assert_eq!(row[0], 1.0);
        assert!(row[1].is_nan());
        assert_eq!(row[2], 2.0);
    }

    #[test]
    fn no_class_attribute_fails() {
        let attrs = vec![Attribute::numeric("x")];
        assert!(matches!(
            AttributeSchema::derive(&attrs),
            Err(ClassifierError::NoClassAttribute)
        ));
    }

    #[test]
    fn two_class_attributes_fail() {
        let attrs = vec![
            Attribute::nominal("c1", labels()),
            Attribute::numeric("x"),
            Attribute::nominal("c2", labels()),
        ];
        match AttributeSchema::derive(&attrs) {
            Err(ClassifierError::MultipleClassAttributes { first, second }) => {
                assert_eq!(first, "c1");
                assert_eq!(second, "c2");
            }
            other => panic!("expected MultipleClassAttributes, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_names_fail() {
        let attrs = vec![
            Attribute::numeric("a"),
            Attribute::numeric("a"),
            Attribute::nominal("class", labels()),
        ];
        match AttributeSchema::derive(&attrs) {
            Err(ClassifierError::DuplicateAttribute(name)) => assert_eq!(name, "a"),
            other => panic!("expected DuplicateAttribute, got {:?}", other),
        }
    }

    #[test]
    fn decode_class_value_rejects_missing_and_out_of_range() {
        let attrs = vec![Attribute::numeric("x"), Attribute::nominal("class", labels())];
        let schema = AttributeSchema::derive(&attrs).unwrap();
        assert_eq!(schema.decode_class_value(1.0), Some("b"));
        assert_eq!(schema.decode_class_value(f64::NAN), None);
        assert_eq!(schema.decode_class_value(2.0), None);
        assert_eq!(schema.label_index("a"), Some(0));
    }
}
