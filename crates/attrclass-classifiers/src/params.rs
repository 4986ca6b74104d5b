//! Named-parameter input for classifying a single example.
use std::fmt;
use std::sync::Arc;

use crate::error::{ClassifierError, Result};
use crate::schema::AttributeSchema;

/// Value-attribute inputs for one classification, bound to a schema.
///
/// Meant to be reused across many instances by one caller: call
/// [`clear`](Self::clear) before filling it for the next instance. Each
/// concurrent caller needs its own `ClassifierParams`.
#[derive(Debug, Clone)]
pub struct ClassifierParams {
    schema: Arc<AttributeSchema>,
    slots: Vec<Option<f64>>,
}

impl ClassifierParams {
    pub fn new(schema: Arc<AttributeSchema>) -> Self {
        let slots = vec![None; schema.num_value_attributes()];
        Self { schema, slots }
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    fn slot(&self, key: &str) -> Result<usize> {
        self.schema
            .position_of(key)
            .ok_or_else(|| ClassifierError::InvalidAttribute(key.to_string()))
    }

    pub fn set_value(&mut self, key: &str, value: f64) -> Result<()> {
        let idx = self.slot(key)?;
        self.slots[idx] = Some(value);
        Ok(())
    }

    /// `Ok(None)` when the attribute exists but has not been set.
    pub fn get_value(&self, key: &str) -> Result<Option<f64>> {
        let idx = self.slot(key)?;
        Ok(self.slots[idx])
    }

    /// Dense feature vector in schema position order.
    pub fn get_list(&self) -> Result<Vec<f64>> {
        self.schema
            .value_attributes()
            .iter()
            .map(|attr| {
                self.slots[attr.position]
                    .ok_or_else(|| ClassifierError::AttributeNotSet(attr.name.clone()))
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }
}

impl fmt::Display for ClassifierParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class={}, values=[", self.schema.class_attribute().name)?;
        for (i, attr) in self.schema.value_attributes().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match self.slots[attr.position] {
                Some(v) => write!(f, "{}={}", attr.name, v)?,
                None => write!(f, "{}=<unset>", attr.name)?,
            }
        }
        write!(f, "]")
    }
}
