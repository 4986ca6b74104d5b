use ndarray::ArrayView1;

use crate::config::OptionList;
use crate::data_handling::RawDataset;
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{argmax, class_domain_size, class_of, Classifier};

/// Majority-class baseline.
#[derive(Debug, Clone, Default)]
pub struct ZeroR {
    prediction: Option<usize>,
}

impl ZeroR {
    pub fn from_args(args: &[String]) -> Result<Self> {
        OptionList::new("ZeroR", args).finish()?;
        Ok(Self::default())
    }
}

impl Classifier for ZeroR {
    fn fit(&mut self, data: &RawDataset, class_index: usize) -> Result<()> {
        let num_classes = class_domain_size(data, class_index)?;
        let mut counts = vec![0.0; num_classes];
        for row in 0..data.num_rows() {
            if let Some(c) = class_of(data, row, class_index, num_classes) {
                counts[c] += 1.0;
            }
        }
        self.prediction = Some(argmax(&counts));
        Ok(())
    }

    fn predict_index(&self, _row: ArrayView1<'_, f64>) -> Result<usize> {
        self.prediction
            .ok_or_else(|| ClassifierError::Inference("ZeroR used before it was fitted".to_string()))
    }

    fn name(&self) -> &str {
        "ZeroR"
    }
}
