//! IO utilities for loading labeled tabular datasets.

pub mod arff;
pub mod csv_table;

use std::path::Path;

pub use arff::{parse_arff, read_arff};
pub use csv_table::{parse_csv_table, read_csv_table};

use crate::data_handling::RawDataset;
use crate::error::{ClassifierError, Result};

/// Read a dataset, choosing the reader from the file extension (`.arff` or `.csv`).
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<RawDataset> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("arff") => read_arff(path),
        Some("csv") => read_csv_table(path),
        _ => Err(ClassifierError::DatasetParse(format!(
            "File must have a .arff or .csv extension: {}",
            path.display()
        ))),
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ClassifierError::DatasetParse(format!("Failed to read {}: {}", path.display(), e))
    })
}

/// `?` and empty cells are missing values.
pub(crate) fn is_missing(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "?"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_dataset("/tmp/data.txt").unwrap_err();
        assert!(matches!(err, ClassifierError::DatasetParse(_)));
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let err = read_dataset("/nonexistent/path/iris.arff").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
