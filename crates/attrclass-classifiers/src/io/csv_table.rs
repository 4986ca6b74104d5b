//! Headered CSV reader.
//!
//! Column types are inferred: a column whose non-missing cells all parse as
//! numbers is numeric, any other column is nominal with its labels in
//! first-encountered order.
use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::data_handling::{Attribute, AttributeKind, RawDataset};
use crate::error::{ClassifierError, Result};
use crate::io::{is_missing, read_to_string};

/// Read a headered CSV file. The relation name is the file stem.
pub fn read_csv_table<P: AsRef<Path>>(path: P) -> Result<RawDataset> {
    let path = path.as_ref();
    let content = read_to_string(path)?;
    let relation = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");
    parse_csv_table(&content, relation).map_err(|e| match e {
        ClassifierError::DatasetParse(msg) => {
            ClassifierError::DatasetParse(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

pub fn parse_csv_table(content: &str, relation: &str) -> Result<RawDataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ClassifierError::DatasetParse(format!("Failed to read CSV header row: {}", e)))?
        .clone();
    if headers.is_empty() {
        return Err(ClassifierError::DatasetParse("CSV header row is empty".to_string()));
    }
    let mut seen = HashSet::new();
    if let Some(name) = headers.iter().find(|name| !seen.insert(*name)) {
        return Err(ClassifierError::DatasetParse(format!("duplicate column '{}' in CSV header", name)));
    }

    let mut records: Vec<StringRecord> = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| ClassifierError::DatasetParse(format!("Failed to read row {}: {}", row_idx + 1, e)))?;
        records.push(record);
    }

    let attributes: Vec<Attribute> = headers
        .iter()
        .enumerate()
        .map(|(col, name)| Attribute {
            name: name.to_string(),
            kind: infer_kind(records.iter().filter_map(|r| r.get(col))),
        })
        .collect();

    let mut rows = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(attributes.len());
        for (cell, attr) in record.iter().zip(&attributes) {
            row.push(cell_value(cell, attr, row_idx)?);
        }
        rows.push(row);
    }

    RawDataset::from_rows(relation, attributes, rows)
}

fn cell_value(cell: &str, attr: &Attribute, row_idx: usize) -> Result<f64> {
    if is_missing(cell) {
        return Ok(f64::NAN);
    }
    match &attr.kind {
        AttributeKind::Numeric => cell.parse::<f64>().map_err(|_| {
            ClassifierError::DatasetParse(format!(
                "Invalid value '{}' for '{}' at row {}",
                cell,
                attr.name,
                row_idx + 1
            ))
        }),
        AttributeKind::Nominal(labels) => labels
            .iter()
            .position(|l| l == cell)
            .map(|idx| idx as f64)
            .ok_or_else(|| {
                ClassifierError::DatasetParse(format!("Unknown label '{}' at row {}", cell, row_idx + 1))
            }),
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> AttributeKind {
    let mut labels: Vec<String> = Vec::new();
    let mut numeric = true;
    for cell in cells.filter(|c| !is_missing(c)) {
        if numeric && cell.parse::<f64>().is_err() {
            numeric = false;
        }
        if !labels.iter().any(|l| l == cell) {
            labels.push(cell.to_string());
        }
    }
    if numeric {
        AttributeKind::Numeric
    } else {
        AttributeKind::Nominal(labels)
    }
}
