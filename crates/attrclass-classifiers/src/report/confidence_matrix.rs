//! Expected × actual label counts accumulated during evaluation.
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use ndarray::Array2;

use crate::error::{ClassifierError, Result};

/// Square count table over a fixed label set. Every cell exists from
/// construction; labels outside the set are rejected, never added.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMatrix {
    labels: Vec<String>,
    class_counts: Vec<usize>,
    index: HashMap<String, usize>,
    cells: Array2<usize>,
}

impl ConfidenceMatrix {
    /// `counts` lists each tracked label with the number of instances that
    /// carry it; the order defines report order.
    pub fn new(counts: Vec<(String, usize)>) -> Self {
        let (labels, class_counts): (Vec<String>, Vec<usize>) = counts.into_iter().unzip();
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        let n = labels.len();
        Self {
            labels,
            class_counts,
            index,
            cells: Array2::zeros((n, n)),
        }
    }

    fn index_of(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))
    }

    pub fn add_prediction(&mut self, expected: &str, actual: &str) -> Result<()> {
        let e = self.index_of(expected)?;
        let a = self.index_of(actual)?;
        self.cells[[e, a]] += 1;
        Ok(())
    }

    pub fn get(&self, expected: &str, actual: &str) -> Result<usize> {
        Ok(self.cells[[self.index_of(expected)?, self.index_of(actual)?]])
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label counts the matrix was constructed with.
    pub fn class_counts(&self) -> Vec<(&str, usize)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.class_counts.iter().copied())
            .collect()
    }

    pub fn cells(&self) -> &Array2<usize> {
        &self.cells
    }

    pub fn total(&self) -> usize {
        self.cells.sum()
    }

    pub fn correct(&self) -> usize {
        self.cells.diag().sum()
    }

    /// Predictions recorded for instances expected to be `label`.
    pub fn row_total(&self, label: &str) -> Result<usize> {
        Ok(self.cells.row(self.index_of(label)?).sum())
    }

    /// Add another matrix over the same label sequence cell by cell.
    pub fn merge(&mut self, other: &ConfidenceMatrix) -> Result<()> {
        if other.labels != self.labels {
            let unknown = other
                .labels
                .iter()
                .find(|l| !self.index.contains_key(*l))
                .or_else(|| self.labels.iter().find(|l| !other.index.contains_key(*l)))
                .cloned()
                .unwrap_or_else(|| other.labels.join(","));
            return Err(ClassifierError::UnknownLabel(unknown));
        }
        self.cells += &other.cells;
        Ok(())
    }

    /// Report lines, one per label in construction order.
    pub fn result_lines(&self) -> Vec<String> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let mut line = format!("For {}, num correct={}.", label, self.cells[[i, i]]);
                for (j, other) in self.labels.iter().enumerate() {
                    if j != i {
                        line.push_str(&format!(" Num incorrectly coded as {}={}.", other, self.cells[[i, j]]));
                    }
                }
                line
            })
            .collect()
    }

    pub fn get_results(&self) -> String {
        let mut out = String::new();
        for line in self.result_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Tab-separated dump: header row of actual labels, one row per expected label.
    pub fn write_tsv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
        let mut header = vec!["expected\\actual".to_string()];
        header.extend(self.labels.iter().cloned());
        wtr.write_record(&header)?;
        for (i, label) in self.labels.iter().enumerate() {
            let mut record = vec![label.clone()];
            record.extend(self.cells.row(i).iter().map(|c| c.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_tsv_to(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ConfidenceMatrix {
        ConfidenceMatrix::new(vec![
            ("setosa".to_string(), 2),
            ("versicolor".to_string(), 1),
            ("virginica".to_string(), 0),
        ])
    }

    #[test]
    fn starts_at_zero_and_increments_one_cell() {
        let mut m = matrix();
        assert_eq!(m.total(), 0);
        m.add_prediction("setosa", "versicolor").unwrap();
        assert_eq!(m.get("setosa", "versicolor").unwrap(), 1);
        assert_eq!(m.get("versicolor", "setosa").unwrap(), 0);
        assert_eq!(m.total(), 1);
        assert_eq!(m.correct(), 0);
        assert_eq!(m.row_total("setosa").unwrap(), 1);
    }

    #[test]
    fn unseen_labels_fail_by_name() {
        let mut m = matrix();
        match m.add_prediction("setosa", "rose") {
            Err(ClassifierError::UnknownLabel(l)) => assert_eq!(l, "rose"),
            other => panic!("expected UnknownLabel, got {:?}", other),
        }
        assert!(m.get("tulip", "setosa").is_err());
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn perfect_predictions_report() {
        let mut m = matrix();
        m.add_prediction("setosa", "setosa").unwrap();
        m.add_prediction("setosa", "setosa").unwrap();
        m.add_prediction("versicolor", "versicolor").unwrap();
        let lines = m.result_lines();
        assert_eq!(
            lines[0],
            "For setosa, num correct=2. Num incorrectly coded as versicolor=0. Num incorrectly coded as virginica=0."
        );
        assert_eq!(
            lines[2],
            "For virginica, num correct=0. Num incorrectly coded as setosa=0. Num incorrectly coded as versicolor=0."
        );
        assert_eq!(m.get_results().lines().count(), 3);
        for (label, count) in m.class_counts() {
            assert_eq!(m.get(label, label).unwrap(), count);
        }
    }

    #[test]
    fn merge_requires_same_labels() {
        let mut a = matrix();
        let mut b = matrix();
        a.add_prediction("setosa", "setosa").unwrap();
        b.add_prediction("setosa", "setosa").unwrap();
        b.add_prediction("virginica", "setosa").unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.get("setosa", "setosa").unwrap(), 2);
        assert_eq!(a.total(), 3);

        let other = ConfidenceMatrix::new(vec![("rose".to_string(), 1)]);
        assert!(matches!(a.merge(&other), Err(ClassifierError::UnknownLabel(_))));
    }

    #[test]
    fn writes_tsv() {
        let mut m = matrix();
        m.add_prediction("versicolor", "virginica").unwrap();
        let mut buf = Vec::new();
        m.write_tsv_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], "expected\\actual\tsetosa\tversicolor\tvirginica");
        assert_eq!(rows[2], "versicolor\t0\t0\t1");
    }
}
