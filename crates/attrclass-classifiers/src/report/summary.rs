use std::fmt;

use crate::evaluation::Evaluation;
use crate::report::confidence_matrix::ConfidenceMatrix;

/// One-line accuracy summary of a self-check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCheckSummary {
    pub source: String,
    pub total: usize,
    pub matched: usize,
}

impl SelfCheckSummary {
    pub fn new(source: impl Into<String>, total: usize, matched: usize) -> Self {
        Self {
            source: source.into(),
            total,
            matched,
        }
    }

    /// Every prediction in `matrix` counted as one instance.
    pub fn from_matrix(source: impl Into<String>, matrix: &ConfidenceMatrix) -> Self {
        Self::new(source, matrix.total(), matrix.correct())
    }

    /// Skipped instances count toward the total but never as matched.
    pub fn from_evaluation(source: impl Into<String>, evaluation: &Evaluation) -> Self {
        Self::new(source, evaluation.instances(), evaluation.matrix.correct())
    }

    /// Success percent, truncated toward zero. Zero when nothing was classified.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        100 * self.matched / self.total
    }
}

impl fmt::Display for SelfCheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Out of {} instances, {} matched the value in the {} file, for a success percent of {}",
            self.total,
            self.matched,
            self.source,
            self.percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_truncates() {
        assert_eq!(SelfCheckSummary::new("iris.arff", 150, 147).percent(), 98);
        assert_eq!(SelfCheckSummary::new("x", 3, 2).percent(), 66);
        assert_eq!(SelfCheckSummary::new("x", 0, 0).percent(), 0);
    }

    #[test]
    fn skipped_instances_count_toward_total() {
        let mut matrix = ConfidenceMatrix::new(vec![("a".to_string(), 3), ("b".to_string(), 1)]);
        matrix.add_prediction("a", "a").unwrap();
        matrix.add_prediction("b", "a").unwrap();
        let evaluation = Evaluation { matrix, skipped: 2 };
        let s = SelfCheckSummary::from_evaluation("t.arff", &evaluation);
        assert_eq!(s.total, 4);
        assert_eq!(s.matched, 1);
        assert_eq!(s.percent(), 25);
    }

    #[test]
    fn formats_summary_line() {
        let s = SelfCheckSummary::new("iris.arff", 150, 149);
        assert_eq!(
            s.to_string(),
            "Out of 150 instances, 149 matched the value in the iris.arff file, for a success percent of 99"
        );
    }
}
