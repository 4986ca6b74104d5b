//! C4.5 decision tree over numeric attributes (`J48`).
//!
//! Growth uses binary threshold splits chosen by gain ratio among the
//! attributes whose information gain is at least average, with the MDL
//! correction for the number of candidate thresholds. After growth the tree
//! is collapsed (splits that do not reduce training error are removed) and,
//! unless `-U` is given, pruned by subtree replacement using the pessimistic
//! upper confidence bound on leaf error.
use std::fmt::Write as _;

use ndarray::ArrayView1;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::OptionList;
use crate::data_handling::{AttributeKind, RawDataset};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{argmax, class_domain_size, class_of, Classifier};

const SMALL: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct J48 {
    confidence: f64,
    min_leaf: usize,
    unpruned: bool,
    tree: Option<FittedTree>,
}

#[derive(Debug, Clone)]
struct FittedTree {
    root: Node,
    width: usize,
    attribute_names: Vec<String>,
    labels: Vec<String>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        counts: Vec<f64>,
    },
    Split {
        attribute: usize,
        threshold: f64,
        counts: Vec<f64>,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn counts(&self) -> &[f64] {
        match self {
            Node::Leaf { counts } | Node::Split { counts, .. } => counts,
        }
    }

    fn total(&self) -> f64 {
        self.counts().iter().sum()
    }

    /// Training records at this node not of its majority class.
    fn local_errors(&self) -> f64 {
        let counts = self.counts();
        self.total() - counts[argmax(counts)]
    }

    fn training_errors(&self) -> f64 {
        match self {
            Node::Leaf { .. } => self.local_errors(),
            Node::Split { left, right, .. } => left.training_errors() + right.training_errors(),
        }
    }

    fn num_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }

    fn num_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.num_nodes() + right.num_nodes(),
        }
    }

    fn into_leaf(self) -> Node {
        match self {
            Node::Split { counts, .. } => Node::Leaf { counts },
            leaf => leaf,
        }
    }
}

impl J48 {
    pub fn new(confidence: f64, min_leaf: usize, unpruned: bool) -> Result<Self> {
        if !(confidence > 0.0 && confidence <= 0.5) {
            return Err(ClassifierError::Training(format!(
                "J48: confidence factor must be in (0, 0.5], got {}",
                confidence
            )));
        }
        if min_leaf == 0 {
            return Err(ClassifierError::Training(
                "J48: minimum number of instances per leaf must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            confidence,
            min_leaf,
            unpruned,
            tree: None,
        })
    }

    /// `-C <confidence>` (default 0.25), `-M <min leaf>` (default 2), `-U` unpruned.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut opts = OptionList::new("J48", args);
        let unpruned = opts.take_flag('U');
        let confidence = opts.take_value('C')?;
        if unpruned && confidence.is_some() {
            return Err(ClassifierError::Training(
                "J48: a confidence factor makes no sense for an unpruned tree".to_string(),
            ));
        }
        let confidence = match confidence {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                ClassifierError::Training(format!("J48: invalid value '{}' for option -C", raw))
            })?,
            None => 0.25,
        };
        let min_leaf = opts.take_parsed('M', 2usize)?;
        opts.finish()?;
        Self::new(confidence, min_leaf, unpruned)
    }

    pub fn num_leaves(&self) -> Option<usize> {
        self.tree.as_ref().map(|t| t.root.num_leaves())
    }

    pub fn num_nodes(&self) -> Option<usize> {
        self.tree.as_ref().map(|t| t.root.num_nodes())
    }

    /// Text rendering of the fitted tree, one test per line.
    pub fn describe(&self) -> Option<String> {
        let tree = self.tree.as_ref()?;
        let mut out = String::new();
        tree.describe_node(&tree.root, 0, &mut out);
        Some(out)
    }
}

impl FittedTree {
    fn describe_node(&self, node: &Node, depth: usize, out: &mut String) {
        let Node::Split {
            attribute,
            threshold,
            left,
            right,
            ..
        } = node
        else {
            return;
        };
        let name = &self.attribute_names[*attribute];
        for (op, child) in [("<=", left), (">", right)] {
            let indent = "|   ".repeat(depth);
            let _ = write!(out, "{}{} {} {}", indent, name, op, threshold);
            match &**child {
                Node::Leaf { .. } => {
                    let label = &self.labels[argmax(child.counts())];
                    let errors = child.local_errors();
                    if errors > 0.0 {
                        let _ = writeln!(out, ": {} ({:.1}/{:.1})", label, child.total(), errors);
                    } else {
                        let _ = writeln!(out, ": {} ({:.1})", label, child.total());
                    }
                }
                split => {
                    out.push('\n');
                    self.describe_node(split, depth + 1, out);
                }
            }
        }
    }
}

impl Classifier for J48 {
    fn fit(&mut self, data: &RawDataset, class_index: usize) -> Result<()> {
        let num_classes = class_domain_size(data, class_index)?;
        let mut labels = vec![0usize; data.num_rows()];
        let mut rows = Vec::with_capacity(data.num_rows());
        for row in 0..data.num_rows() {
            if let Some(c) = class_of(data, row, class_index, num_classes) {
                labels[row] = c;
                rows.push(row);
            }
        }
        if rows.is_empty() {
            return Err(ClassifierError::Training(
                "J48: no training records with a known class".to_string(),
            ));
        }
        let features: Vec<usize> = data
            .attributes()
            .iter()
            .enumerate()
            .filter(|(idx, attr)| *idx != class_index && matches!(attr.kind, AttributeKind::Numeric))
            .map(|(idx, _)| idx)
            .collect();

        let grower = Grower {
            data,
            labels: &labels,
            num_classes,
            features,
            min_leaf: self.min_leaf as f64,
        };
        let grown = grower.grow(rows);
        log::debug!(
            "J48 grew {} nodes ({} leaves)",
            grown.num_nodes(),
            grown.num_leaves()
        );

        let mut root = collapse(grown);
        if !self.unpruned {
            let pruner = Pruner::new(self.confidence)?;
            root = pruner.prune(root);
        }
        log::debug!(
            "J48 final tree has {} nodes ({} leaves), {} training errors",
            root.num_nodes(),
            root.num_leaves(),
            root.training_errors()
        );

        let class_labels = data.attributes()[class_index]
            .labels()
            .map(|l| l.to_vec())
            .unwrap_or_default();
        self.tree = Some(FittedTree {
            root,
            width: data.num_attributes(),
            attribute_names: data.attributes().iter().map(|a| a.name.clone()).collect(),
            labels: class_labels,
        });
        Ok(())
    }

    fn predict_index(&self, row: ArrayView1<'_, f64>) -> Result<usize> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| ClassifierError::Inference("J48 used before it was fitted".to_string()))?;
        if row.len() != tree.width {
            return Err(ClassifierError::Inference(format!(
                "J48 expects records of {} values, got {}",
                tree.width,
                row.len()
            )));
        }

        let mut node = &tree.root;
        loop {
            match node {
                Node::Leaf { counts } => return Ok(argmax(counts)),
                Node::Split {
                    attribute,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row[*attribute];
                    let next = if value.is_nan() {
                        if left.total() >= right.total() {
                            left
                        } else {
                            right
                        }
                    } else if value <= *threshold {
                        left
                    } else {
                        right
                    };
                    node = next.as_ref();
                }
            }
        }
    }

    fn name(&self) -> &str {
        "J48"
    }
}

fn entropy(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum()
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    attribute: usize,
    threshold: f64,
    info_gain: f64,
    gain_ratio: f64,
}

struct Grower<'a> {
    data: &'a RawDataset,
    labels: &'a [usize],
    num_classes: usize,
    features: Vec<usize>,
    min_leaf: f64,
}

impl Grower<'_> {
    fn counts(&self, rows: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.num_classes];
        for &r in rows {
            counts[self.labels[r]] += 1.0;
        }
        counts
    }

    fn grow(&self, rows: Vec<usize>) -> Node {
        let counts = self.counts(&rows);
        let n = rows.len() as f64;
        if n < 2.0 * self.min_leaf || counts[argmax(&counts)] == n {
            return Node::Leaf { counts };
        }
        let Some(split) = self.select_split(&rows) else {
            return Node::Leaf { counts };
        };

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut missing = Vec::new();
        for &r in &rows {
            let v = self.data.value(r, split.attribute);
            if v.is_nan() {
                missing.push(r);
            } else if v <= split.threshold {
                left.push(r);
            } else {
                right.push(r);
            }
        }
        if left.len() >= right.len() {
            left.extend(missing);
        } else {
            right.extend(missing);
        }
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { counts };
        }

        Node::Split {
            attribute: split.attribute,
            threshold: split.threshold,
            counts,
            left: Box::new(self.grow(left)),
            right: Box::new(self.grow(right)),
        }
    }

    fn select_split(&self, rows: &[usize]) -> Option<Candidate> {
        let candidates: Vec<Candidate> = self
            .features
            .iter()
            .filter_map(|&a| self.evaluate_attribute(a, rows))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let average_gain = candidates.iter().map(|c| c.info_gain).sum::<f64>() / candidates.len() as f64;

        let mut best: Option<Candidate> = None;
        for c in candidates {
            if c.info_gain < average_gain - 1e-3 {
                continue;
            }
            if best.map_or(true, |b| c.gain_ratio > b.gain_ratio) {
                best = Some(c);
            }
        }
        best
    }

    fn evaluate_attribute(&self, attribute: usize, rows: &[usize]) -> Option<Candidate> {
        let mut known: Vec<(f64, usize)> = rows
            .iter()
            .filter_map(|&r| {
                let v = self.data.value(r, attribute);
                (!v.is_nan()).then(|| (v, self.labels[r]))
            })
            .collect();
        known.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = rows.len() as f64;
        let known_n = known.len() as f64;
        let raw_min_split = 0.1 * known_n / self.num_classes as f64;
        let min_split = if raw_min_split <= self.min_leaf {
            self.min_leaf
        } else {
            raw_min_split.min(25.0)
        };
        if known_n < 2.0 * min_split {
            return None;
        }

        let mut right = vec![0.0; self.num_classes];
        for &(_, c) in &known {
            right[c] += 1.0;
        }
        let parent_entropy = entropy(&right);
        let mut left = vec![0.0; self.num_classes];

        let mut split_points = 0usize;
        let mut best: Option<(usize, f64)> = None;
        for i in 0..known.len() - 1 {
            let c = known[i].1;
            left[c] += 1.0;
            right[c] -= 1.0;
            if known[i].0 - known[i + 1].0 >= -SMALL {
                continue;
            }
            let left_n = (i + 1) as f64;
            let right_n = known_n - left_n;
            if left_n < min_split || right_n < min_split {
                continue;
            }
            split_points += 1;
            let children = (left_n * entropy(&left) + right_n * entropy(&right)) / known_n;
            let gain = parent_entropy - children;
            if best.map_or(true, |(_, g)| gain > g) {
                best = Some((i, gain));
            }
        }
        let (split_idx, gain) = best?;

        let info_gain = gain * (known_n / total) - (split_points as f64).log2() / known_n;
        if info_gain <= SMALL {
            return None;
        }
        let left_n = (split_idx + 1) as f64;
        let split_info = entropy(&[left_n, known_n - left_n, total - known_n]);
        let gain_ratio = if split_info > 0.0 { info_gain / split_info } else { 0.0 };

        Some(Candidate {
            attribute,
            threshold: known[split_idx].0,
            info_gain,
            gain_ratio,
        })
    }
}

/// Replace splits that do not reduce training error with leaves.
fn collapse(node: Node) -> Node {
    if let Node::Leaf { .. } = node {
        return node;
    }
    if node.training_errors() >= node.local_errors() - 1e-3 {
        return node.into_leaf();
    }
    match node {
        Node::Split {
            attribute,
            threshold,
            counts,
            left,
            right,
        } => Node::Split {
            attribute,
            threshold,
            counts,
            left: Box::new(collapse(*left)),
            right: Box::new(collapse(*right)),
        },
        leaf => leaf,
    }
}

/// Pessimistic-error subtree replacement.
struct Pruner {
    confidence: f64,
    z: f64,
}

impl Pruner {
    fn new(confidence: f64) -> Result<Self> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| ClassifierError::Training(e.to_string()))?;
        Ok(Self {
            confidence,
            z: normal.inverse_cdf(1.0 - confidence),
        })
    }

    fn prune(&self, node: Node) -> Node {
        let node = match node {
            Node::Split {
                attribute,
                threshold,
                counts,
                left,
                right,
            } => Node::Split {
                attribute,
                threshold,
                counts,
                left: Box::new(self.prune(*left)),
                right: Box::new(self.prune(*right)),
            },
            leaf => return leaf,
        };
        let errors_leaf = self.estimated_errors_for(node.total(), node.local_errors());
        let errors_tree = self.estimated_errors(&node);
        if errors_leaf <= errors_tree + 0.1 {
            node.into_leaf()
        } else {
            node
        }
    }

    fn estimated_errors(&self, node: &Node) -> f64 {
        match node {
            Node::Leaf { .. } => self.estimated_errors_for(node.total(), node.local_errors()),
            Node::Split { left, right, .. } => self.estimated_errors(left) + self.estimated_errors(right),
        }
    }

    fn estimated_errors_for(&self, n: f64, e: f64) -> f64 {
        if n <= 0.0 {
            return 0.0;
        }
        e + self.add_errs(n, e)
    }

    /// Extra errors predicted for a leaf covering `n` records with `e`
    /// observed errors, at the configured confidence level.
    fn add_errs(&self, n: f64, e: f64) -> f64 {
        let cf = self.confidence;
        if e < 1.0 {
            let base = n * (1.0 - cf.powf(1.0 / n));
            if e == 0.0 {
                return base;
            }
            return base + e * (self.add_errs(n, 1.0) - base);
        }
        if e + 0.5 >= n {
            return (n - e).max(0.0);
        }
        let z = self.z;
        let f = (e + 0.5) / n;
        let r = (f + (z * z) / (2.0 * n) + z * ((f / n) - (f * f / n) + (z * z / (4.0 * n * n))).sqrt())
            / (1.0 + (z * z) / n);
        r * n - e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::args;
    use crate::data_handling::Attribute;

    fn threshold_data() -> RawDataset {
        let attrs = vec![
            Attribute::numeric("x"),
            Attribute::numeric("noise"),
            Attribute::nominal("class", vec!["low".to_string(), "high".to_string()]),
        ];
        let rows = (1..=10)
            .map(|i| {
                let x = i as f64;
                vec![x, (i % 3) as f64, if x <= 5.0 { 0.0 } else { 1.0 }]
            })
            .collect();
        RawDataset::from_rows("t", attrs, rows).unwrap()
    }

    #[test]
    fn learns_a_threshold_split() {
        let ds = threshold_data();
        let mut tree = J48::from_args(&args(&["-C", "0.25", "-M", "2"])).unwrap();
        tree.fit(&ds, 2).unwrap();
        assert_eq!(tree.num_leaves(), Some(2));
        for r in 0..ds.num_rows() {
            let expected = ds.value(r, 2) as usize;
            assert_eq!(tree.predict_index(ds.row(r)).unwrap(), expected);
        }
        let text = tree.describe().unwrap();
        assert!(text.contains("x <= 5"), "{}", text);
    }

    #[test]
    fn missing_value_follows_heavier_branch() {
        let ds = threshold_data();
        let mut tree = J48::from_args(&[]).unwrap();
        tree.fit(&ds, 2).unwrap();
        let one = ds.single_example(vec![f64::NAN, 0.0, f64::NAN]).unwrap();
        assert!(tree.predict_index(one.row(0)).unwrap() < 2);
    }

    #[test]
    fn option_validation() {
        assert!(J48::from_args(&args(&["-C", "0.75"])).is_err());
        assert!(J48::from_args(&args(&["-M", "0"])).is_err());
        assert!(J48::from_args(&args(&["-U", "-C", "0.25"])).is_err());
        assert!(J48::from_args(&args(&["-U", "-M", "3"])).is_ok());
        assert!(J48::from_args(&args(&["-Z"])).is_err());
    }

    #[test]
    fn predict_before_fit_and_bad_width_fail() {
        let ds = threshold_data();
        let mut tree = J48::from_args(&[]).unwrap();
        assert!(matches!(
            tree.predict_index(ds.row(0)),
            Err(ClassifierError::Inference(_))
        ));
        tree.fit(&ds, 2).unwrap();
        let narrow = ndarray::arr1(&[1.0, 2.0]);
        assert!(tree.predict_index(narrow.view()).is_err());
    }

    #[test]
    fn pure_data_is_a_single_leaf() {
        let attrs = vec![
            Attribute::numeric("x"),
            Attribute::nominal("class", vec!["only".to_string(), "other".to_string()]),
        ];
        let ds = RawDataset::from_rows("t", attrs, (0..6).map(|i| vec![i as f64, 0.0]).collect()).unwrap();
        let mut tree = J48::from_args(&[]).unwrap();
        tree.fit(&ds, 1).unwrap();
        assert_eq!(tree.num_nodes(), Some(1));
        assert_eq!(tree.predict_index(ds.row(3)).unwrap(), 0);
    }

    #[test]
    fn add_errs_matches_closed_form_for_zero_errors() {
        let pruner = Pruner::new(0.25).unwrap();
        let expected = 6.0 * (1.0 - 0.25f64.powf(1.0 / 6.0));
        assert!((pruner.add_errs(6.0, 0.0) - expected).abs() < 1e-12);
        assert!(pruner.add_errs(10.0, 3.0) > 0.0);
        assert_eq!(pruner.add_errs(2.0, 2.0), 0.0);
    }

    #[test]
    fn entropy_of_even_split_is_one_bit() {
        assert!((entropy(&[5.0, 5.0]) - 1.0).abs() < 1e-12);
        assert_eq!(entropy(&[3.0, 0.0]), 0.0);
        assert_eq!(entropy(&[]), 0.0);
    }
}
