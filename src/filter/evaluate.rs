// Subset evaluation against hand-labeled documents.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::engine::Subcorpus;
use crate::error::{Result, WheatError};
use crate::topics::snapshot::TopicModel;

/// Confusion counts and derived scores for one filter run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubsetReport {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Compare a subcorpus against relevance labels.
///
/// Only labeled documents are counted. Precision is 0 when nothing labeled
/// was predicted relevant, recall is 0 when no label is positive, and F1 is
/// 0 when both are.
pub fn evaluate_subset(subcorpus: &Subcorpus, labels: &BTreeMap<String, bool>) -> SubsetReport {
    let predicted: HashSet<&str> = subcorpus.ids().collect();
    let (mut tp, mut fp, mut tn, mut fneg) = (0, 0, 0, 0);
    for (id, &relevant) in labels {
        match (predicted.contains(id.as_str()), relevant) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fneg += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fneg);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    let report = SubsetReport {
        true_positives: tp,
        false_positives: fp,
        true_negatives: tn,
        false_negatives: fneg,
        precision,
        recall,
        f1,
    };
    info!(precision, recall, f1, labeled = labels.len(), "Evaluated subset");
    report
}

/// Drop labels for documents the snapshot does not contain.
pub fn labels_for_snapshot(
    labels: BTreeMap<String, bool>,
    model: &TopicModel,
) -> BTreeMap<String, bool> {
    let known: HashSet<&str> = model.documents().iter().map(|d| d.id.as_str()).collect();
    let before = labels.len();
    let kept: BTreeMap<String, bool> = labels
        .into_iter()
        .filter(|(id, _)| known.contains(id.as_str()))
        .collect();
    if kept.len() < before {
        debug!(dropped = before - kept.len(), "Dropped labels for unknown documents");
    }
    kept
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    doc_ids: String,
    relevant: String,
}

fn parse_label(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Read labels from a CSV with `doc_ids` and `relevant` columns.
///
/// `relevant` accepts 1/0, true/false or yes/no. Other columns are ignored.
pub fn read_labels(path: &Path) -> Result<BTreeMap<String, bool>> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| WheatError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut labels = BTreeMap::new();
    for (i, row) in reader.deserialize::<LabelRow>().enumerate() {
        let row = row.map_err(|source| WheatError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        // Line 1 is the header.
        let relevant = parse_label(&row.relevant).ok_or_else(|| {
            WheatError::malformed(path, i + 2, format!("bad relevance label {:?}", row.relevant))
        })?;
        labels.insert(row.doc_ids.trim().to_string(), relevant);
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_spellings() {
        assert_eq!(parse_label(" 1 "), Some(true));
        assert_eq!(parse_label("False"), Some(false));
        assert_eq!(parse_label("maybe"), None);
    }

    #[test]
    fn reads_labels_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        std::fs::write(&path, "doc_ids,relevant,notes\ndoc0,1,x\ndoc1,0,\n").unwrap();
        let labels = read_labels(&path).unwrap();
        assert_eq!(labels.get("doc0"), Some(&true));
        assert_eq!(labels.get("doc1"), Some(&false));
    }

    #[test]
    fn bad_label_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        std::fs::write(&path, "doc_ids,relevant\ndoc0,1\ndoc1,perhaps\n").unwrap();
        let err = read_labels(&path).unwrap_err();
        assert!(err.to_string().contains(":3:"), "{err}");
    }

    #[test]
    fn nothing_predicted_has_zero_precision() {
        let labels: BTreeMap<String, bool> = [("a".to_string(), true)].into();
        let report = evaluate_subset(&Subcorpus::default(), &labels);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
        assert_eq!(report.false_negatives, 1);
    }
}
