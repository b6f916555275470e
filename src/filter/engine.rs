// Filter engine — score every document and keep the relevant ones.
//
// A full pass over the snapshot every time. Scores are plain values
// returned to the caller; nothing is cached on the snapshot, so changing
// a threshold means running the pass again.

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use tracing::{debug, info};

use super::criteria::FilterCriteria;
use super::scoring::{keyword_score, superkeyword_hit, topic_score};
use crate::error::{Result, WheatError};
use crate::topics::snapshot::TopicModel;

/// The three relevance signals for one document, and the verdict.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct DocumentScores {
    pub doc_id: String,
    pub topic_score: f64,
    pub keyword_score: f64,
    pub superkeyword_hit: bool,
    pub relevant: bool,
}

/// Relevant documents by id, with their raw text, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subcorpus {
    documents: Vec<(String, String)>,
}

impl Subcorpus {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.documents.iter().any(|(id, _)| id == doc_id)
    }

    pub fn get(&self, doc_id: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|(id, _)| id == doc_id)
            .map(|(_, raw)| raw.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|(id, _)| id.as_str())
    }

    /// `(doc_id, raw_text)` pairs in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .map(|(id, raw)| (id.as_str(), raw.as_str()))
    }
}

impl FromIterator<(String, String)> for Subcorpus {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

/// Serializes as a JSON object keyed by document id, in snapshot order.
impl Serialize for Subcorpus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.documents.len()))?;
        for (id, raw) in &self.documents {
            map.serialize_entry(id, raw)?;
        }
        map.end()
    }
}

/// Score every document that has topic proportions.
///
/// Documents without a proportion row cannot be scored and are left out.
/// A document whose cleaned text is empty scores 0 on keywords instead of
/// aborting the pass.
pub fn score_documents(model: &TopicModel, criteria: &FilterCriteria) -> Result<Vec<DocumentScores>> {
    let mut scores = Vec::with_capacity(model.n_docs());
    for doc in model.documents() {
        let Some(proportions) = &doc.topics else {
            debug!(doc_id = %doc.id, "No topic proportions; document cannot be scored");
            continue;
        };

        let topic = topic_score(proportions, criteria.relevant_topics())?;
        let keyword = match keyword_score(&doc.cleaned, criteria.keyword_set()) {
            Ok(score) => score,
            Err(WheatError::EmptyDocument) => {
                debug!(doc_id = %doc.id, "Empty document; keyword score is 0");
                0.0
            }
            Err(e) => return Err(e),
        };
        let hit = superkeyword_hit(&doc.cleaned, criteria.superkeywords());

        scores.push(DocumentScores {
            doc_id: doc.id.clone(),
            topic_score: topic,
            keyword_score: keyword,
            superkeyword_hit: hit,
            relevant: criteria.is_relevant(topic, keyword, hit),
        });
    }
    Ok(scores)
}

/// Classify every document and return the raw text of the relevant ones.
pub fn filter_corpus(model: &TopicModel, criteria: &FilterCriteria) -> Result<Subcorpus> {
    let scores = score_documents(model, criteria)?;
    let subcorpus = subcorpus_from_scores(model, &scores);
    info!(
        relevant = subcorpus.len(),
        scored = scores.len(),
        unscored = model.n_docs() - scores.len(),
        topic_threshold = criteria.topic_threshold(),
        keyword_threshold = criteria.keyword_threshold(),
        "Filtered corpus"
    );
    Ok(subcorpus)
}

/// Build the subcorpus from an existing score table without rescoring.
///
/// Documents keep snapshot order; scores for ids the snapshot does not hold
/// are ignored.
pub fn subcorpus_from_scores(model: &TopicModel, scores: &[DocumentScores]) -> Subcorpus {
    let relevant: HashSet<&str> = scores
        .iter()
        .filter(|s| s.relevant)
        .map(|s| s.doc_id.as_str())
        .collect();
    model
        .documents()
        .iter()
        .filter(|doc| relevant.contains(doc.id.as_str()))
        .map(|doc| (doc.id.clone(), doc.raw.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::criteria::KeywordSource;
    use crate::topics::snapshot::TopicWordCounts;

    fn model() -> TopicModel {
        let counts = TopicWordCounts::from_dense(&[vec![5, 0], vec![0, 5]]).unwrap();
        TopicModel::new(
            vec![
                ("a".into(), "loan loan whale".into(), "Loan, loan; whale.".into()),
                ("b".into(), "whale whale whale".into(), "Whale whale whale!".into()),
                ("c".into(), "".into(), "".into()),
                ("d".into(), "loan".into(), "Loan.".into()),
            ],
            vec![
                ("a".into(), vec![0.2, 0.8]),
                ("b".into(), vec![0.0, 1.0]),
                ("c".into(), vec![0.6, 0.4]),
            ],
            counts,
            vec!["loan".into(), "whale".into()],
        )
        .unwrap()
    }

    fn criteria(m: &TopicModel) -> FilterCriteria {
        FilterCriteria::new(
            m,
            &[0],
            KeywordSource::Explicit(vec!["loan".into()]),
            &[] as &[&str],
        )
        .unwrap()
    }

    #[test]
    fn keeps_raw_text_of_relevant_documents_in_order() {
        let m = model();
        let sub = filter_corpus(&m, &criteria(&m)).unwrap();
        let ids: Vec<&str> = sub.ids().collect();
        // a: keyword 2/3; c: topic 0.6 with an empty text; b: neither; d: no row
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(sub.get("a"), Some("Loan, loan; whale."));
    }

    #[test]
    fn empty_document_scores_zero_keywords() {
        let m = model();
        let scores = score_documents(&m, &criteria(&m)).unwrap();
        let c = scores.iter().find(|s| s.doc_id == "c").unwrap();
        assert_eq!(c.keyword_score, 0.0);
        assert!(c.relevant);
    }

    #[test]
    fn unscored_documents_are_excluded() {
        let m = model();
        let scores = score_documents(&m, &criteria(&m)).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(!filter_corpus(&m, &criteria(&m)).unwrap().contains("d"));
    }

    #[test]
    fn subcorpus_from_scores_matches_a_full_pass() {
        let m = model();
        let c = criteria(&m);
        let table = score_documents(&m, &c).unwrap();
        assert_eq!(subcorpus_from_scores(&m, &table), filter_corpus(&m, &c).unwrap());
    }

    #[test]
    fn subcorpus_from_scores_uses_the_table_verdicts() {
        let m = model();
        let mut table = score_documents(&m, &criteria(&m)).unwrap();
        for row in &mut table {
            row.relevant = row.doc_id == "b";
        }
        let sub = subcorpus_from_scores(&m, &table);
        assert_eq!(sub.ids().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn raising_thresholds_shrinks_the_subcorpus() {
        let m = model();
        let strict = criteria(&m).with_thresholds(0.9, 0.9);
        assert!(filter_corpus(&m, &strict).unwrap().is_empty());
    }

    #[test]
    fn serializes_as_ordered_object() {
        let m = model();
        let sub = filter_corpus(&m, &criteria(&m)).unwrap();
        let json = serde_json::to_string(&sub).unwrap();
        assert_eq!(json, r#"{"a":"Loan, loan; whale.","c":""}"#);
    }
}
