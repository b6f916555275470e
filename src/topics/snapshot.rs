// TopicModel snapshot — the frozen output of one topic-modeling run.
//
// Holds the document-topic proportions, the sparse topic-word counts, the
// vocabulary, and the cleaned and raw text of every document. Built once by
// a trainer or artifact loader, validated on construction, and read-only
// afterwards: the filter layer borrows it and never mutates it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DataQualityWarning, Result, WheatError};

/// Corpora smaller than this give statistically unreliable topic proportions.
pub const MIN_RELIABLE_DOCS: usize = 100;

/// Tolerance for proportions that drift past [0, 1] through rounding.
const PROPORTION_EPSILON: f64 = 1e-6;

/// Sparse `n_topics x n_words` matrix of word counts per topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicWordCounts {
    n_words: usize,
    /// One sparse row per topic: word index -> count
    rows: Vec<BTreeMap<usize, u64>>,
}

impl TopicWordCounts {
    pub fn new(n_topics: usize, n_words: usize) -> Self {
        Self {
            n_words,
            rows: vec![BTreeMap::new(); n_topics],
        }
    }

    /// Build from dense rows (one per topic). Rows must share a width.
    pub fn from_dense(rows: &[Vec<u64>]) -> Result<Self> {
        let n_words = rows.first().map_or(0, Vec::len);
        let mut counts = Self::new(rows.len(), n_words);
        for (topic, row) in rows.iter().enumerate() {
            if row.len() != n_words {
                return Err(WheatError::InconsistentModel(format!(
                    "topic {topic} has {} word counts, expected {n_words}",
                    row.len()
                )));
            }
            for (word, &count) in row.iter().enumerate() {
                counts.add(topic, word, count)?;
            }
        }
        Ok(counts)
    }

    /// Add `count` occurrences of `word` to `topic`.
    pub fn add(&mut self, topic: usize, word: usize, count: u64) -> Result<()> {
        let n_topics = self.rows.len();
        let row = self.rows.get_mut(topic).ok_or(WheatError::TopicOutOfRange {
            index: topic,
            width: n_topics,
        })?;
        if word >= self.n_words {
            return Err(WheatError::InconsistentModel(format!(
                "word index {word} outside vocabulary of {} words",
                self.n_words
            )));
        }
        if count > 0 {
            *row.entry(word).or_insert(0) += count;
        }
        Ok(())
    }

    pub fn n_topics(&self) -> usize {
        self.rows.len()
    }

    pub fn n_words(&self) -> usize {
        self.n_words
    }

    pub fn get(&self, topic: usize, word: usize) -> u64 {
        self.rows
            .get(topic)
            .and_then(|row| row.get(&word))
            .copied()
            .unwrap_or(0)
    }

    /// Per-word totals summed over the given topics. Unknown topics are
    /// out-of-range input.
    pub fn word_totals<I>(&self, topics: I) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut totals = vec![0u64; self.n_words];
        for topic in topics {
            let row = self.rows.get(topic).ok_or(WheatError::TopicOutOfRange {
                index: topic,
                width: self.rows.len(),
            })?;
            for (&word, &count) in row {
                totals[word] += count;
            }
        }
        Ok(totals)
    }
}

/// One document as the model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub id: String,
    /// Preprocessed text the model was trained on
    pub cleaned: String,
    /// Unprocessed text returned in subcorpora
    pub raw: String,
    /// Topic proportions, `None` when the model has no row for this document
    pub topics: Option<Vec<f64>>,
}

/// The complete, validated output of one topic-modeling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicModel {
    documents: Vec<SnapshotDocument>,
    word_counts: TopicWordCounts,
    vocabulary: Vec<String>,
}

impl TopicModel {
    /// Assemble a snapshot from its parts.
    ///
    /// `texts` gives `(id, cleaned, raw)` in corpus order. `doc_topics` gives
    /// proportion rows keyed by document id; documents without a row are kept
    /// but cannot be scored. Every row must be `n_topics` wide (taken from
    /// `word_counts`), every proportion must lie in [0, 1], and every row id
    /// must name a known document.
    pub fn new(
        texts: Vec<(String, String, String)>,
        doc_topics: Vec<(String, Vec<f64>)>,
        word_counts: TopicWordCounts,
        vocabulary: Vec<String>,
    ) -> Result<Self> {
        if vocabulary.len() != word_counts.n_words() {
            return Err(WheatError::LengthMismatch {
                left_name: "vocabulary",
                left_len: vocabulary.len(),
                right_name: "word count columns",
                right_len: word_counts.n_words(),
            });
        }

        let n_topics = word_counts.n_topics();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(texts.len());
        for (i, (id, _, _)) in texts.iter().enumerate() {
            if let Some(first) = index.insert(id.as_str(), i) {
                return Err(WheatError::DuplicateId {
                    id: id.clone(),
                    first,
                    second: i,
                });
            }
        }

        let mut rows: Vec<Option<Vec<f64>>> = vec![None; texts.len()];
        for (id, row) in doc_topics {
            let Some(&i) = index.get(id.as_str()) else {
                return Err(WheatError::InconsistentModel(format!(
                    "topic proportions given for unknown document {id:?}"
                )));
            };
            if row.len() != n_topics {
                return Err(WheatError::InconsistentModel(format!(
                    "document {id:?} has {} topic proportions, expected {n_topics}",
                    row.len()
                )));
            }
            if let Some(bad) = row
                .iter()
                .find(|p| !(-PROPORTION_EPSILON..=1.0 + PROPORTION_EPSILON).contains(*p))
            {
                return Err(WheatError::InconsistentModel(format!(
                    "document {id:?} has topic proportion {bad} outside [0, 1]"
                )));
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > 0.01 {
                debug!(doc_id = %id, sum, "Topic proportions do not sum to 1");
            }
            rows[i] = Some(row);
        }

        let documents = texts
            .into_iter()
            .zip(rows)
            .map(|((id, cleaned, raw), topics)| SnapshotDocument {
                id,
                cleaned,
                raw,
                topics,
            })
            .collect();

        Ok(Self {
            documents,
            word_counts,
            vocabulary,
        })
    }

    pub fn documents(&self) -> &[SnapshotDocument] {
        &self.documents
    }

    pub fn document(&self, id: &str) -> Option<&SnapshotDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn word_counts(&self) -> &TopicWordCounts {
        &self.word_counts
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn n_docs(&self) -> usize {
        self.documents.len()
    }

    pub fn n_topics(&self) -> usize {
        self.word_counts.n_topics()
    }

    pub fn n_voc_words(&self) -> usize {
        self.vocabulary.len()
    }

    /// Non-fatal data-quality problems, each also logged at warn level.
    ///
    /// Pass the segmenter's `min_words` to also flag undersized documents.
    pub fn quality_warnings(&self, min_words: Option<usize>) -> Vec<DataQualityWarning> {
        let mut warnings = Vec::new();

        if self.n_docs() < MIN_RELIABLE_DOCS {
            warn!(
                n_docs = self.n_docs(),
                minimum = MIN_RELIABLE_DOCS,
                "Corpus is abnormally small; topic proportions may be unreliable"
            );
            warnings.push(DataQualityWarning::SmallCorpus {
                n_docs: self.n_docs(),
                minimum: MIN_RELIABLE_DOCS,
            });
        }

        if let Some(min_words) = min_words {
            for doc in &self.documents {
                let words = doc.raw.split_whitespace().count();
                if words < min_words {
                    warn!(doc_id = %doc.id, words, min_words, "Undersized document");
                    warnings.push(DataQualityWarning::UndersizedDocument {
                        doc_id: doc.id.clone(),
                        words,
                        min_words,
                    });
                }
            }
        }

        warnings
    }
}
