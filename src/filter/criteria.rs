// Filter criteria — what counts as relevant for one filter run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::scoring::expand_superkeywords;
use crate::error::{Result, WheatError};
use crate::topics::keywords::{select_model_keywords, DEFAULT_KEYWORD_COUNT};
use crate::topics::snapshot::TopicModel;

/// Default strict lower bound on the summed relevant-topic proportion.
pub const DEFAULT_TOPIC_THRESHOLD: f64 = 0.25;
/// Default strict lower bound on the keyword token ratio.
pub const DEFAULT_KEYWORD_THRESHOLD: f64 = 0.15;

/// Where the keyword list comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordSource {
    /// A caller-supplied list, used as given (lowercased).
    Explicit(Vec<String>),
    /// The top `n` terms by relative entropy over the relevant topics.
    Generated(usize),
}

impl Default for KeywordSource {
    fn default() -> Self {
        KeywordSource::Generated(DEFAULT_KEYWORD_COUNT)
    }
}

/// Relevant topics, keywords, superkeywords and the two thresholds.
///
/// Built against one snapshot, which validates the topic indices and
/// supplies the vocabulary for keyword generation and superkeyword
/// expansion. Thresholds can be changed between runs; everything else is
/// fixed unless the keywords are regenerated.
#[derive(Debug, Clone, Serialize)]
pub struct FilterCriteria {
    relevant_topics: Vec<usize>,
    keywords: Vec<String>,
    #[serde(skip)]
    keyword_set: HashSet<String>,
    superkeywords: HashSet<String>,
    topic_threshold: f64,
    keyword_threshold: f64,
}

impl FilterCriteria {
    pub fn new<S: AsRef<str>>(
        model: &TopicModel,
        relevant_topics: &[usize],
        keywords: KeywordSource,
        superkeywords: &[S],
    ) -> Result<Self> {
        let relevant_topics = validate_topics(relevant_topics, model.n_topics())?;

        let keywords = match keywords {
            KeywordSource::Explicit(list) => list.iter().map(|k| k.trim().to_lowercase()).collect(),
            KeywordSource::Generated(n) => select_model_keywords(model, &relevant_topics, n)?,
        };
        let superkeywords = expand_superkeywords(superkeywords, model.vocabulary());

        info!(
            relevant_topics = ?relevant_topics,
            keywords = keywords.len(),
            superkeywords = superkeywords.len(),
            "Built filter criteria"
        );

        Ok(Self {
            keyword_set: keywords.iter().cloned().collect(),
            relevant_topics,
            keywords,
            superkeywords,
            topic_threshold: DEFAULT_TOPIC_THRESHOLD,
            keyword_threshold: DEFAULT_KEYWORD_THRESHOLD,
        })
    }

    /// Builder-style threshold override.
    pub fn with_thresholds(mut self, topic_threshold: f64, keyword_threshold: f64) -> Self {
        self.topic_threshold = topic_threshold;
        self.keyword_threshold = keyword_threshold;
        self
    }

    pub fn set_topic_threshold(&mut self, threshold: f64) {
        self.topic_threshold = threshold;
    }

    pub fn set_keyword_threshold(&mut self, threshold: f64) {
        self.keyword_threshold = threshold;
    }

    /// Replace the keyword list with the top `n` generated terms.
    pub fn regenerate_keywords(&mut self, model: &TopicModel, n: usize) -> Result<()> {
        self.keywords = select_model_keywords(model, &self.relevant_topics, n)?;
        self.keyword_set = self.keywords.iter().cloned().collect();
        Ok(())
    }

    pub fn relevant_topics(&self) -> &[usize] {
        &self.relevant_topics
    }

    /// Keywords in rank order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub(crate) fn keyword_set(&self) -> &HashSet<String> {
        &self.keyword_set
    }

    pub fn superkeywords(&self) -> &HashSet<String> {
        &self.superkeywords
    }

    pub fn topic_threshold(&self) -> f64 {
        self.topic_threshold
    }

    pub fn keyword_threshold(&self) -> f64 {
        self.keyword_threshold
    }

    /// Combine the three signals. Any one strong signal suffices; both
    /// thresholds are strict.
    pub fn is_relevant(&self, topic_score: f64, keyword_score: f64, superkeyword_hit: bool) -> bool {
        superkeyword_hit
            || topic_score > self.topic_threshold
            || keyword_score > self.keyword_threshold
    }
}

/// Check indices against the model width and drop repeats, keeping order.
fn validate_topics(relevant_topics: &[usize], n_topics: usize) -> Result<Vec<usize>> {
    let mut seen = HashSet::new();
    let mut topics = Vec::with_capacity(relevant_topics.len());
    for &topic in relevant_topics {
        if topic >= n_topics {
            return Err(WheatError::TopicOutOfRange {
                index: topic,
                width: n_topics,
            });
        }
        if seen.insert(topic) {
            topics.push(topic);
        }
    }
    Ok(topics)
}
