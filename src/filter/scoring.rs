// Relevance signals — three independent, stateless scores per document.
//
// All token matching is exact on whitespace-delimited tokens. There is no
// substring matching: "subprim" does not hit "subprime".

use std::collections::{BTreeSet, HashSet};

use crate::error::{Result, WheatError};

/// A set of terms that can be probed for exact membership.
///
/// Lets callers pass keyword lists as slices, vectors, or sets without
/// converting first.
pub trait TermSet {
    fn contains_term(&self, term: &str) -> bool;
}

impl<T: AsRef<str>> TermSet for [T] {
    fn contains_term(&self, term: &str) -> bool {
        self.iter().any(|t| t.as_ref() == term)
    }
}

impl<T: AsRef<str>, const N: usize> TermSet for [T; N] {
    fn contains_term(&self, term: &str) -> bool {
        self.as_slice().contains_term(term)
    }
}

impl<T: AsRef<str>> TermSet for Vec<T> {
    fn contains_term(&self, term: &str) -> bool {
        self.as_slice().contains_term(term)
    }
}

impl TermSet for HashSet<String> {
    fn contains_term(&self, term: &str) -> bool {
        self.contains(term)
    }
}

impl TermSet for HashSet<&str> {
    fn contains_term(&self, term: &str) -> bool {
        self.contains(term)
    }
}

impl TermSet for BTreeSet<String> {
    fn contains_term(&self, term: &str) -> bool {
        self.contains(term)
    }
}

/// Sum of the document's proportions at the relevant topic indices.
///
/// Fails when more relevant topics are given than the document has
/// proportions, or when an index is out of range.
pub fn topic_score(proportions: &[f64], relevant_topics: &[usize]) -> Result<f64> {
    if relevant_topics.len() > proportions.len() {
        return Err(WheatError::TooManyTopics {
            count: relevant_topics.len(),
            width: proportions.len(),
        });
    }
    relevant_topics.iter().try_fold(0.0, |sum, &topic| {
        proportions
            .get(topic)
            .map(|p| sum + p)
            .ok_or(WheatError::TopicOutOfRange {
                index: topic,
                width: proportions.len(),
            })
    })
}

/// Fraction of the document's tokens that are keywords.
///
/// An empty (or all-whitespace) document has no tokens to divide by and is
/// an error.
pub fn keyword_score<K: TermSet + ?Sized>(text: &str, keywords: &K) -> Result<f64> {
    let (total, hits) = text.split_whitespace().fold((0usize, 0usize), |(total, hits), token| {
        (total + 1, hits + usize::from(keywords.contains_term(token)))
    });
    if total == 0 {
        return Err(WheatError::EmptyDocument);
    }
    Ok(hits as f64 / total as f64)
}

/// Whether any token of the document is a superkeyword.
pub fn superkeyword_hit<K: TermSet + ?Sized>(text: &str, superkeywords: &K) -> bool {
    text.split_whitespace().any(|token| superkeywords.contains_term(token))
}

/// Expand seed superkeywords against a vocabulary.
///
/// The result holds every lowercased seed plus every vocabulary term that
/// has a seed as one of its `_`-separated components, so "mortgage" also
/// matches the phrase term "subprime_mortgage".
pub fn expand_superkeywords<S: AsRef<str>>(seeds: &[S], vocabulary: &[String]) -> HashSet<String> {
    let seeds: HashSet<String> = seeds
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let compounds = vocabulary
        .iter()
        .filter(|term| term.contains('_') && term.split('_').any(|part| seeds.contains(part)))
        .cloned()
        .collect::<Vec<_>>();

    let mut expanded = seeds;
    expanded.extend(compounds);
    expanded
}
