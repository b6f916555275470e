// Keyword selection by relative entropy.
//
// For each vocabulary term w:
//
//   p(w) = count of w over all topics / count of all terms over all topics
//   q(w) = count of w over relevant topics / count of all terms over relevant topics
//   score(w) = p(w) * (ln q(w) - ln p(w))
//
// which is w's contribution to the KL divergence between the relevant-topic
// word distribution and the corpus-wide one. Terms never seen in a relevant
// topic have q(w) = 0; they score -inf and are never selected.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::info;

use super::snapshot::{TopicModel, TopicWordCounts};
use crate::error::{Result, WheatError};

/// Default keyword list length when generating one.
pub const DEFAULT_KEYWORD_COUNT: usize = 100;

/// Score every vocabulary term. Order matches `vocabulary`.
pub fn keyword_scores(
    counts: &TopicWordCounts,
    vocabulary: &[String],
    relevant_topics: &[usize],
) -> Result<Vec<f64>> {
    if vocabulary.len() != counts.n_words() {
        return Err(WheatError::LengthMismatch {
            left_name: "vocabulary",
            left_len: vocabulary.len(),
            right_name: "word count columns",
            right_len: counts.n_words(),
        });
    }

    // Each relevant topic counts once, however often it was listed.
    let relevant: BTreeSet<usize> = relevant_topics.iter().copied().collect();
    let all_totals = counts.word_totals(0..counts.n_topics())?;
    let relevant_totals = counts.word_totals(relevant)?;

    let grand_total: u64 = all_totals.iter().sum();
    let relevant_grand_total: u64 = relevant_totals.iter().sum();

    let scores = all_totals
        .iter()
        .zip(&relevant_totals)
        .map(|(&all, &rel)| {
            if rel == 0 || relevant_grand_total == 0 {
                return f64::NEG_INFINITY;
            }
            // rel > 0 implies all > 0 and grand_total > 0.
            let p = all as f64 / grand_total as f64;
            let q = rel as f64 / relevant_grand_total as f64;
            p * (q.ln() - p.ln())
        })
        .collect();
    Ok(scores)
}

/// The `n` highest-scoring terms with their scores, best first.
///
/// Ties break on term string so the ranking is deterministic. Returns fewer
/// than `n` terms when fewer have any evidence in the relevant topics.
pub fn rank_keywords(
    counts: &TopicWordCounts,
    vocabulary: &[String],
    relevant_topics: &[usize],
    n: usize,
) -> Result<Vec<(String, f64)>> {
    let scores = keyword_scores(counts, vocabulary, relevant_topics)?;

    let mut ranked: Vec<(&String, f64)> = vocabulary
        .iter()
        .zip(scores)
        .filter(|(_, score)| score.is_finite())
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.truncate(n);

    if let Some((top, score)) = ranked.first() {
        info!(
            keywords = ranked.len(),
            top_keyword = top.as_str(),
            top_score = score,
            "Ranked keywords by relative entropy"
        );
    }

    Ok(ranked
        .into_iter()
        .map(|(term, score)| (term.clone(), score))
        .collect())
}

/// The `n` highest-scoring terms, best first.
pub fn select_keywords(
    counts: &TopicWordCounts,
    vocabulary: &[String],
    relevant_topics: &[usize],
    n: usize,
) -> Result<Vec<String>> {
    Ok(rank_keywords(counts, vocabulary, relevant_topics, n)?
        .into_iter()
        .map(|(term, _)| term)
        .collect())
}

/// Convenience wrapper over a snapshot.
pub fn select_model_keywords(
    model: &TopicModel,
    relevant_topics: &[usize],
    n: usize,
) -> Result<Vec<String>> {
    select_keywords(model.word_counts(), model.vocabulary(), relevant_topics, n)
}
