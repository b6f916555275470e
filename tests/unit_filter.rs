// Unit tests for the relevance scorer, filter criteria, and filter engine.

use std::collections::{BTreeMap, HashSet};

use wheat::filter::{
    evaluate_subset, filter_corpus, keyword_score, score_documents, superkeyword_hit, topic_score,
    FilterCriteria, KeywordSource, Subcorpus,
};
use wheat::topics::{TopicModel, TopicWordCounts};
use wheat::WheatError;

fn set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ============================================================
// topic_score
// ============================================================

#[test]
fn topic_score_sums_relevant_proportions() {
    let props = [0.25, 0.25, 0.0, 0.0, 0.0, 0.1, 0.4];
    let a = topic_score(&props, &[1, 2, 0]).unwrap();
    let b = topic_score(&props, &[0, 2, 5]).unwrap();
    assert!((a - 0.5).abs() < 1e-9, "Expected 0.5, got {a}");
    assert!((b - 0.35).abs() < 1e-9, "Expected 0.35, got {b}");
}

#[test]
fn topic_score_rejects_more_topics_than_proportions() {
    let err = topic_score(&[0.5, 0.5], &[0, 1, 1]).unwrap_err();
    assert!(matches!(err, WheatError::TooManyTopics { count: 3, width: 2 }));
}

// ============================================================
// keyword_score / superkeyword_hit
// ============================================================

#[test]
fn keyword_score_is_matching_token_ratio() {
    let keywords = set(&["mortgage", "credit", "loans", "market", "banks"]);
    let all = keyword_score("mortgage credit loans market banks", &keywords).unwrap();
    let most = keyword_score("mortgage credit whales market banks", &keywords).unwrap();
    assert!((all - 1.0).abs() < 1e-12, "Expected 1.0, got {all}");
    assert!((most - 0.8).abs() < 1e-12, "Expected 0.8, got {most}");
}

#[test]
fn keyword_score_rejects_empty_documents() {
    assert!(matches!(
        keyword_score("", &set(&["a"])),
        Err(WheatError::EmptyDocument)
    ));
}

#[test]
fn superkeywords_match_whole_tokens_only() {
    assert!(superkeyword_hit("hello beautiful mortgage people", &set(&["mortgage"])));
    assert!(!superkeyword_hit("hello subprim people", &set(&["subprime"])));
    assert!(!superkeyword_hit("hello mortgages people", &set(&["mortgage"])));
}

// ============================================================
// filter_corpus
// ============================================================

/// Two topics (finance, whaling) over ten documents of mixed content.
fn mixed_model() -> TopicModel {
    let counts = TopicWordCounts::from_dense(&[
        vec![9, 7, 6, 1, 0, 0, 2],
        vec![0, 1, 0, 8, 9, 5, 2],
    ])
    .unwrap();
    let vocab: Vec<String> = ["mortgage", "credit", "subprime_mortgage", "whale", "ship", "sea", "the"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut texts = Vec::new();
    let mut rows = Vec::new();
    for i in 0..10 {
        let finance = i % 2 == 0;
        let cleaned = if finance {
            "the mortgage credit the market".to_string()
        } else {
            "the whale ship the sea".to_string()
        };
        let p = if finance { 0.7 } else { 0.05 };
        texts.push((format!("doc{i}"), cleaned.clone(), format!("Raw {cleaned}.")));
        rows.push((format!("doc{i}"), vec![p, 1.0 - p]));
    }
    TopicModel::new(texts, rows, counts, vocab).unwrap()
}

#[test]
fn filter_output_is_a_strict_subset_for_mixed_corpus() {
    let model = mixed_model();
    let criteria =
        FilterCriteria::new(&model, &[0], KeywordSource::Generated(3), &[] as &[&str]).unwrap();
    let sub = filter_corpus(&model, &criteria).unwrap();

    assert!(!sub.is_empty());
    assert!(sub.len() < model.n_docs());
    for id in sub.ids() {
        assert!(model.document(id).is_some(), "{id} is not in the snapshot");
    }
    assert_eq!(sub.get("doc0"), Some("Raw the mortgage credit the market."));
}

#[test]
fn superkeyword_alone_is_enough() {
    let model = mixed_model();
    let criteria = FilterCriteria::new(
        &model,
        &[0],
        KeywordSource::Explicit(vec![]),
        &["whale"],
    )
    .unwrap()
    .with_thresholds(1.0, 1.0);
    let scores = score_documents(&model, &criteria).unwrap();
    let kept: Vec<&str> = scores
        .iter()
        .filter(|s| s.relevant)
        .map(|s| s.doc_id.as_str())
        .collect();
    assert_eq!(kept, vec!["doc1", "doc3", "doc5", "doc7", "doc9"]);
}

#[test]
fn threshold_equal_to_score_is_not_enough() {
    let model = mixed_model();
    let mut criteria =
        FilterCriteria::new(&model, &[0], KeywordSource::Explicit(vec![]), &[] as &[&str])
            .unwrap();
    criteria.set_keyword_threshold(1.0);
    criteria.set_topic_threshold(0.7);
    assert!(filter_corpus(&model, &criteria).unwrap().is_empty());

    criteria.set_topic_threshold(0.69);
    assert_eq!(filter_corpus(&model, &criteria).unwrap().len(), 5);
}

#[test]
fn superkeywords_expand_to_compound_terms() {
    let model = mixed_model();
    let criteria = FilterCriteria::new(
        &model,
        &[0],
        KeywordSource::Explicit(vec![]),
        &["Subprime"],
    )
    .unwrap();
    assert!(criteria.superkeywords().contains("subprime_mortgage"));
    assert!(criteria.superkeywords().contains("subprime"));
}

// ============================================================
// evaluate_subset
// ============================================================

#[test]
fn evaluation_matches_hand_computed_scores() {
    let sub: Subcorpus = [("a", "A."), ("b", "B."), ("c", "C.")]
        .into_iter()
        .map(|(id, raw)| (id.to_string(), raw.to_string()))
        .collect();
    let labels: BTreeMap<String, bool> = [
        ("a", true),
        ("b", true),
        ("c", false),
        ("d", true),
        ("e", false),
    ]
    .into_iter()
    .map(|(id, rel)| (id.to_string(), rel))
    .collect();

    let report = evaluate_subset(&sub, &labels);
    assert_eq!(report.true_positives, 2);
    assert_eq!(report.false_positives, 1);
    assert_eq!(report.false_negatives, 1);
    assert_eq!(report.true_negatives, 1);
    // precision 2/3, recall 2/3, F1 2/3
    assert!((report.precision - 2.0 / 3.0).abs() < 1e-12);
    assert!((report.recall - 2.0 / 3.0).abs() < 1e-12);
    assert!((report.f1 - 2.0 / 3.0).abs() < 1e-12, "got {}", report.f1);
}
