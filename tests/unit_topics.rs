// Unit tests for topic model snapshots, keyword selection, and MALLET
// artifact parsing.

use std::fs;
use std::path::PathBuf;

use wheat::topics::keywords::keyword_scores;
use wheat::topics::mallet::{read_doc_topics, read_word_counts};
use wheat::topics::{rank_keywords, select_keywords, MalletArtifacts, TopicWordCounts};
use wheat::WheatError;

fn vocab(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ============================================================
// Keyword selection
// ============================================================

#[test]
fn selected_keywords_always_have_relevant_topic_counts() {
    let counts = TopicWordCounts::from_dense(&[
        vec![5, 0, 3, 0, 1, 2],
        vec![0, 4, 1, 6, 0, 2],
        vec![1, 1, 0, 2, 7, 0],
    ])
    .unwrap();
    let words = vocab(&["bank", "whale", "loan", "ship", "sail", "water"]);

    let keywords = select_keywords(&counts, &words, &[0], 10).unwrap();
    let relevant_totals = counts.word_totals([0]).unwrap();
    for keyword in &keywords {
        let i = words.iter().position(|w| w == keyword).unwrap();
        assert!(relevant_totals[i] > 0, "{keyword} has no count in topic 0");
    }
    assert_eq!(keywords.len(), 4);
}

#[test]
fn keyword_list_is_no_longer_than_vocabulary() {
    let counts = TopicWordCounts::from_dense(&[vec![2, 3], vec![1, 1]]).unwrap();
    let words = vocab(&["x", "y"]);
    assert_eq!(select_keywords(&counts, &words, &[0, 1], 50).unwrap().len(), 2);
}

#[test]
fn ranking_is_descending_and_deterministic() {
    let counts = TopicWordCounts::from_dense(&[vec![4, 4, 2, 1], vec![1, 1, 3, 6]]).unwrap();
    let words = vocab(&["beta", "alpha", "gamma", "delta"]);

    let first = rank_keywords(&counts, &words, &[0], 4).unwrap();
    let second = rank_keywords(&counts, &words, &[0], 4).unwrap();
    assert_eq!(first, second);
    for pair in first.windows(2) {
        assert!(pair[0].1 >= pair[1].1, "{pair:?} out of order");
    }
    // alpha and beta tie; the term string breaks it
    assert_eq!(first[0].0, "alpha");
    assert_eq!(first[1].0, "beta");
}

#[test]
fn vocabulary_length_must_match_word_counts() {
    let counts = TopicWordCounts::from_dense(&[vec![1, 2, 3]]).unwrap();
    let err = keyword_scores(&counts, &vocab(&["only", "two"]), &[0]).unwrap_err();
    assert!(matches!(
        err,
        WheatError::LengthMismatch {
            left_len: 2,
            right_len: 3,
            ..
        }
    ));
}

// ============================================================
// MALLET artifacts
// ============================================================

#[test]
fn artifacts_are_all_or_nothing() {
    let some = |p: &str| Some(PathBuf::from(p));
    assert!(MalletArtifacts::from_parts(some("a"), some("b"), some("c"), some("d"))
        .unwrap()
        .is_some());

    let err = MalletArtifacts::from_parts(None, some("b"), None, some("d")).unwrap_err();
    assert!(err.is_config());
    let msg = err.to_string();
    assert!(msg.contains("doc_topics") && msg.contains("instances"), "{msg}");
}

#[test]
fn doc_topics_file_is_parsed_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doctopics.txt");
    fs::write(
        &path,
        "#doc name topic proportion ...\n0 doc0 0.1 0.9\n1 doc1 0.6 0.4\n",
    )
    .unwrap();
    let rows = read_doc_topics(&path).unwrap();
    assert_eq!(rows[1].0, "doc1");
    assert_eq!(rows[1].1, vec![0.6, 0.4]);
}

#[test]
fn word_counts_file_defines_vocabulary_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordcounts.txt");
    fs::write(&path, "0 sea 1:4\n1 bank 0:7 1:1\n2 loan 0:3\n").unwrap();
    let (counts, words) = read_word_counts(&path, 2).unwrap();
    assert_eq!(words, vocab(&["sea", "bank", "loan"]));
    assert_eq!(counts.word_totals([0]).unwrap(), vec![0, 7, 3]);
    assert_eq!(counts.word_totals([1]).unwrap(), vec![4, 1, 0]);
}

#[test]
fn malformed_word_count_pair_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordcounts.txt");
    fs::write(&path, "0 sea 1:4\n1 bank 0-7\n").unwrap();
    let err = read_word_counts(&path, 2).unwrap_err();
    assert!(matches!(err, WheatError::MalformedLine { line: 2, .. }), "{err}");
}
