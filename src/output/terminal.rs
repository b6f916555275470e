// Colored terminal output for keyword tables, filter runs and evaluations.
//
// main.rs display calls delegate here.

use colored::Colorize;

use crate::error::DataQualityWarning;
use crate::filter::criteria::FilterCriteria;
use crate::filter::engine::{DocumentScores, Subcorpus};
use crate::filter::evaluate::SubsetReport;
use crate::munge::segment::Document;

/// Display a ranked keyword list with relative-entropy scores.
pub fn display_keywords(ranked: &[(String, f64)], relevant_topics: &[usize]) {
    if ranked.is_empty() {
        println!("No terms have any weight in topics {relevant_topics:?}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Keywords for topics {relevant_topics:?} ({} terms) ===", ranked.len()).bold()
    );
    println!();
    println!("  {:>4}  {:<30} {:>10}", "Rank".dimmed(), "Term".dimmed(), "Score".dimmed());
    println!("  {}", "-".repeat(48).dimmed());

    for (i, (term, score)) in ranked.iter().enumerate() {
        println!("  {:>4}. {:<30} {:>10.5}", i + 1, term, score);
    }
    println!();
}

/// Summarize a segmentation run.
pub fn display_segments(documents: &[Document], min_words: usize) {
    let undersized = documents.iter().filter(|d| d.word_count() < min_words).count();
    let total_words: usize = documents.iter().map(Document::word_count).sum();

    println!(
        "\n{}",
        format!("=== Segmented {} documents ({total_words} words) ===", documents.len()).bold()
    );
    if undersized > 0 {
        println!(
            "  {} {undersized} document(s) below {min_words} words",
            "~".yellow()
        );
    }
    if let Some(first) = documents.first() {
        println!("  First: {}", super::truncate_chars(first.raw(), 100).dimmed());
    }
}

/// Summarize a filter run: thresholds, counts, and a preview of what was kept.
pub fn display_filter_summary(
    scores: &[DocumentScores],
    subcorpus: &Subcorpus,
    criteria: &FilterCriteria,
    n_docs: usize,
) {
    println!(
        "\n{}",
        format!("=== Filter ({} of {} documents kept) ===", subcorpus.len(), n_docs).bold()
    );
    println!(
        "  Topics {:?}  |  topic > {:.2}  |  keywords > {:.2}  |  {} keywords, {} superkeywords",
        criteria.relevant_topics(),
        criteria.topic_threshold(),
        criteria.keyword_threshold(),
        criteria.keywords().len(),
        criteria.superkeywords().len(),
    );

    let by_super = scores.iter().filter(|s| s.superkeyword_hit).count();
    let by_topic = scores
        .iter()
        .filter(|s| s.topic_score > criteria.topic_threshold())
        .count();
    let by_keyword = scores
        .iter()
        .filter(|s| s.keyword_score > criteria.keyword_threshold())
        .count();
    println!(
        "  Signals: {} superkeyword, {} topic, {} keyword",
        by_super.to_string().cyan(),
        by_topic.to_string().cyan(),
        by_keyword.to_string().cyan(),
    );

    let unscored = n_docs.saturating_sub(scores.len());
    if unscored > 0 {
        println!(
            "  {} {unscored} document(s) had no topic proportions and were skipped",
            "!".bright_red()
        );
    }

    println!();
    for (id, raw) in subcorpus.iter().take(5) {
        println!("  {:<12} {}", id.green(), super::truncate_chars(raw, 100).dimmed());
    }
    if subcorpus.len() > 5 {
        println!("  {}", format!("... and {} more", subcorpus.len() - 5).dimmed());
    }
    println!();
}

/// Display data-quality warnings.
pub fn display_warnings(warnings: &[DataQualityWarning]) {
    const SHOWN: usize = 10;
    for warning in warnings.iter().take(SHOWN) {
        println!("  {} {warning}", "warning:".yellow().bold());
    }
    if warnings.len() > SHOWN {
        println!(
            "  {}",
            format!("... {} more warnings", warnings.len() - SHOWN).dimmed()
        );
    }
}

/// Display precision/recall/F1 against labels.
pub fn display_report(report: &SubsetReport) {
    println!("\n{}", "=== Subset Evaluation ===".bold());
    println!(
        "  True positives: {}  False positives: {}  True negatives: {}  False negatives: {}",
        report.true_positives, report.false_positives, report.true_negatives, report.false_negatives
    );
    println!(
        "  Precision: {}  Recall: {}  F1: {}",
        colorize_ratio(report.precision),
        colorize_ratio(report.recall),
        colorize_ratio(report.f1),
    );
    println!();
}

fn colorize_ratio(value: f64) -> colored::ColoredString {
    let text = format!("{value:.3}");
    if value >= 0.8 {
        text.green()
    } else if value >= 0.5 {
        text.yellow()
    } else {
        text.red()
    }
}
