// Relevance filtering — scoring, criteria, the filter pass, and evaluation.

pub mod criteria;
pub mod engine;
pub mod evaluate;
pub mod scoring;

pub use criteria::{FilterCriteria, KeywordSource};
pub use engine::{filter_corpus, score_documents, subcorpus_from_scores, DocumentScores, Subcorpus};
pub use evaluate::{evaluate_subset, labels_for_snapshot, read_labels, SubsetReport};
pub use scoring::{expand_superkeywords, keyword_score, superkeyword_hit, topic_score, TermSet};
