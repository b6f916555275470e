// Error taxonomy for the library.
//
// Configuration errors and malformed input are fatal and carry enough
// context (field names, expected vs actual lengths, file and line) to
// diagnose without re-running. Data-quality problems are not errors at all:
// they come back as `DataQualityWarning` values next to a usable result.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WheatError>;

#[derive(Debug, Error)]
pub enum WheatError {
    // ---- configuration errors ----
    #[error(
        "MALLET artifacts must be supplied together or not at all (missing: {})",
        .missing.join(", ")
    )]
    PartialArtifacts { missing: Vec<&'static str> },

    #[error("length mismatch: {left_name} has {left_len} entries but {right_name} has {right_len}")]
    LengthMismatch {
        left_name: &'static str,
        left_len: usize,
        right_name: &'static str,
        right_len: usize,
    },

    #[error("duplicate unique id {id:?} at positions {first} and {second}")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("invalid segment bounds: min_words={min_words}, max_words={max_words}")]
    InvalidBounds { min_words: usize, max_words: usize },

    #[error("unable to run topic modeling tool at {}: {reason}", .path.display())]
    TrainerUnavailable { path: PathBuf, reason: String },

    #[error("unsupported stopword language {0:?}")]
    UnsupportedLanguage(String),

    // ---- input malformation ----
    #[error("{count} relevant topics given but documents only have {width} topic proportions")]
    TooManyTopics { count: usize, width: usize },

    #[error("topic index {index} is out of range for a model with {width} topics")]
    TopicOutOfRange { index: usize, width: usize },

    #[error("{field}[{index}] is not a valid record field: {reason}")]
    InvalidField {
        field: &'static str,
        index: usize,
        reason: String,
    },

    #[error("cannot compute keyword proportion of an empty document")]
    EmptyDocument,

    #[error("{}:{line}: {reason}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("inconsistent topic model: {0}")]
    InconsistentModel(String),

    // ---- external ----
    #[error("{command} failed ({status}): {stderr}")]
    Trainer {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl WheatError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WheatError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        WheatError::MalformedLine {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// True for errors caused by how the caller set things up, as opposed to
    /// bad data or a failing external tool.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            WheatError::PartialArtifacts { .. }
                | WheatError::LengthMismatch { .. }
                | WheatError::DuplicateId { .. }
                | WheatError::InvalidBounds { .. }
                | WheatError::TrainerUnavailable { .. }
                | WheatError::UnsupportedLanguage(_)
        )
    }
}

/// Non-fatal problems surfaced next to a usable result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataQualityWarning {
    /// Too few documents for topic proportions to be statistically reliable.
    SmallCorpus { n_docs: usize, minimum: usize },
    /// A document shorter than the segmenter's lower bound reached the model.
    UndersizedDocument {
        doc_id: String,
        words: usize,
        min_words: usize,
    },
}

impl std::fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataQualityWarning::SmallCorpus { n_docs, minimum } => write!(
                f,
                "corpus is abnormally small ({n_docs} documents, below {minimum})"
            ),
            DataQualityWarning::UndersizedDocument {
                doc_id,
                words,
                min_words,
            } => write!(
                f,
                "document {doc_id} has {words} words, below the {min_words}-word minimum"
            ),
        }
    }
}
