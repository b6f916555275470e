// Wheat: corpus segmentation and topic-based relevance filtering
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: munge raw text into documents, model topics over them, filter.

pub mod config;
pub mod error;
pub mod filter;
pub mod munge;
pub mod output;
pub mod topics;

pub use error::{DataQualityWarning, Result, WheatError};
