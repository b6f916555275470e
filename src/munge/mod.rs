// Corpus munging — loading, sentence splitting, segmentation, and the
// persisted corpus format.

pub mod clean;
pub mod segment;
pub mod sentences;
pub mod source;
pub mod writer;

pub use segment::{segment, segment_source, Document, SegmentBounds};
pub use source::Corpus;
pub use writer::{read_corpus, write_corpus, DocumentRecord};
