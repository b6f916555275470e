// Topic trainer trait — the boundary to the external modeling collaborator.
//
// The filter core only ever sees a finished `TopicModel`. How it was
// produced (a MALLET run, pre-computed artifacts, a test fixture) stays
// behind this trait.

use super::prepare::PreparedDocument;
use super::snapshot::TopicModel;
use crate::error::Result;

/// Trait for turning prepared documents into a topic model snapshot.
///
/// Training is a blocking call that returns a complete snapshot or fails;
/// there are no partial results.
pub trait TopicTrainer {
    fn train(&self, documents: &[PreparedDocument]) -> Result<TopicModel>;
}
