// Topic model snapshots, keyword selection, and the MALLET adapter.

pub mod keywords;
pub mod mallet;
pub mod prepare;
pub mod snapshot;
pub mod traits;

pub use keywords::{rank_keywords, select_keywords, DEFAULT_KEYWORD_COUNT};
pub use mallet::{MalletArtifacts, MalletConfig, MalletTrainer, TrainingOptions};
pub use prepare::{PreparedDocument, Preprocessing};
pub use snapshot::{SnapshotDocument, TopicModel, TopicWordCounts};
pub use traits::TopicTrainer;
