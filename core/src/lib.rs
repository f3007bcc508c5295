pub mod combiner;
pub mod config;
pub mod mapper;
pub mod reducer;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use combiner::combine;
pub use config::PipelineConfig;
pub use mapper::{map_shard, MapperKind};
pub use reducer::reduce;

/// Occurrence count for one (term, document) pair.
pub type Count = u64;

/// One mapper emission or one combiner merge: a term and the per-document
/// counts contributed so far. Each document key appears at most once and
/// every count is positive. Instances are fresh values, consumed by the
/// next stage and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialPosting {
    pub term: String,
    pub counts: HashMap<String, Count>,
}

impl PartialPosting {
    /// Record carrying a single document's count, the shape every mapper
    /// emission starts out as.
    pub fn single(term: impl Into<String>, doc: impl Into<String>, count: Count) -> Self {
        let mut counts = HashMap::new();
        counts.insert(doc.into(), count);
        Self { term: term.into(), counts }
    }
}

/// The reducer's terminal output for one term: total corpus-wide count per
/// document, sorted by document name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPosting {
    pub term: String,
    pub postings: Vec<(String, Count)>,
}
