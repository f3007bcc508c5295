use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::tokenizer::tokenize;
use crate::{Count, PartialPosting};

/// Which mapper variant runs over each shard. Selected once per run by
/// `PipelineConfig`; both variants feed the same combiner/reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperKind {
    /// Accumulate term counts across the whole shard, emit one record per
    /// distinct term at end of shard. Fewer records enter the shuffle.
    Counting,
    /// Emit a `{doc: 1}` record per token occurrence with no local state.
    /// Leaves all aggregation to the combiner/reducer.
    Presence,
}

impl FromStr for MapperKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counting" => Ok(Self::Counting),
            "presence" => Ok(Self::Presence),
            other => anyhow::bail!("unknown mapper variant {other:?} (expected `counting` or `presence`)"),
        }
    }
}

/// Run one mapper task over one shard.
///
/// `doc` is the shard's document name, bound once here and carried by every
/// emission. `emit` is the explicit output channel; each call hands it a
/// fresh record. No state survives this call, so re-running the same shard
/// after a task failure yields identical output.
pub fn map_shard<I, S, F>(kind: MapperKind, doc: &str, lines: I, emit: &mut F)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(PartialPosting),
{
    match kind {
        MapperKind::Counting => {
            let mut counts: HashMap<String, Count> = HashMap::new();
            for line in lines {
                for term in tokenize(line.as_ref()) {
                    *counts.entry(term).or_insert(0) += 1;
                }
            }
            tracing::debug!(doc, terms = counts.len(), "counting mapper flushing shard");
            for (term, count) in counts {
                emit(PartialPosting::single(term, doc, count));
            }
        }
        MapperKind::Presence => {
            for line in lines {
                for term in tokenize(line.as_ref()) {
                    emit(PartialPosting::single(term, doc, 1));
                }
            }
        }
    }
}
