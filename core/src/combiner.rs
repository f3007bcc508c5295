use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::{Count, PartialPosting};

/// Sum one record's per-document counts into an accumulator. Shared by the
/// combiner and the reducer so both stages apply exactly the same merge.
pub(crate) fn merge_counts(acc: &mut HashMap<String, Count>, record: &PartialPosting) {
    for (doc, count) in &record.counts {
        *acc.entry(doc.clone()).or_insert(0) += count;
    }
}

/// Merge a group of same-term records into a single record.
///
/// The execution framework may hand this any subset of a term's records,
/// invoke it repeatedly on its own output, or skip it entirely; the sums are
/// associative and commutative, so the reducer's final result is the same in
/// every case. An empty group or a record keyed by a different term is a
/// contract violation and fails the task.
pub fn combine(term: &str, records: &[PartialPosting]) -> Result<PartialPosting> {
    if records.is_empty() {
        bail!("combiner invoked with no records for term {term:?}");
    }
    let mut counts = HashMap::new();
    for record in records {
        if record.term != term {
            bail!(
                "combiner group for {term:?} contains a record keyed {:?}",
                record.term
            );
        }
        merge_counts(&mut counts, record);
    }
    Ok(PartialPosting { term: term.to_string(), counts })
}
