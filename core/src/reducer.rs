use anyhow::{bail, Context, Result};
use std::collections::HashMap;

use crate::combiner::merge_counts;
use crate::{Count, FinalPosting, PartialPosting};

/// Merge every record for `term` into its final postings list.
///
/// Runs once per distinct term after the shuffle barrier, so `records`
/// carries the term's partial counts from every shard, already combined or
/// not. Postings are sorted by document name before serialization so output
/// is deterministic and diffable.
pub fn reduce(term: &str, records: &[PartialPosting]) -> Result<FinalPosting> {
    if records.is_empty() {
        bail!("reducer invoked with no records for term {term:?}");
    }
    let mut totals: HashMap<String, Count> = HashMap::new();
    for record in records {
        if record.term != term {
            bail!(
                "reducer group for {term:?} contains a record keyed {:?}",
                record.term
            );
        }
        merge_counts(&mut totals, record);
    }
    let mut postings: Vec<(String, Count)> = totals.into_iter().collect();
    postings.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(FinalPosting { term: term.to_string(), postings })
}

impl FinalPosting {
    /// Serialize as `term<TAB>doc1:count1 doc2:count2 ...`.
    pub fn to_line(&self) -> String {
        let entries: Vec<String> = self
            .postings
            .iter()
            .map(|(doc, count)| format!("{doc}:{count}"))
            .collect();
        format!("{}\t{}", self.term, entries.join(" "))
    }

    /// Parse one index output line back into a posting.
    pub fn from_line(line: &str) -> Result<Self> {
        let (term, rest) = line
            .split_once('\t')
            .with_context(|| format!("missing tab separator in index line {line:?}"))?;
        if term.is_empty() {
            bail!("empty term in index line {line:?}");
        }
        let mut postings = Vec::new();
        for entry in rest.split_whitespace() {
            // rsplit: the count is always numeric, the doc name may not be.
            let (doc, count) = entry
                .rsplit_once(':')
                .with_context(|| format!("malformed posting entry {entry:?} for term {term:?}"))?;
            if doc.is_empty() {
                bail!("empty document name in posting entry {entry:?} for term {term:?}");
            }
            let count: Count = count
                .parse()
                .with_context(|| format!("non-numeric count in posting entry {entry:?} for term {term:?}"))?;
            postings.push((doc.to_string(), count));
        }
        Ok(Self { term: term.to_string(), postings })
    }
}
