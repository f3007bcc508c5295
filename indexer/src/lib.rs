use anyhow::{Context, Result};
use index_core::tokenizer::tokenize;
use index_core::{combine, map_shard, reduce, Count, FinalPosting, PartialPosting, PipelineConfig};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters reported after a run.
#[derive(Debug, Default)]
pub struct JobStats {
    pub shards: usize,
    /// Records emitted by the mappers.
    pub map_records: usize,
    /// Records entering the shuffle, after the optional combiner pass.
    pub shuffle_records: usize,
    /// Distinct terms written to output.
    pub terms: usize,
}

/// Every regular file under `input` is one shard; its document name is the
/// file name.
fn discover_shards(input: &Path) -> Result<Vec<PathBuf>> {
    let mut shards = Vec::new();
    if input.is_file() {
        shards.push(input.to_path_buf());
    } else {
        for entry in WalkDir::new(input) {
            let entry = entry.with_context(|| format!("scanning input {}", input.display()))?;
            if entry.file_type().is_file() {
                shards.push(entry.into_path());
            }
        }
    }
    shards.sort();
    Ok(shards)
}

fn shard_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Route a term to one of `reducers` partitions. DefaultHasher is unkeyed,
/// so placement is stable across runs.
fn partition_for(term: &str, reducers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    term.hash(&mut hasher);
    (hasher.finish() as usize) % reducers
}

/// Run the map → combine → shuffle → reduce pipeline in-process.
///
/// This is the single-machine stand-in for the distributed framework: one
/// mapper task per shard, an optional combiner pass over each shard's
/// grouped emissions, hash partitioning by term, and a per-partition sorted
/// reduce that writes one `part-NNNNN` file per partition.
pub fn run_job(config: &PipelineConfig) -> Result<JobStats> {
    let start = std::time::Instant::now();
    let shards = discover_shards(&config.input)?;
    tracing::info!(
        shards = shards.len(),
        reducers = config.reducers,
        mapper = ?config.mapper,
        combiner = config.combiner,
        "starting job"
    );

    let mut stats = JobStats { shards: shards.len(), ..Default::default() };

    // Shuffle buckets: partition -> term -> records. The BTreeMap plays the
    // framework's sort stage, so each partition reduces its terms in order.
    let mut buckets: Vec<BTreeMap<String, Vec<PartialPosting>>> =
        vec![BTreeMap::new(); config.reducers];

    for shard in &shards {
        let doc = shard_name(shard);
        let file =
            File::open(shard).with_context(|| format!("opening shard {}", shard.display()))?;
        let lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("reading shard {}", shard.display()))?;

        let mut emitted: Vec<PartialPosting> = Vec::new();
        map_shard(config.mapper, &doc, &lines, &mut |record| emitted.push(record));
        stats.map_records += emitted.len();

        let outgoing = if config.combiner {
            // Group this shard's emissions by term and pre-merge each group
            // before it crosses into the shuffle.
            let mut groups: BTreeMap<String, Vec<PartialPosting>> = BTreeMap::new();
            for record in emitted {
                groups.entry(record.term.clone()).or_default().push(record);
            }
            let mut combined = Vec::with_capacity(groups.len());
            for (term, group) in groups {
                combined.push(combine(&term, &group)?);
            }
            combined
        } else {
            emitted
        };
        stats.shuffle_records += outgoing.len();
        tracing::debug!(doc, records = outgoing.len(), "shard mapped");

        for record in outgoing {
            let p = partition_for(&record.term, config.reducers);
            buckets[p].entry(record.term.clone()).or_default().push(record);
        }
    }

    fs::create_dir_all(&config.output)
        .with_context(|| format!("creating output directory {}", config.output.display()))?;
    for (p, bucket) in buckets.into_iter().enumerate() {
        let path = config.output.join(format!("part-{p:05}"));
        let mut out = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        for (term, records) in bucket {
            let posting = reduce(&term, &records)?;
            writeln!(out, "{}", posting.to_line())?;
            stats.terms += 1;
        }
        out.flush()?;
    }

    tracing::info!(
        terms = stats.terms,
        map_records = stats.map_records,
        shuffle_records = stats.shuffle_records,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "job complete"
    );
    Ok(stats)
}

/// Load every `part-*` file from an output directory back into memory.
///
/// A term split across several lines or files has its counts summed, so
/// concatenated outputs of separate builds load as one merged index.
pub fn load_index(output: &Path) -> Result<BTreeMap<String, Vec<(String, Count)>>> {
    let mut index: BTreeMap<String, BTreeMap<String, Count>> = BTreeMap::new();
    for entry in WalkDir::new(output) {
        let entry = entry.with_context(|| format!("scanning index {}", output.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.starts_with("part-") {
            continue;
        }
        let file = File::open(entry.path())
            .with_context(|| format!("opening {}", entry.path().display()))?;
        for line in BufReader::new(file).lines() {
            let posting = FinalPosting::from_line(&line?)
                .with_context(|| format!("parsing {}", entry.path().display()))?;
            let docs = index.entry(posting.term).or_default();
            for (doc, count) in posting.postings {
                *docs.entry(doc).or_insert(0) += count;
            }
        }
    }
    Ok(index
        .into_iter()
        .map(|(term, docs)| (term, docs.into_iter().collect()))
        .collect())
}

/// Score boost for documents containing every query term.
const ALL_TERMS_BONUS: Count = 5;

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredDoc {
    pub doc: String,
    pub score: Count,
}

/// Per-term postings, conjunctive matches, and ranked hits for one query.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub query: String,
    /// Postings for each query term present in the index.
    pub terms: BTreeMap<String, BTreeMap<String, Count>>,
    /// Documents containing every query term.
    pub matches: BTreeSet<String>,
    /// Documents ranked by score, best first.
    pub ranked: Vec<ScoredDoc>,
}

/// Rank documents for a set of query terms.
///
/// A document scores the sum of its counts for every term it contains, plus
/// a flat bonus when it contains all of them. Ties break on document name
/// so the ordering is deterministic.
pub fn score_documents(
    index: &BTreeMap<String, Vec<(String, Count)>>,
    terms: &BTreeSet<String>,
) -> Vec<ScoredDoc> {
    let mut scores: BTreeMap<String, Count> = BTreeMap::new();
    for term in terms {
        if let Some(postings) = index.get(term) {
            for (doc, count) in postings {
                *scores.entry(doc.clone()).or_insert(0) += count;
            }
        }
    }
    for doc in docs_with_all_terms(index, terms) {
        if let Some(score) = scores.get_mut(&doc) {
            *score += ALL_TERMS_BONUS;
        }
    }
    let mut ranked: Vec<ScoredDoc> = scores
        .into_iter()
        .map(|(doc, score)| ScoredDoc { doc, score })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.doc.cmp(&b.doc)));
    ranked
}

/// Documents containing all of `terms`. A term absent from the index, or an
/// empty term list, matches nothing.
pub fn docs_with_all_terms(
    index: &BTreeMap<String, Vec<(String, Count)>>,
    terms: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut matches: Option<BTreeSet<String>> = None;
    for term in terms {
        let docs: BTreeSet<String> = match index.get(term) {
            Some(postings) => postings.iter().map(|(doc, _)| doc.clone()).collect(),
            None => return BTreeSet::new(),
        };
        matches = Some(match matches {
            Some(prev) => prev.intersection(&docs).cloned().collect(),
            None => docs,
        });
    }
    matches.unwrap_or_default()
}

/// Answer a free-text query against a built index. The query is tokenized
/// exactly like document text, so lookups always match the index's own
/// normalization.
pub fn query_index(output: &Path, query: &str) -> Result<QueryReport> {
    let index = load_index(output)?;
    let terms: BTreeSet<String> = tokenize(query).into_iter().collect();
    let matches = docs_with_all_terms(&index, &terms);
    let ranked = score_documents(&index, &terms);

    let mut term_postings = BTreeMap::new();
    for term in &terms {
        if let Some(postings) = index.get(term) {
            term_postings.insert(term.clone(), postings.iter().cloned().collect());
        }
    }
    Ok(QueryReport { query: query.to_string(), terms: term_postings, matches, ranked })
}
