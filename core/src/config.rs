use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::mapper::MapperKind;

/// Static pipeline selection for one run: where the corpus lives, where
/// output goes, which mapper variant runs, whether the combiner stage is
/// active, and how many reducer partitions the shuffle routes terms to.
///
/// Reducer count affects only parallelism and output file placement, never
/// the semantic result; each term lands in exactly one partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub reducers: usize,
    pub mapper: MapperKind,
    pub combiner: bool,
}

impl PipelineConfig {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        reducers: usize,
        mapper: MapperKind,
        combiner: bool,
    ) -> Result<Self> {
        ensure!(reducers >= 1, "reducer count must be at least 1");
        Ok(Self {
            input: input.into(),
            output: output.into(),
            reducers,
            mapper,
            combiner,
        })
    }
}
