use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Per-file loading errors – absorbed by the directory loader
// ---------------------------------------------------------------------------

/// A failure while turning one source file into a canonical series. These are
/// caught per file: the offending file is logged and skipped, the batch
/// continues.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no recognizable time column among: {headers:?}")]
    MissingTimeColumn { headers: Vec<String> },

    #[error("no parseable timestamps in the time column")]
    NoParseableTimestamps,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Run-level errors – fatal, abort the pipeline
// ---------------------------------------------------------------------------

/// A failure that invalidates the whole run. No retries: inputs are local
/// and deterministic, so a second attempt would fail identically.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no valid series could be loaded from {dir}")]
    NoValidSeries { dir: PathBuf },

    #[error("only {found} windows produced, need at least {required}")]
    InsufficientWindows { found: usize, required: usize },
}
