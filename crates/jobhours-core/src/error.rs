//! Error types for the analysis pipeline.
//!
//! Every variant names the stage it came from so the top-level run can log
//! one line with enough context to reproduce the failure.

use std::fmt;
use std::path::PathBuf;

/// Boxed error produced by a [`crate::JobSource`] implementation.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadQuery,
    Fetch,
    Clean,
    Statistics,
    Persist,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadQuery => "load_query",
            Self::Fetch => "fetch",
            Self::Clean => "clean",
            Self::Statistics => "statistics",
            Self::Persist => "persist",
            Self::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a cleaned table cannot be summarized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("no records left after filtering; statistics are undefined for an empty table")]
    EmptyTable,
}

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Query file missing or unreadable.
    #[error("error reading query file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Warehouse rejected or failed the query.
    #[error("error querying BigQuery: {source}")]
    Query {
        #[source]
        source: SourceError,
    },

    /// Start date could not be parsed.
    #[error("invalid StartDate {value:?} for job {job_num}: {reason}")]
    Parse {
        job_num: String,
        value: String,
        reason: String,
    },

    /// Table cannot be summarized.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Output file could not be written.
    #[error("error writing {}: {source}", path.display())]
    Write {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn query(source: impl Into<SourceError>) -> Self {
        Self::Query {
            source: source.into(),
        }
    }

    pub fn write(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            stage,
            path: path.into(),
            source,
        }
    }

    /// Stage that produced the error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Read { .. } => Stage::LoadQuery,
            Self::Query { .. } => Stage::Fetch,
            Self::Parse { .. } => Stage::Clean,
            Self::Data(_) => Stage::Statistics,
            Self::Write { stage, .. } => *stage,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Read { .. } => 2,
            Self::Query { .. } => 3,
            Self::Parse { .. } | Self::Data(_) => 4,
            Self::Write { .. } => 5,
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
