//! Process exit codes. These are part of the CLI contract.

use jobhours_core::PipelineError;

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 1; // Failure outside a pipeline stage
pub const READ_ERROR: i32 = 2; // Query file missing or unreadable
pub const QUERY_ERROR: i32 = 3; // Engine, auth or transport failure
pub const DATA_ERROR: i32 = 4; // Unparseable dates or nothing left to summarize
pub const WRITE_ERROR: i32 = 5; // Output or report could not be written

/// Exit code for a failed run.
pub fn for_error(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PipelineError>()
        .map_or(INTERNAL_ERROR, PipelineError::exit_code)
}
