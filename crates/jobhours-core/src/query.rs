use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Default location of the analysis query, relative to the working directory.
pub const DEFAULT_QUERY_FILE: &str = "query.txt";

/// Read the query statement from `path`.
pub fn load_query(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use tempfile::tempdir;

    #[test]
    fn reads_whole_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("query.txt");
        let sql = "SELECT JobNum, StartDate\nFROM `prod.jobs`\nWHERE Active";
        std::fs::write(&path, sql).expect("write query");

        assert_eq!(load_query(&path).expect("load"), sql);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing.txt");

        let err = load_query(&path).expect_err("missing file must fail");
        assert!(matches!(err, PipelineError::Read { .. }));
        assert_eq!(err.stage(), Stage::LoadQuery);
        assert!(err.to_string().contains("missing.txt"));
    }
}
