use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::RawJobRecord;

/// Executes the analysis query and returns one raw record per result row.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_jobs(&self, query: &str) -> Result<Vec<RawJobRecord>, SourceError>;

    /// Name used in log lines ("Retrieved N records from ...").
    fn source_name(&self) -> &'static str;
}
