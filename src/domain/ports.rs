use crate::domain::model::{ResultTable, SearchRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run one cone search and return the matching rows. Empty results
    /// are a valid outcome, not an error.
    async fn search(&self, request: &SearchRequest) -> Result<ResultTable>;

    /// Check `schema.table` against the service's `tap_schema.tables`.
    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool>;
}
