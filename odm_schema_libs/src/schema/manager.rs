use crate::solr::core::SolrCoreError;
use async_trait::async_trait;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaManagerError>;

#[derive(Debug, Error)]
pub enum SchemaManagerError {
    #[error("unknown document class `{0}`")]
    UnknownDocumentClass(String),
    #[error(transparent)]
    SolrCoreError(#[from] SolrCoreError),
    #[error("{0}")]
    UnexpectedError(String),
}

/// Applies the index definitions of mapped document classes to the backing store.
///
/// `timeout_ms` is the acknowledgement timeout for index creation. `None` leaves the choice to
/// the implementation.
#[async_trait]
pub trait SchemaManager: Send + Sync {
    async fn update_document_indexes(
        &self,
        document_class: &str,
        timeout_ms: Option<u64>,
    ) -> Result<()>;
    async fn update_indexes(&self, timeout_ms: Option<u64>) -> Result<()>;
}
