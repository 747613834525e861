use crate::schema::manager::{Result, SchemaManager, SchemaManagerError};
use crate::schema::mapping::DocumentClassMap;
use crate::solr::core::{SolrCore, SolrCoreError, StandaloneSolrCore};
use async_trait::async_trait;
use std::time::Duration;

/// `SchemaManager` backed by one Solr core per document class.
///
/// Updating the indexes of a class reloads its core, which makes Solr re-read the schema and
/// re-open the index, then pings the core to make sure it came back.
pub struct SolrSchemaManager<C: SolrCore> {
    cores: Vec<(String, C)>,
}

impl<C: SolrCore> SolrSchemaManager<C> {
    pub fn new(cores: Vec<(String, C)>) -> Self {
        SolrSchemaManager { cores }
    }

    fn find_core(&self, document_class: &str) -> Option<&C> {
        self.cores
            .iter()
            .find(|(class, _)| class == document_class)
            .map(|(_, core)| core)
    }

    async fn update_core(
        &self,
        document_class: &str,
        core: &C,
        timeout_ms: Option<u64>,
    ) -> Result<()> {
        // 0 means "no limit" for acknowledged writes.
        let timeout = timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        tracing::info!(
            "Reload core `{}` to update indexes of {}",
            core.name(),
            document_class
        );
        core.reload(timeout).await?;

        let ping = core.ping().await?;
        if ping.status != "OK" {
            let message = format!(
                "core `{}` is not healthy after reload: status {}",
                core.name(),
                ping.status
            );
            tracing::error!("{}", message);
            return Err(SchemaManagerError::UnexpectedError(message));
        }

        tracing::debug!("core `{}` reloaded", core.name());
        Ok(())
    }
}

impl SolrSchemaManager<StandaloneSolrCore> {
    pub fn connect(
        mapping: &DocumentClassMap,
        solr_url: &str,
    ) -> std::result::Result<Self, SolrCoreError> {
        let mut cores = Vec::with_capacity(mapping.len());
        for (class, core) in mapping.iter() {
            cores.push((class.to_string(), StandaloneSolrCore::new(core, solr_url)?));
        }

        Ok(SolrSchemaManager::new(cores))
    }
}

#[async_trait]
impl<C: SolrCore> SchemaManager for SolrSchemaManager<C> {
    async fn update_document_indexes(
        &self,
        document_class: &str,
        timeout_ms: Option<u64>,
    ) -> Result<()> {
        let core = self
            .find_core(document_class)
            .ok_or_else(|| SchemaManagerError::UnknownDocumentClass(document_class.to_string()))?;

        self.update_core(document_class, core, timeout_ms).await
    }

    async fn update_indexes(&self, timeout_ms: Option<u64>) -> Result<()> {
        if self.cores.is_empty() {
            tracing::info!("No document class is mapped. Nothing to update.");
            return Ok(());
        }

        for (document_class, core) in self.cores.iter() {
            self.update_core(document_class, core, timeout_ms).await?;
        }
        Ok(())
    }
}
