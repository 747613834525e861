use crate::solr::model::*;
use async_trait::async_trait;
use reqwest::{self, Client, Response, Url};
use std::time::Duration;
use thiserror::Error;

type Result<T> = std::result::Result<T, SolrCoreError>;

#[derive(Debug, Error)]
pub enum SolrCoreError {
    #[error("failed to request to solr core: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid Solr url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("{0}")]
    UnexpectedError(String),
}

#[async_trait]
pub trait SolrCore: Send + Sync {
    fn name(&self) -> &str;
    async fn ping(&self) -> Result<SolrPingResponse>;
    /// Reload the core so that it picks up its current schema and re-opens its index.
    ///
    /// `timeout` bounds the whole request. `None` waits for as long as Solr takes.
    async fn reload(&self, timeout: Option<Duration>) -> Result<SolrSimpleResponse>;
}

pub struct StandaloneSolrCore {
    name: String,
    admin_url: Url,
    ping_url: Url,
    client: Client,
}

impl StandaloneSolrCore {
    pub fn new(name: &str, solr_url: &str) -> Result<Self> {
        let mut solr_url = Url::parse(solr_url)?;
        solr_url.set_path("");
        let base_url = solr_url;
        let admin_url = base_url.join("solr/admin/cores")?;
        let ping_url = base_url.join(&format!("solr/{}/admin/ping", name))?;

        let client = Client::new();
        Ok(StandaloneSolrCore {
            name: String::from(name),
            admin_url,
            ping_url,
            client,
        })
    }
}

/// Build an error from a non-2xx response, carrying Solr's own message when the body has one.
async fn unexpected_error(res: Response, e: reqwest::Error) -> SolrCoreError {
    let msg = match res.json::<SolrSimpleResponse>().await {
        Ok(body) => body.error.map(|error| error.msg).unwrap_or_default(),
        Err(_) => String::default(),
    };
    SolrCoreError::UnexpectedError(format!("unexpected error [{}] cause [{}]", e, msg))
}

#[async_trait]
impl SolrCore for StandaloneSolrCore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ping(&self) -> Result<SolrPingResponse> {
        let res = self.client.get(self.ping_url.clone()).send().await?;
        if let Some(e) = res.error_for_status_ref().err() {
            return Err(unexpected_error(res, e).await);
        }

        let body: SolrPingResponse = res.json().await?;
        Ok(body)
    }

    async fn reload(&self, timeout: Option<Duration>) -> Result<SolrSimpleResponse> {
        let mut request = self
            .client
            .get(self.admin_url.clone())
            .query(&[("action", "RELOAD"), ("core", self.name.as_str())]);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let res = request.send().await?;
        if let Some(e) = res.error_for_status_ref().err() {
            return Err(unexpected_error(res, e).await);
        }

        let body: SolrSimpleResponse = res.json().await?;
        Ok(body)
    }
}
