use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug)]
pub struct SolrResponseHeader {
    #[serde(alias = "zkConnected")]
    pub zk_connected: Option<Value>,
    pub status: u32,
    #[serde(alias = "QTime")]
    pub qtime: u32,
    pub params: Option<BTreeMap<String, Value>>,
}

/// Model of the response JSON of a request to `/solr/<CORE_NAME>/admin/ping`.
#[derive(Serialize, Deserialize, Debug)]
pub struct SolrPingResponse {
    #[serde(alias = "responseHeader")]
    pub header: SolrResponseHeader,
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SolrErrorInfo {
    pub metadata: Vec<String>,
    pub msg: String,
    pub code: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SolrSimpleResponse {
    #[serde(alias = "responseHeader")]
    pub header: SolrResponseHeader,
    pub error: Option<SolrErrorInfo>,
}
