pub mod schema;
pub mod solr;

pub use schema::manager::{SchemaManager, SchemaManagerError};
pub use schema::mapping::DocumentClassMap;
pub use schema::solr::SolrSchemaManager;
