use around_common::model::{post::Location, search::Distance};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use time::Duration;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("Store replied with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Store response could not be decoded: {0}")]
    Response(#[from] serde_json::Error),
    #[error("Index {0} does not exist")]
    MissingIndex(String),
}

/// Where a document lives: an index, and the document type inside it.
///
/// Elasticsearch 7 and later only have typeless indices, so [`crate::elastic::ElasticStore`]
/// writes every document to `_doc` and `doc_type` only shows up in its logs. The in-memory store
/// still keys documents by it.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Namespace<'a> {
    pub index: &'a str,
    pub doc_type: &'a str,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GeoRadiusQuery<'a> {
    pub index: &'a str,
    pub field: &'a str,
    pub center: Location,
    pub radius: Distance,
    pub size: usize,
}

/// A raw hit, before it is decoded into a model type.
#[derive(Clone, PartialEq, Debug)]
pub struct StoredDocument {
    pub id: String,
    pub source: Value,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct GeoHits {
    pub took: Duration,
    pub total: u64,
    pub hits: Vec<StoredDocument>,
}

/// The document index the board persists to and searches in.
#[async_trait]
pub trait Store: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), StoreError>;

    /// Writes `document` under `id`. With `refresh` set the write is visible to the next query.
    async fn index_document(
        &self,
        namespace: Namespace<'_>,
        id: &str,
        document: &Value,
        refresh: bool,
    ) -> Result<(), StoreError>;

    /// Returns every document whose `field` lies within `radius` of `center`, in store order.
    async fn geo_radius_query(&self, query: GeoRadiusQuery<'_>) -> Result<GeoHits, StoreError>;
}
