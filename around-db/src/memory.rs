//! An in-process [`Store`] for tests and local runs.
//!
//! Documents are kept as raw JSON in write order, and geo queries compare haversine distances
//! against the radius with an inclusive bound, the same convention as a `geo_distance` query.

use crate::store::{GeoHits, GeoRadiusQuery, Namespace, Store, StoreError, StoredDocument};
use around_common::model::post::Location;
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
    time::Instant,
};
use time::Duration;

#[derive(Debug, Default)]
struct MemoryIndex {
    mapping: Value,
    documents: Vec<(String, StoredDocument)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    indices: RwLock<HashMap<String, MemoryIndex>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping the index was created with, if it exists.
    #[must_use]
    pub fn mapping(&self, index: &str) -> Option<Value> {
        self.indices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .map(|index| index.mapping.clone())
    }

    /// Number of documents in `index`, zero when it does not exist.
    #[must_use]
    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .map_or(0, |index| index.documents.len())
    }

    fn put(&self, namespace: Namespace<'_>, id: &str, document: Value) {
        let mut indices = self.indices.write().unwrap_or_else(PoisonError::into_inner);
        let index = indices.entry(namespace.index.to_owned()).or_default();
        let stored = StoredDocument {
            id: id.to_owned(),
            source: document,
        };

        let existing = index
            .documents
            .iter_mut()
            .find(|(doc_type, document)| doc_type == namespace.doc_type && document.id == id);
        match existing {
            Some((_, document)) => *document = stored,
            None => index
                .documents
                .push((namespace.doc_type.to_owned(), stored)),
        }
    }
}

/// Reads a `{lat, lon}` object the way a geo-point field would be indexed.
fn geo_point(source: &Value, field: &str) -> Option<Location> {
    let point = source.get(field)?;
    let lat = point.get("lat")?.as_f64()?;
    let lon = point.get("lon")?.as_f64()?;

    Location::new(lat, lon).ok()
}

#[async_trait]
impl Store for MemoryStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        Ok(self
            .indices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(index))
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), StoreError> {
        let mut indices = self.indices.write().unwrap_or_else(PoisonError::into_inner);
        if indices.contains_key(index) {
            return Err(StoreError::Status {
                status: 400,
                body: format!("index {index} already exists"),
            });
        }

        indices.insert(
            index.to_owned(),
            MemoryIndex {
                mapping: mapping.clone(),
                documents: Vec::new(),
            },
        );
        Ok(())
    }

    /// Writes are always visible immediately, `refresh` is accepted for either value.
    async fn index_document(
        &self,
        namespace: Namespace<'_>,
        id: &str,
        document: &Value,
        _refresh: bool,
    ) -> Result<(), StoreError> {
        self.put(namespace, id, document.clone());
        Ok(())
    }

    async fn geo_radius_query(&self, query: GeoRadiusQuery<'_>) -> Result<GeoHits, StoreError> {
        let started = Instant::now();
        let indices = self.indices.read().unwrap_or_else(PoisonError::into_inner);
        let index = indices
            .get(query.index)
            .ok_or_else(|| StoreError::MissingIndex(query.index.to_owned()))?;

        let radius = query.radius.as_kilometers();
        let matching: Vec<&StoredDocument> = index
            .documents
            .iter()
            .map(|(_, document)| document)
            .filter(|document| {
                geo_point(&document.source, query.field)
                    .is_some_and(|point| query.center.distance_to(point) <= radius)
            })
            .collect();

        Ok(GeoHits {
            took: Duration::try_from(started.elapsed()).unwrap_or(Duration::MAX),
            total: matching.len() as u64,
            hits: matching.into_iter().take(query.size).cloned().collect(),
        })
    }
}
