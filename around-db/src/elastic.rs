use crate::store::{GeoHits, GeoRadiusQuery, Namespace, Store, StoreError, StoredDocument};
use async_trait::async_trait;
use elasticsearch::{
    Elasticsearch, IndexParts, SearchParts,
    http::{
        StatusCode,
        response::Response,
        transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ElasticBuildError {
    #[error("Invalid store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to build store transport: {0}")]
    TransportBuild(#[from] BuildError),
}

/// A [`Store`] backed by a single Elasticsearch node.
#[derive(Clone)]
pub struct ElasticStore {
    client: Elasticsearch,
}

impl ElasticStore {
    pub fn new(url: &str) -> Result<Self, ElasticBuildError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).disable_proxy().build()?;

        Ok(Self {
            client: Elasticsearch::new(transport),
        })
    }
}

#[async_trait]
impl Store for ElasticStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(status_error(response).await),
        }
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(mapping)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn index_document(
        &self,
        namespace: Namespace<'_>,
        id: &str,
        document: &Value,
        refresh: bool,
    ) -> Result<(), StoreError> {
        // Mapping types are gone from the server, every document lands in `_doc`.
        debug!(index = namespace.index, doc_type = namespace.doc_type, id, "Indexing document");

        let refresh = if refresh { Refresh::True } else { Refresh::False };
        let response = self
            .client
            .index(IndexParts::IndexId(namespace.index, id))
            .refresh(refresh)
            .body(document)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn geo_radius_query(&self, query: GeoRadiusQuery<'_>) -> Result<GeoHits, StoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[query.index]))
            .body(geo_distance_body(&query))
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        let search_response: SearchResponse = serde_json::from_value(body)?;

        Ok(search_response.into_geo_hits())
    }
}

/// The request body for a `geo_distance` search.
#[must_use]
pub fn geo_distance_body(query: &GeoRadiusQuery<'_>) -> Value {
    json!({
        "size": query.size,
        "query": {
            "geo_distance": {
                "distance": query.radius.to_string(),
                query.field: {
                    "lat": query.center.lat(),
                    "lon": query.center.lon(),
                }
            }
        }
    })
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    if response.status_code().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

async fn status_error(response: Response) -> StoreError {
    let status = response.status_code().as_u16();
    match response.text().await {
        Ok(body) => StoreError::Status { status, body },
        Err(err) => err.into(),
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    took: i64,
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    total: TotalHits,
    hits: Vec<SearchHit>,
}

/// Older servers report a bare count, newer ones an object with a relation.
#[derive(Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

impl SearchResponse {
    fn into_geo_hits(self) -> GeoHits {
        let total = match self.hits.total {
            TotalHits::Count(count) | TotalHits::Object { value: count } => count,
        };

        GeoHits {
            took: Duration::milliseconds(self.took),
            total,
            hits: self
                .hits
                .hits
                .into_iter()
                .map(|hit| StoredDocument {
                    id: hit.id,
                    source: hit.source,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        elastic::{SearchResponse, geo_distance_body},
        store::GeoRadiusQuery,
    };
    use around_common::model::{post::Location, search::Distance};
    use serde_json::json;
    use time::Duration;

    #[test]
    fn geo_distance_request() {
        let query = GeoRadiusQuery {
            index: "around",
            field: "location",
            center: Location::new(37.1, -122.1).unwrap(),
            radius: Distance::kilometers(50.0).unwrap(),
            size: 100,
        };

        assert_eq!(
            geo_distance_body(&query),
            json!({
                "size": 100,
                "query": {
                    "geo_distance": {
                        "distance": "50km",
                        "location": { "lat": 37.1, "lon": -122.1 }
                    }
                }
            })
        );
    }

    #[test]
    fn search_response_with_total_object() {
        let body = json!({
            "took": 7,
            "timed_out": false,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "max_score": 1.0,
                "hits": [
                    { "_index": "around", "_id": "a", "_score": 1.0, "_source": { "user": "john" } },
                    { "_index": "around", "_id": "b", "_score": 1.0 }
                ]
            }
        });

        let hits = serde_json::from_value::<SearchResponse>(body)
            .unwrap()
            .into_geo_hits();

        assert_eq!(hits.took, Duration::milliseconds(7));
        assert_eq!(hits.total, 2);
        assert_eq!(hits.hits.len(), 2);
        assert_eq!(hits.hits[0].id, "a");
        assert_eq!(hits.hits[0].source, json!({ "user": "john" }));
        assert!(hits.hits[1].source.is_null());
    }

    #[test]
    fn search_response_with_bare_total() {
        let body = json!({
            "took": 3,
            "hits": { "total": 0, "hits": [] }
        });

        let hits = serde_json::from_value::<SearchResponse>(body)
            .unwrap()
            .into_geo_hits();

        assert_eq!(hits.total, 0);
        assert!(hits.hits.is_empty());
    }
}
