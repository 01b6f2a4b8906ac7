use crate::{
    record::{
        LOCATION_FIELD, POST_DOC_TYPE, POST_INDEX, decode_post, post_document, post_index_mapping,
    },
    store::{GeoRadiusQuery, Namespace, Store, StoreError},
};
use around_common::{
    model::{
        Id,
        post::{Post, PostMarker},
        search::SearchRequest,
    },
    spam::{SpamLexicon, is_spam},
};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use thiserror::Error;
use time::Duration;
use tracing::{debug, info, warn};

/// The store's default result window.
pub const DEFAULT_MAX_HITS: usize = 10_000;

pub type Result<T, E = BoardError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("The store is unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("The search query failed: {0}")]
    QueryFailed(#[source] StoreError),
    #[error("The post could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of [`BoardClient::ingest`]. Spam is a regular outcome, not an error.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Ingestion {
    Accepted(Id<PostMarker>),
    Rejected,
}

impl Ingestion {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Ingestion::Accepted(_))
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct SearchResult {
    pub posts: Vec<Post>,
    /// Hits reported by the store, before decoding and filtering.
    pub total_hits: u64,
    pub took: Duration,
}

/// Ingestion and geo search on top of a shared [`Store`].
pub struct BoardClient {
    store: Arc<dyn Store>,
    index: String,
    max_hits: usize,
}

impl BoardClient {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            index: POST_INDEX.to_owned(),
            max_hits: DEFAULT_MAX_HITS,
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    #[must_use]
    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    /// Creates the post index with its geo-point mapping unless it exists already.
    pub async fn bootstrap(&self) -> Result<()> {
        let exists = self
            .store
            .index_exists(&self.index)
            .await
            .map_err(BoardError::StoreUnavailable)?;

        if exists {
            debug!(index = %self.index, "Index already exists");
        } else {
            self.store
                .create_index(&self.index, &post_index_mapping())
                .await
                .map_err(BoardError::StoreUnavailable)?;
            info!(index = %self.index, "Created index");
        }

        Ok(())
    }

    pub async fn ingest(&self, candidate: &Post, lexicon: &SpamLexicon) -> Result<Ingestion> {
        if is_spam(&candidate.message, lexicon) {
            warn!(
                body = %candidate.message,
                lexicon_version = lexicon.version(),
                "Post contains spam words, dropping it"
            );
            return Ok(Ingestion::Rejected);
        }

        let id = Id::<PostMarker>::generate();
        let document = post_document(candidate)?;
        let namespace = Namespace {
            index: &self.index,
            doc_type: POST_DOC_TYPE,
        };

        self.store
            .index_document(namespace, &id.to_string(), &document, true)
            .await
            .map_err(BoardError::StoreUnavailable)?;

        info!(%id, body = %candidate.message, "Post saved to index");
        Ok(Ingestion::Accepted(id))
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
        lexicon: &SpamLexicon,
    ) -> Result<SearchResult> {
        let query = GeoRadiusQuery {
            index: &self.index,
            field: LOCATION_FIELD,
            center: request.center,
            radius: request.radius(),
            size: self.max_hits,
        };

        let hits = self
            .store
            .geo_radius_query(query)
            .await
            .map_err(BoardError::QueryFailed)?;

        info!(took = %hits.took, total = hits.total, "Geo query finished");

        let mut posts = Vec::with_capacity(hits.hits.len());
        for hit in &hits.hits {
            let post = match decode_post(hit) {
                Ok(post) => post,
                Err(err) => {
                    warn!(id = %hit.id, error = %err, "Skipping undecodable hit");
                    continue;
                }
            };

            if is_spam(&post.message, lexicon) {
                warn!(
                    id = %hit.id,
                    lexicon_version = lexicon.version(),
                    "Hiding post containing spam words"
                );
                continue;
            }

            debug!(
                user = %post.user,
                body = %post.message,
                lat = post.location.lat(),
                lon = post.location.lon(),
                "Found post"
            );
            posts.push(post);
        }

        Ok(SearchResult {
            posts,
            total_hits: hits.total,
            took: hits.took,
        })
    }
}

impl Debug for BoardClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardClient")
            .field("index", &self.index)
            .field("max_hits", &self.max_hits)
            .finish_non_exhaustive()
    }
}
