use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Json, Query},
};
use around_common::{
    model::{
        ModelValidationError,
        post::{Location, Post},
        search::{Distance, SearchRequest},
    },
    spam::LexiconHandle,
};
use around_db::client::BoardClient;
use axum::extract::State;
use axum_extra::{
    TypedHeader,
    routing::{RouterExt, TypedPath},
};
use headers::AccessControlAllowOrigin;
use serde::{Deserialize, Deserializer, de::Error};
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(search_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/search", rejection(ServerError))]
struct SearchPath();

#[derive(Copy, Clone, PartialEq, Debug, Deserialize)]
struct SearchParams {
    lat: f64,
    lon: f64,
    /// Radius in kilometers.
    #[serde(default, deserialize_with = "empty_as_none")]
    range: Option<f64>,
}

/// `range=` counts as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(range) => range.parse().map(Some).map_err(D::Error::custom),
    }
}

impl SearchParams {
    fn into_request(self) -> Result<SearchRequest, ModelValidationError> {
        let center = Location::new(self.lat, self.lon)?;
        let radius = self.range.map(Distance::kilometers).transpose()?;

        Ok(SearchRequest::new(center, radius))
    }
}

async fn search_posts(
    SearchPath(): SearchPath,
    State(board): State<Arc<BoardClient>>,
    State(lexicon): State<Arc<LexiconHandle>>,
    Query(params): Query<SearchParams>,
) -> Result<(TypedHeader<AccessControlAllowOrigin>, Json<Vec<Post>>)> {
    let request = params.into_request()?;
    info!(
        lat = params.lat,
        lon = params.lon,
        radius = %request.radius(),
        "Received one request for search"
    );

    let result = board.search(&request, &lexicon.snapshot()).await?;

    Ok((TypedHeader(AccessControlAllowOrigin::ANY), Json(result.posts)))
}
