use crate::server::{Result, ServerError, ServerRouter, extract::Json};
use around_common::{model::post::Post, spam::LexiconHandle};
use around_db::client::{BoardClient, Ingestion};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_post(create_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/post", rejection(ServerError))]
struct CreatePostPath();

/// Accepted posts get `200`, spam gets `422`. Both echo the message as plain text.
async fn create_post(
    CreatePostPath(): CreatePostPath,
    State(board): State<Arc<BoardClient>>,
    State(lexicon): State<Arc<LexiconHandle>>,
    Json(post): Json<Post>,
) -> Result<(StatusCode, String)> {
    info!(user = %post.user, "Received one post request");

    let reply = match board.ingest(&post, &lexicon.snapshot()).await? {
        Ingestion::Accepted(_) => (StatusCode::OK, format!("Post received: {}\n", post.message)),
        Ingestion::Rejected => (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Post rejected: {}\n", post.message),
        ),
    };

    Ok(reply)
}
