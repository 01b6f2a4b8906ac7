use crate::server::ServerRouter;
use axum::Router;

mod posts;
mod search;

pub fn routes() -> ServerRouter {
    Router::new().merge(posts::routes()).merge(search::routes())
}
