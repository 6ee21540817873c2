use crate::server::ServerRouter;
use axum::Router;

mod auth;
mod comments;
mod posts;
mod users;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(users::routes())
        .merge(auth::routes())
        .merge(posts::routes())
        .merge(comments::routes())
}
