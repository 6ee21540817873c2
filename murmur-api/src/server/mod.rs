use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use extract::Json;
use murmur_common::model::{Id, post::PostMarker, user::UserMarker};
use murmur_db::client::{DbClient, DbError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod extract;
mod input;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes()
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ServerError {
    ServerError::MethodNotAllowed(method, uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Method {0} is not allowed for {1}")]
    MethodNotAllowed(Method, Uri),
    #[error("Invalid request data: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("Invalid query string: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Invalid {field}: {value:?} is not a number")]
    InvalidId { field: &'static str, value: String },
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserByIdNotFound(Id<UserMarker>),
    #[error("Post not found")]
    PostByIdNotFound(Id<PostMarker>),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::UserByIdNotFound(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::Database(DbError::MissingUser(_) | DbError::MissingPost(_)) => {
                StatusCode::NOT_FOUND
            }
            ServerError::MethodNotAllowed(..) => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::JsonRejection(_)
            | ServerError::QueryRejection(_)
            | ServerError::InvalidInput(_)
            | ServerError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}
