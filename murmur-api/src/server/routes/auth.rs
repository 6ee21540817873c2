use crate::server::{
    Result, ServerError, ServerRouter,
    extract::Json,
    input::{required_password, required_text},
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::model::user::{Credentials, User};
use murmur_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    Router::new().typed_post(login)
}

#[derive(TypedPath)]
#[typed_path("/login")]
struct LoginPath;

/// `username` may also hold the account's email address.
#[derive(Clone, Eq, PartialEq, Default, Hash, Deserialize)]
#[serde(default)]
struct LoginRequest {
    username: String,
    password: String,
}

const LOGIN_REQUIRED: &str = "Username and password are required";

// Plaintext comparison against the stored password. There is no session or
// token: clients keep the returned user around themselves.
async fn login(
    _: LoginPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>> {
    let credentials = Credentials {
        login: required_text(request.username, LOGIN_REQUIRED)?,
        password: required_password(request.password, LOGIN_REQUIRED)?,
    };

    let user = db
        .authenticate(credentials)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    info!(id = %user.id, "User logged in");
    Ok(Json(user))
}
