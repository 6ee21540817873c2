use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Json, Query},
    input::{IdQuery, RawId, required_id, required_text},
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::model::user::{User, UserMarker, UserUpdate};
use murmur_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(list_users)
        .typed_get(get_user)
        .typed_put(edit_user)
}

#[derive(TypedPath)]
#[typed_path("/users")]
struct UsersPath;

async fn list_users(_: UsersPath, State(db): State<Arc<DbClient>>) -> Result<Json<Vec<User>>> {
    let users = db.list_users().await?;

    Ok(Json(users))
}

#[derive(TypedPath)]
#[typed_path("/user")]
struct UserPath;

async fn get_user(
    _: UserPath,
    State(db): State<Arc<DbClient>>,
    Query(IdQuery { id }): Query<IdQuery>,
) -> Result<Json<User>> {
    let id = required_id::<UserMarker>(id.into(), "id", "User ID is required")?;

    let user = db
        .fetch_user(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(user))
}

#[derive(TypedPath)]
#[typed_path("/userEdit")]
struct EditUserPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
struct EditUserRequest {
    id: RawId,
    username: String,
    #[serde(rename = "displayName")]
    display_name: String,
    email: String,
}

const EDIT_USER_REQUIRED: &str = "ID, username, display name and email are required";

async fn edit_user(
    _: EditUserPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<EditUserRequest>,
) -> Result<Json<User>> {
    let update = UserUpdate {
        id: required_id(request.id, "id", EDIT_USER_REQUIRED)?,
        username: required_text(request.username, EDIT_USER_REQUIRED)?,
        display_name: required_text(request.display_name, EDIT_USER_REQUIRED)?,
        email: required_text(request.email, EDIT_USER_REQUIRED)?,
    };

    let user = db
        .update_user(&update)
        .await?
        .ok_or(ServerError::UserByIdNotFound(update.id))?;

    Ok(Json(user))
}
