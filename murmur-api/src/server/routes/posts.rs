use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Json, Message, Query},
    input::{IdQuery, RawId, required_id, required_text},
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::model::{
    post::{CreatePost, Post, PostMarker},
    user::UserMarker,
};
use murmur_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(list_posts)
        .typed_get(get_post)
        .typed_get(get_user_posts)
        .typed_post(add_post)
        .typed_put(edit_post)
        .typed_delete(delete_post)
}

#[derive(TypedPath)]
#[typed_path("/posts")]
struct PostsPath;

async fn list_posts(_: PostsPath, State(db): State<Arc<DbClient>>) -> Result<Json<Vec<Post>>> {
    let posts = db.list_posts().await?;

    Ok(Json(posts))
}

#[derive(TypedPath)]
#[typed_path("/post")]
struct PostPath;

async fn get_post(
    _: PostPath,
    State(db): State<Arc<DbClient>>,
    Query(IdQuery { id }): Query<IdQuery>,
) -> Result<Json<Post>> {
    let id = required_id::<PostMarker>(id.into(), "id", "Post ID is required")?;

    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

#[derive(TypedPath)]
#[typed_path("/posts/user")]
struct UserPostsPath;

// A user without posts and an unknown user both yield an empty list.
async fn get_user_posts(
    _: UserPostsPath,
    State(db): State<Arc<DbClient>>,
    Query(IdQuery { id }): Query<IdQuery>,
) -> Result<Json<Vec<Post>>> {
    let id = required_id::<UserMarker>(id.into(), "id", "User ID is required")?;

    let posts = db.fetch_user_posts(id).await?;

    Ok(Json(posts))
}

#[derive(TypedPath)]
#[typed_path("/addPost")]
struct AddPostPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
struct AddPostRequest {
    #[serde(rename = "userID")]
    user_id: RawId,
    #[serde(rename = "contentText")]
    content_text: String,
}

const ADD_POST_REQUIRED: &str = "UserID and content text are required";

async fn add_post(
    _: AddPostPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<AddPostRequest>,
) -> Result<Json<Message>> {
    let post = CreatePost {
        author: required_id(request.user_id, "userID", ADD_POST_REQUIRED)?,
        content: required_text(request.content_text, ADD_POST_REQUIRED)?,
    };

    db.create_post(&post).await?;

    Ok(Json(Message::new("Post added successfully")))
}

#[derive(TypedPath)]
#[typed_path("/editPost")]
struct EditPostPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
struct EditPostRequest {
    #[serde(rename = "postID")]
    post_id: RawId,
    #[serde(rename = "contentText")]
    content_text: String,
}

const EDIT_POST_REQUIRED: &str = "Post ID and content text are required";

async fn edit_post(
    _: EditPostPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<EditPostRequest>,
) -> Result<Json<Message>> {
    let content = required_text(request.content_text, EDIT_POST_REQUIRED)?;
    let id = required_id(request.post_id, "postID", EDIT_POST_REQUIRED)?;

    if !db.update_post_content(id, &content).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Json(Message::new("Post updated successfully")))
}

#[derive(TypedPath)]
#[typed_path("/deletePost")]
struct DeletePostPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
struct DeletePostRequest {
    #[serde(rename = "postID")]
    post_id: RawId,
}

async fn delete_post(
    _: DeletePostPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<DeletePostRequest>,
) -> Result<Json<Message>> {
    let id = required_id(request.post_id, "postID", "Post ID is required")?;

    if !db.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Json(Message::new("Post deleted successfully")))
}
