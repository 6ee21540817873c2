use crate::server::{
    Result, ServerRouter,
    extract::{Json, Message, Query},
    input::{RawId, required_id, required_text},
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use murmur_common::model::{
    comment::{Comment, CreateComment},
    post::PostMarker,
};
use murmur_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(get_post_comments)
        .typed_post(add_comment)
}

#[derive(TypedPath)]
#[typed_path("/comments")]
struct CommentsPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct CommentsQuery {
    #[serde(default, rename = "idPost")]
    post_id: String,
}

async fn get_post_comments(
    _: CommentsPath,
    State(db): State<Arc<DbClient>>,
    Query(CommentsQuery { post_id }): Query<CommentsQuery>,
) -> Result<Json<Vec<Comment>>> {
    let post_id = required_id::<PostMarker>(post_id.into(), "idPost", "Post ID is required")?;

    let comments = db.fetch_post_comments(post_id).await?;

    Ok(Json(comments))
}

#[derive(TypedPath)]
#[typed_path("/addComment")]
struct AddCommentPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
struct AddCommentRequest {
    #[serde(rename = "postID")]
    post_id: RawId,
    #[serde(rename = "userID")]
    user_id: RawId,
    #[serde(rename = "contentText")]
    content_text: String,
}

const ADD_COMMENT_REQUIRED: &str = "PostID, userID, and content text are required";

async fn add_comment(
    _: AddCommentPath,
    State(db): State<Arc<DbClient>>,
    Json(request): Json<AddCommentRequest>,
) -> Result<Json<Message>> {
    let comment = CreateComment {
        post: required_id(request.post_id, "postID", ADD_COMMENT_REQUIRED)?,
        author: required_id(request.user_id, "userID", ADD_COMMENT_REQUIRED)?,
        content: required_text(request.content_text, ADD_COMMENT_REQUIRED)?,
    };

    db.create_comment(&comment).await?;

    Ok(Json(Message::new("Comment added successfully")))
}
