use crate::{
    model::{Id, post::PostMarker, user::UserMarker},
    util::NonEmptyText,
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Comment {
    #[serde(rename = "idComment")]
    pub id: Id<CommentMarker>,
    #[serde(rename = "idPost")]
    pub post_id: Id<PostMarker>,
    #[serde(rename = "idUser")]
    pub author_id: Id<UserMarker>,
    #[serde(rename = "content_text")]
    pub content: String,
    pub created_at: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreateComment {
    pub post: Id<PostMarker>,
    pub author: Id<UserMarker>,
    pub content: NonEmptyText,
}
