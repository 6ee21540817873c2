use crate::{
    model::{Id, user::UserMarker},
    util::NonEmptyText,
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    #[serde(rename = "idPost")]
    pub id: Id<PostMarker>,
    #[serde(rename = "content_text")]
    pub content: String,
    /// RFC 3339 timestamp assigned by the server on insert.
    pub created_at: String,
    #[serde(rename = "userID")]
    pub author_id: Id<UserMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreatePost {
    pub author: Id<UserMarker>,
    pub content: NonEmptyText,
}
