use murmur_common::model::{
    ModelValidationError, comment::Comment, post::Post, user::User,
};
use sqlx::FromRow;

// Every column except the primary keys is nullable in the schema, so NULLs
// are only rejected when a record is turned into a model.

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub struct PostRecord {
    pub post_id: i64,
    pub content_text: Option<String>,
    pub created_at: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub struct CommentRecord {
    pub comment_id: i64,
    pub post_id: Option<i64>,
    pub user_id: Option<i64>,
    pub content_text: Option<String>,
    pub created_at: Option<String>,
}

fn column<T>(value: Option<T>, name: &'static str) -> Result<T, ModelValidationError> {
    value.ok_or(ModelValidationError::MissingColumn(name))
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            username: column(value.username, "users.username")?,
            display_name: column(value.display_name, "users.displayName")?,
            email: column(value.email, "users.email")?,
        })
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.into(),
            content: column(value.content_text, "posts.content_text")?,
            created_at: column(value.created_at, "posts.created_at")?,
            author_id: column(value.user_id, "posts.userID")?.into(),
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            post_id: column(value.post_id, "comments.idPost")?.into(),
            author_id: column(value.user_id, "comments.idUser")?.into(),
            content: column(value.content_text, "comments.content_text")?,
            created_at: column(value.created_at, "comments.created_at")?,
        })
    }
}
