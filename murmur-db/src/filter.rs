//! Row selections understood by [`DbClient::find`](crate::client::DbClient::find).
//!
//! A filter names the rows it wants; the table, column list and ordering come
//! from the filter type, so every lookup goes through the same statement shape.

use crate::record::{CommentRecord, PostRecord, UserRecord};
use murmur_common::model::{
    Id, ModelValidationError,
    comment::Comment,
    post::{Post, PostMarker},
    user::{Credentials, User, UserMarker},
};
use sqlx::{FromRow, QueryBuilder, Sqlite, sqlite::SqliteRow};

pub trait Filter {
    type Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static;
    type Output: TryFrom<Self::Record, Error = ModelValidationError>;

    /// `SELECT ... FROM ...` without any condition.
    const SELECT: &'static str;
    const ORDER_BY: &'static str;

    /// Appends the `WHERE` clause, if any, binding every value.
    fn push_condition(self, query: &mut QueryBuilder<'_, Sqlite>);
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum UserFilter {
    All,
    ById(Id<UserMarker>),
    /// Username or email plus exact password match.
    Credentials(Credentials),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum PostFilter {
    All,
    ById(Id<PostMarker>),
    ByAuthor(Id<UserMarker>),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CommentFilter {
    ByPost(Id<PostMarker>),
}

impl Filter for UserFilter {
    type Record = UserRecord;
    type Output = User;

    const SELECT: &'static str = "
        SELECT
            idUser AS user_id,
            username,
            displayName AS display_name,
            email
        FROM
            users";
    const ORDER_BY: &'static str = "idUser";

    fn push_condition(self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            UserFilter::All => {}
            UserFilter::ById(id) => {
                query.push(" WHERE idUser = ").push_bind(id.get());
            }
            UserFilter::Credentials(credentials) => {
                let login = credentials.login.into_inner();
                query
                    .push(" WHERE (username = ")
                    .push_bind(login.clone())
                    .push(" OR email = ")
                    .push_bind(login)
                    .push(") AND password = ")
                    .push_bind(credentials.password.get().to_owned());
            }
        }
    }
}

impl Filter for PostFilter {
    type Record = PostRecord;
    type Output = Post;

    const SELECT: &'static str = "
        SELECT
            idPost AS post_id,
            content_text,
            created_at,
            userID AS user_id
        FROM
            posts";
    const ORDER_BY: &'static str = "idPost";

    fn push_condition(self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            PostFilter::All => {}
            PostFilter::ById(id) => {
                query.push(" WHERE idPost = ").push_bind(id.get());
            }
            PostFilter::ByAuthor(author) => {
                query.push(" WHERE userID = ").push_bind(author.get());
            }
        }
    }
}

impl Filter for CommentFilter {
    type Record = CommentRecord;
    type Output = Comment;

    const SELECT: &'static str = "
        SELECT
            idComment AS comment_id,
            idPost AS post_id,
            idUser AS user_id,
            content_text,
            created_at
        FROM
            comments";
    const ORDER_BY: &'static str = "idComment";

    fn push_condition(self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            CommentFilter::ByPost(post) => {
                query.push(" WHERE idPost = ").push_bind(post.get());
            }
        }
    }
}
