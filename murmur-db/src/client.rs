use crate::filter::{CommentFilter, Filter, PostFilter, UserFilter};
use murmur_common::model::{
    Id, ModelValidationError,
    comment::{Comment, CommentMarker, CreateComment},
    post::{CreatePost, Post, PostMarker},
    user::{CreateUser, Credentials, User, UserMarker, UserUpdate},
};
use murmur_common::util::NonEmptyText;
use sqlx::{QueryBuilder, SqlitePool, query, query_scalar};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("User with id {0} does not exist")]
    MissingUser(Id<UserMarker>),
    #[error("Post with id {0} does not exist")]
    MissingPost(Id<PostMarker>),
    #[error("Creation timestamp could not be formatted: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Creation timestamp could not be truncated: {0}")]
    TimestampRange(#[from] time::error::ComponentRange),
    #[error("Database operation failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlx(err) => err
                .as_database_error()
                .is_some_and(|err| err.is_unique_violation()),
            _ => false,
        }
    }
}

/// Current UTC time in RFC 3339, truncated to whole seconds.
fn now_timestamp() -> Result<String> {
    Ok(OffsetDateTime::now_utc()
        .replace_nanosecond(0)?
        .format(&Rfc3339)?)
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs the selection described by `filter`, ordered by primary key.
    pub async fn find<F: Filter>(&self, filter: F) -> Result<Vec<F::Output>> {
        let mut query = QueryBuilder::new(F::SELECT);
        filter.push_condition(&mut query);
        query.push(" ORDER BY ").push(F::ORDER_BY);

        let records = query
            .build_query_as::<F::Record>()
            .fetch_all(&self.pool)
            .await?;

        let rows = records
            .into_iter()
            .map(<F::Output as TryFrom<F::Record>>::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn find_one<F: Filter>(&self, filter: F) -> Result<Option<F::Output>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.find(UserFilter::All).await
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        self.find_one(UserFilter::ById(user_id)).await
    }

    /// Looks up the user whose username or email is `credentials.login` and
    /// whose stored password equals `credentials.password` byte for byte.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Option<User>> {
        self.find_one(UserFilter::Credentials(credentials)).await
    }

    pub async fn create_user(&self, user: &CreateUser) -> Result<Id<UserMarker>> {
        let result = query(
            "
            INSERT INTO users (username, displayName, email, password)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(user.username.get())
        .bind(user.display_name.get())
        .bind(user.email.get())
        .bind(user.password.get())
        .execute(&self.pool)
        .await?;

        let id: Id<UserMarker> = result.last_insert_rowid().into();
        debug!(%id, "Created user");
        Ok(id)
    }

    /// Rewrites the profile fields and returns the stored row, or `None` if
    /// no user has that id.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<Option<User>> {
        let result = query(
            "
            UPDATE users
            SET username = ?, displayName = ?, email = ?
            WHERE idUser = ?
            ",
        )
        .bind(update.username.get())
        .bind(update.display_name.get())
        .bind(update.email.get())
        .bind(update.id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_user(update.id).await
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.find(PostFilter::All).await
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        self.find_one(PostFilter::ById(post_id)).await
    }

    pub async fn fetch_user_posts(&self, user_id: Id<UserMarker>) -> Result<Vec<Post>> {
        self.find(PostFilter::ByAuthor(user_id)).await
    }

    /// Inserts a post stamped with the current time. Fails with
    /// [`DbError::MissingUser`] if the author does not exist.
    pub async fn create_post(&self, post: &CreatePost) -> Result<Id<PostMarker>> {
        let created_at = now_timestamp()?;

        let result = query(
            "
            INSERT INTO posts (content_text, created_at, userID)
            SELECT ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM users WHERE idUser = ?)
            ",
        )
        .bind(post.content.get())
        .bind(&created_at)
        .bind(post.author.get())
        .bind(post.author.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::MissingUser(post.author));
        }

        let id: Id<PostMarker> = result.last_insert_rowid().into();
        debug!(%id, author = %post.author, "Created post");
        Ok(id)
    }

    /// Returns whether a post with that id existed.
    pub async fn update_post_content(
        &self,
        post_id: Id<PostMarker>,
        content: &NonEmptyText,
    ) -> Result<bool> {
        let result = query("UPDATE posts SET content_text = ? WHERE idPost = ?")
            .bind(content.get())
            .bind(post_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns whether a post with that id existed. Comments on the post are
    /// left in place.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts WHERE idPost = ?")
            .bind(post_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn fetch_post_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        self.find(CommentFilter::ByPost(post_id)).await
    }

    /// Inserts a comment stamped with the current time. Fails with
    /// [`DbError::MissingPost`] or [`DbError::MissingUser`] if either
    /// reference is dangling.
    pub async fn create_comment(&self, comment: &CreateComment) -> Result<Id<CommentMarker>> {
        let created_at = now_timestamp()?;

        let result = query(
            "
            INSERT INTO comments (idPost, idUser, content_text, created_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM posts WHERE idPost = ?)
                AND EXISTS (SELECT 1 FROM users WHERE idUser = ?)
            ",
        )
        .bind(comment.post.get())
        .bind(comment.author.get())
        .bind(comment.content.get())
        .bind(&created_at)
        .bind(comment.post.get())
        .bind(comment.author.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let post_exists: bool =
                query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE idPost = ?)")
                    .bind(comment.post.get())
                    .fetch_one(&self.pool)
                    .await?;

            return Err(if post_exists {
                DbError::MissingUser(comment.author)
            } else {
                DbError::MissingPost(comment.post)
            });
        }

        let id: Id<CommentMarker> = result.last_insert_rowid().into();
        debug!(%id, post = %comment.post, author = %comment.author, "Created comment");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::{DbClient, DbError},
        schema::{connect_in_memory, ensure_schema},
    };
    use murmur_common::{
        model::{
            Id,
            comment::CreateComment,
            post::CreatePost,
            user::{CreateUser, Credentials, UserMarker, UserUpdate},
        },
        util::{NonEmptyText, Password},
    };
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    fn text(value: &str) -> NonEmptyText {
        NonEmptyText::new(value.to_owned()).unwrap()
    }

    fn new_user(username: &str, display_name: &str, email: &str, password: &str) -> CreateUser {
        CreateUser {
            username: text(username),
            display_name: text(display_name),
            email: text(email),
            password: Password::new(password.to_owned()).unwrap(),
        }
    }

    fn credentials(login: &str, password: &str) -> Credentials {
        Credentials {
            login: text(login),
            password: Password::new(password.to_owned()).unwrap(),
        }
    }

    async fn client() -> DbClient {
        let pool = connect_in_memory().await.unwrap();
        ensure_schema(&pool).await.unwrap();
        DbClient::new(pool)
    }

    async fn client_with_alice() -> (DbClient, Id<UserMarker>) {
        let db = client().await;
        let alice = db
            .create_user(&new_user("alice", "Alice A", "a@x.com", "p1"))
            .await
            .unwrap();
        (db, alice)
    }

    #[tokio::test]
    async fn created_user_reads_back() {
        let (db, alice) = client_with_alice().await;

        let user = db.fetch_user(alice).await.unwrap().unwrap();
        assert_eq!(user.id, alice);
        assert_eq!(user.username, "alice");
        assert_eq!(user.display_name, "Alice A");
        assert_eq!(user.email, "a@x.com");

        assert!(db.fetch_user(Id::new(alice.get() + 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn users_are_listed_in_id_order() {
        let (db, alice) = client_with_alice().await;
        let bob = db
            .create_user(&new_user("bob", "Bob B", "b@x.com", "p2"))
            .await
            .unwrap();

        let ids: Vec<_> = db
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.id)
            .collect();
        assert_eq!(ids, [alice, bob]);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let (db, _) = client_with_alice().await;

        let err = db
            .create_user(&new_user("alice", "Other", "o@x.com", "p"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn authenticate_matches_username_or_email_with_exact_password() {
        let (db, alice) = client_with_alice().await;

        let by_name = db.authenticate(credentials("alice", "p1")).await.unwrap();
        assert_eq!(by_name.map(|user| user.id), Some(alice));

        let by_email = db.authenticate(credentials("a@x.com", "p1")).await.unwrap();
        assert_eq!(by_email.map(|user| user.id), Some(alice));

        for (login, password) in [
            ("alice", "wrong"),
            ("alice", "P1"),
            ("Alice A", "p1"),
            ("nobody", "p1"),
            ("alice' OR '1'='1", "p1"),
        ] {
            assert!(
                db.authenticate(credentials(login, password))
                    .await
                    .unwrap()
                    .is_none(),
                "{login}/{password} should not authenticate"
            );
        }
    }

    #[tokio::test]
    async fn update_user_rewrites_profile() {
        let (db, alice) = client_with_alice().await;

        let updated = db
            .update_user(&UserUpdate {
                id: alice,
                username: text("alice2"),
                display_name: text("Alice B"),
                email: text("a2@x.com"),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, alice);
        assert_eq!(updated.username, "alice2");
        assert_eq!(db.fetch_user(alice).await.unwrap(), Some(updated));

        // The password is untouched.
        assert!(db.authenticate(credentials("alice2", "p1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_missing_user_changes_nothing() {
        let (db, alice) = client_with_alice().await;
        let before = db.list_users().await.unwrap();

        let updated = db
            .update_user(&UserUpdate {
                id: Id::new(alice.get() + 10),
                username: text("ghost"),
                display_name: text("Ghost"),
                email: text("g@x.com"),
            })
            .await
            .unwrap();

        assert!(updated.is_none());
        assert_eq!(db.list_users().await.unwrap(), before);
    }

    #[tokio::test]
    async fn create_post_stamps_creation_time() {
        let (db, alice) = client_with_alice().await;

        let id = db
            .create_post(&CreatePost {
                author: alice,
                content: text("hello"),
            })
            .await
            .unwrap();

        let post = db.fetch_post(id).await.unwrap().unwrap();
        assert_eq!(post.content, "hello");
        assert_eq!(post.author_id, alice);
        let created_at = OffsetDateTime::parse(&post.created_at, &Rfc3339).unwrap();
        assert_eq!(created_at.nanosecond(), 0);
        assert!(post.created_at.ends_with('Z'));
        assert!(!post.created_at.contains('.'));
    }

    #[tokio::test]
    async fn create_post_for_missing_user_inserts_nothing() {
        let (db, alice) = client_with_alice().await;
        let ghost = Id::new(alice.get() + 1);

        let err = db
            .create_post(&CreatePost {
                author: ghost,
                content: text("hello"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::MissingUser(id) if id == ghost));
        assert!(db.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn posts_by_user_only_returns_their_posts() {
        let (db, alice) = client_with_alice().await;
        let bob = db
            .create_user(&new_user("bob", "Bob B", "b@x.com", "p2"))
            .await
            .unwrap();

        for (author, content) in [(alice, "one"), (bob, "two"), (alice, "three")] {
            db.create_post(&CreatePost {
                author,
                content: text(content),
            })
            .await
            .unwrap();
        }

        let contents: Vec<_> = db
            .fetch_user_posts(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.content)
            .collect();
        assert_eq!(contents, ["one", "three"]);
        assert_eq!(db.list_posts().await.unwrap().len(), 3);

        let nobody = Id::new(bob.get() + 1);
        assert!(db.fetch_user_posts(nobody).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_posts() {
        let (db, alice) = client_with_alice().await;
        let id = db
            .create_post(&CreatePost {
                author: alice,
                content: text("draft"),
            })
            .await
            .unwrap();

        assert!(db.update_post_content(id, &text("final")).await.unwrap());
        assert_eq!(db.fetch_post(id).await.unwrap().unwrap().content, "final");

        assert!(db.delete_post(id).await.unwrap());
        assert!(db.fetch_post(id).await.unwrap().is_none());

        assert!(!db.delete_post(id).await.unwrap());
        assert!(!db.update_post_content(id, &text("again")).await.unwrap());
    }

    #[tokio::test]
    async fn comments_survive_post_deletion() {
        let (db, alice) = client_with_alice().await;
        let post = db
            .create_post(&CreatePost {
                author: alice,
                content: text("hello"),
            })
            .await
            .unwrap();

        assert!(db.fetch_post_comments(post).await.unwrap().is_empty());

        let comment = db
            .create_comment(&CreateComment {
                post,
                author: alice,
                content: text("first"),
            })
            .await
            .unwrap();

        assert!(db.delete_post(post).await.unwrap());

        let comments = db.fetch_post_comments(post).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, comment);
        assert_eq!(comments[0].post_id, post);
        assert_eq!(comments[0].author_id, alice);
        assert_eq!(comments[0].content, "first");
    }

    #[tokio::test]
    async fn create_comment_checks_both_references() {
        let (db, alice) = client_with_alice().await;
        let post = db
            .create_post(&CreatePost {
                author: alice,
                content: text("hello"),
            })
            .await
            .unwrap();
        let ghost_user = Id::new(alice.get() + 1);
        let ghost_post = Id::new(post.get() + 1);

        let err = db
            .create_comment(&CreateComment {
                post: ghost_post,
                author: alice,
                content: text("hi"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MissingPost(id) if id == ghost_post));

        let err = db
            .create_comment(&CreateComment {
                post,
                author: ghost_user,
                content: text("hi"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MissingUser(id) if id == ghost_user));

        assert!(db.fetch_post_comments(post).await.unwrap().is_empty());
    }
}
