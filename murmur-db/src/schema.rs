use crate::client::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};
use tracing::info;

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            "idUser" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "username" TEXT UNIQUE,
            "displayName" TEXT UNIQUE,
            "email" TEXT UNIQUE,
            "password" TEXT
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            "idPost" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "content_text" TEXT,
            "created_at" TEXT,
            "userID" INTEGER,
            FOREIGN KEY(userID) REFERENCES users(idUser)
        )
        "#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            "idComment" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "idPost" INTEGER,
            "idUser" INTEGER,
            "content_text" TEXT,
            "created_at" TEXT,
            FOREIGN KEY(idPost) REFERENCES posts(idPost),
            FOREIGN KEY(idUser) REFERENCES users(idUser)
        )
        "#,
    ),
];

/// Opens the database file, creating it if it does not exist yet.
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(false);

    Ok(SqlitePoolOptions::new().connect_with(options).await?)
}

/// A private in-memory database that lives as long as the returned pool.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);

    // Every connection to `:memory:` is its own database, so keep exactly one.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Creates any missing table. Safe to call on every start.
///
/// Foreign keys are declared but connections are opened with enforcement off:
/// deleting a post leaves its comments behind. Inserts check their references
/// in [`DbClient`](crate::client::DbClient) instead.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for &(name, statement) in TABLES {
        sqlx::query(statement).execute(pool).await?;
        info!(table = name, "Table ensured");
    }

    Ok(())
}
