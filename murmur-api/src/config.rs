use axum::http::{
    HeaderValue, Method,
    header::{ACCEPT, CONTENT_TYPE, InvalidHeaderValue, ORIGIN},
};
use murmur_db::seed::SeedPlan;
use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Process configuration, read from the environment (and `.env`).
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Env {
    #[serde(default = "default_server_address")]
    pub server_address: IpAddr,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    /// Number of random users to generate on startup. Seeding is off when unset.
    pub seed_users: Option<usize>,
    #[serde(default = "default_seed_posts_per_user")]
    pub seed_posts_per_user: usize,
    #[serde(default = "default_seed_comments_per_post")]
    pub seed_comments_per_post: usize,
    #[serde(default)]
    pub seed_test_user: bool,
}

fn default_server_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_server_port() -> u16 {
    5050
}

fn default_database_path() -> PathBuf {
    PathBuf::from("db.db")
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:8080".to_owned(),
        "http://127.0.0.1:8080".to_owned(),
    ]
}

fn default_seed_posts_per_user() -> usize {
    5
}

fn default_seed_comments_per_post() -> usize {
    3
}

impl Env {
    #[must_use]
    pub fn seed_plan(&self) -> Option<SeedPlan> {
        self.seed_users.map(|users| SeedPlan {
            users,
            max_posts_per_user: self.seed_posts_per_user,
            max_comments_per_post: self.seed_comments_per_post,
        })
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, InvalidHeaderValue> {
        let origins = self
            .cors_allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT])
            .allow_credentials(true))
    }
}
