//! Synthetic users, posts and comments for local development.

use crate::client::{DbClient, Result};
use murmur_common::{
    model::{
        Id,
        comment::CreateComment,
        post::{CreatePost, PostMarker},
        user::{CreateUser, UserMarker},
    },
    util::{NonEmptyText, Password},
};
use rand::{Rng, seq::IndexedRandom};
use tracing::{info, warn};

pub const TEST_LOGIN: &str = "test";
pub const TEST_PASSWORD: &str = "test";

/// Attempts per user before a run of name collisions is treated as an error.
const MAX_NAME_ATTEMPTS: usize = 8;

const ADJECTIVES: &[&str] = &[
    "quiet", "brave", "lucky", "sleepy", "rapid", "gentle", "clever", "wild", "sunny", "misty",
    "bold", "calm", "eager", "fuzzy", "odd", "proud",
];
const NOUNS: &[&str] = &[
    "otter", "falcon", "maple", "comet", "badger", "river", "pixel", "lantern", "fox", "harbor",
    "cedar", "moth", "quartz", "willow", "raven", "tide",
];
const WORDS: &[&str] = &[
    "the", "a", "morning", "coffee", "was", "surprisingly", "good", "today", "I", "think",
    "weekend", "plans", "include", "hiking", "and", "reading", "new", "book", "about", "trains",
    "city", "quiet", "after", "rain", "someone", "should", "fix", "that", "bridge", "finally",
    "learned", "to", "bake", "bread", "it", "went", "well", "enough",
];

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct SeedPlan {
    pub users: usize,
    /// Every user gets between 1 and this many posts.
    pub max_posts_per_user: usize,
    /// Every post gets between 1 and this many comments.
    pub max_comments_per_post: usize,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

fn random_handle(rng: &mut impl Rng) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("plain");
    let noun = NOUNS.choose(rng).copied().unwrap_or("user");
    let suffix: u16 = rng.random_range(0..10_000);
    format!("{adjective}_{noun}{suffix}")
}

fn random_user(rng: &mut impl Rng) -> CreateUser {
    let username = random_handle(rng);
    let display_name = random_handle(rng);
    let email = format!("{username}@example.com");
    let password: String = (0..12)
        .map(|_| char::from(rng.sample(rand::distr::Alphanumeric)))
        .collect();

    CreateUser {
        username: NonEmptyText::new_unchecked(username),
        display_name: NonEmptyText::new_unchecked(display_name),
        email: NonEmptyText::new_unchecked(email),
        password: Password::new_unchecked(password),
    }
}

fn random_sentence(rng: &mut impl Rng) -> NonEmptyText {
    let length = rng.random_range(4..=12);
    let mut sentence = (0..length)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(first) = sentence.get(..1) {
        sentence.replace_range(..1, &first.to_uppercase());
    }
    sentence.push('.');
    NonEmptyText::new_unchecked(sentence)
}

async fn insert_random_user(db: &DbClient, rng: &mut (impl Rng + Send)) -> Result<Id<UserMarker>> {
    let mut attempt = 1;
    loop {
        match db.create_user(&random_user(rng)).await {
            Err(err) if err.is_unique_violation() && attempt < MAX_NAME_ATTEMPTS => {
                warn!(attempt, "Generated user collided with an existing one, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Fills the database according to `plan`. Posts are spread over the users
/// created by this run; comment authors are drawn from every user in the
/// database.
pub async fn seed(
    db: &DbClient,
    plan: SeedPlan,
    rng: &mut (impl Rng + Send),
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let mut new_users = Vec::with_capacity(plan.users);
    for _ in 0..plan.users {
        new_users.push(insert_random_user(db, rng).await?);
    }
    summary.users = new_users.len();
    info!(count = summary.users, "Inserted random users");

    let mut new_posts: Vec<Id<PostMarker>> = Vec::new();
    if plan.max_posts_per_user > 0 {
        for &author in &new_users {
            for _ in 0..rng.random_range(1..=plan.max_posts_per_user) {
                let post = CreatePost {
                    author,
                    content: random_sentence(rng),
                };
                new_posts.push(db.create_post(&post).await?);
            }
        }
    }
    summary.posts = new_posts.len();
    info!(count = summary.posts, "Inserted random posts");

    let authors: Vec<_> = db.list_users().await?.into_iter().map(|user| user.id).collect();
    if plan.max_comments_per_post > 0 && !authors.is_empty() {
        for &post in &new_posts {
            for _ in 0..rng.random_range(1..=plan.max_comments_per_post) {
                let Some(&author) = authors.choose(rng) else {
                    break;
                };
                let comment = CreateComment {
                    post,
                    author,
                    content: random_sentence(rng),
                };
                db.create_comment(&comment).await?;
                summary.comments += 1;
            }
        }
    }
    info!(count = summary.comments, "Inserted random comments");

    Ok(summary)
}

/// Inserts the fixed `test`/`test` account unless it is already present.
pub async fn insert_test_user(db: &DbClient) -> Result<Option<Id<UserMarker>>> {
    let user = CreateUser {
        username: NonEmptyText::new_unchecked(TEST_LOGIN.to_owned()),
        display_name: NonEmptyText::new_unchecked(TEST_LOGIN.to_owned()),
        email: NonEmptyText::new_unchecked(format!("{TEST_LOGIN}@gmail.com")),
        password: Password::new_unchecked(TEST_PASSWORD.to_owned()),
    };

    match db.create_user(&user).await {
        Ok(id) => {
            info!(%id, "Inserted test user");
            Ok(Some(id))
        }
        Err(err) if err.is_unique_violation() => {
            info!("Test user already exists");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::DbClient,
        schema::{connect_in_memory, ensure_schema},
        seed::{SeedPlan, TEST_LOGIN, TEST_PASSWORD, insert_test_user, seed},
    };
    use murmur_common::{
        model::user::Credentials,
        util::{NonEmptyText, Password},
    };
    use rand::{SeedableRng, rngs::StdRng};

    async fn client() -> DbClient {
        let pool = connect_in_memory().await.unwrap();
        ensure_schema(&pool).await.unwrap();
        DbClient::new(pool)
    }

    #[tokio::test]
    async fn seeding_respects_plan_bounds() {
        let db = client().await;
        let mut rng = StdRng::seed_from_u64(7);
        let plan = SeedPlan {
            users: 4,
            max_posts_per_user: 3,
            max_comments_per_post: 2,
        };

        let summary = seed(&db, plan, &mut rng).await.unwrap();

        assert_eq!(summary.users, 4);
        assert!((4..=12).contains(&summary.posts));
        assert!((summary.posts..=summary.posts * 2).contains(&summary.comments));

        assert_eq!(db.list_users().await.unwrap().len(), 4);
        let posts = db.list_posts().await.unwrap();
        assert_eq!(posts.len(), summary.posts);

        let mut comments = 0;
        for post in &posts {
            assert!(!post.content.is_empty());
            assert!(post.content.ends_with('.'));
            comments += db.fetch_post_comments(post.id).await.unwrap().len();
        }
        assert_eq!(comments, summary.comments);
    }

    #[tokio::test]
    async fn test_user_is_inserted_once() {
        let db = client().await;

        assert!(insert_test_user(&db).await.unwrap().is_some());
        assert!(insert_test_user(&db).await.unwrap().is_none());

        let credentials = Credentials {
            login: NonEmptyText::new(TEST_LOGIN.to_owned()).unwrap(),
            password: Password::new(TEST_PASSWORD.to_owned()).unwrap(),
        };
        assert!(db.authenticate(credentials).await.unwrap().is_some());
    }
}
