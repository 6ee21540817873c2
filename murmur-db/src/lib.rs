pub mod client;
pub mod filter;
pub mod record;
pub mod schema;
pub mod seed;
