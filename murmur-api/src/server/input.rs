//! Loose request fields and their validation.
//!
//! Request bodies default every field, so a missing field and an empty one
//! are reported the same way: with the endpoint's "required" message.

use crate::server::{Result, ServerError};
use murmur_common::{
    model::Id,
    util::{NonEmptyText, Password},
};
use serde::Deserialize;

/// An id as sent by clients: either a JSON number or a numeric string.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl Default for RawId {
    fn default() -> Self {
        RawId::Text(String::new())
    }
}

impl RawId {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, RawId::Text(text) if text.is_empty())
    }

    pub fn parse<Marker>(self, field: &'static str) -> Result<Id<Marker>> {
        match self {
            RawId::Number(id) => Ok(Id::new(id)),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| ServerError::InvalidId { field, value: text }),
        }
    }
}

impl From<String> for RawId {
    fn from(value: String) -> Self {
        RawId::Text(value)
    }
}

/// `?id=` query parameter.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: String,
}

pub fn required_text(text: String, message: &'static str) -> Result<NonEmptyText> {
    NonEmptyText::new(text).ok_or(ServerError::InvalidInput(message))
}

pub fn required_password(password: String, message: &'static str) -> Result<Password> {
    Password::new(password).ok_or(ServerError::InvalidInput(message))
}

pub fn required_id<Marker>(
    id: RawId,
    field: &'static str,
    message: &'static str,
) -> Result<Id<Marker>> {
    if id.is_empty() {
        return Err(ServerError::InvalidInput(message));
    }
    id.parse(field)
}
