use crate::{
    model::Id,
    util::{NonEmptyText, Password},
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A user as exposed over the API. The password never leaves the store.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "idUser")]
    pub id: Id<UserMarker>,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub email: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreateUser {
    pub username: NonEmptyText,
    pub display_name: NonEmptyText,
    pub email: NonEmptyText,
    pub password: Password,
}

/// Replacement profile fields for an existing user.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UserUpdate {
    pub id: Id<UserMarker>,
    pub username: NonEmptyText,
    pub display_name: NonEmptyText,
    pub email: NonEmptyText,
}

/// Login attempt. `login` matches either the username or the email.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Credentials {
    pub login: NonEmptyText,
    pub password: Password,
}
