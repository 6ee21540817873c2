use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

/// Text that is known to contain at least one character.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    #[must_use]
    pub fn new(text: String) -> Option<Self> {
        (!text.is_empty()).then_some(Self(text))
    }

    #[must_use]
    pub fn new_unchecked(text: String) -> Self {
        Self::new(text).expect("Text was empty.")
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The text was empty")]
pub struct EmptyTextError;

impl TryFrom<String> for NonEmptyText {
    type Error = EmptyTextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(EmptyTextError)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        NonEmptyText::new(inner)
            .ok_or_else(|| Error::invalid_value(Unexpected::Str(""), &"a non-empty string"))
    }
}

/// A plaintext password.
///
/// Passwords are stored and compared verbatim. This is a known weakness kept
/// for compatibility with existing databases; any production deployment needs
/// a password hashing scheme in front of the store.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Password(NonEmptyText);

impl Password {
    #[must_use]
    pub fn new(password: String) -> Option<Self> {
        NonEmptyText::new(password).map(Self)
    }

    #[must_use]
    pub fn new_unchecked(password: String) -> Self {
        Self(NonEmptyText::new_unchecked(password))
    }

    #[must_use]
    pub fn get(&self) -> &str {
        self.0.get()
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Password").field(&"[redacted]").finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::util::{NonEmptyText, Password};

    #[test]
    fn empty_text_is_rejected() {
        assert!(NonEmptyText::new(String::new()).is_none());
        assert!(NonEmptyText::try_from(String::new()).is_err());
        assert_eq!(NonEmptyText::new("a".into()).unwrap().get(), "a");
    }

    #[test]
    fn empty_text_fails_to_deserialize() {
        assert!(serde_json::from_str::<NonEmptyText>("\"\"").is_err());
        let text: NonEmptyText = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(text.into_inner(), "hello");
    }

    #[test]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter2".into()).unwrap();
        let debug = format!("{password:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(password.get(), "hunter2");
    }
}
