use std::fmt;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit `null` from a key that was never sent.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` means the client sent `null` to reset the avatar.
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostParams {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Desired tag set. `None` leaves existing associations alone on edit.
    pub tags: Option<Vec<TagRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagParams {
    pub name: Option<String>,
}

/// A tag ID as a client sent it: JSON numbers, numeric strings and form keys
/// all end up here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Id(i64),
    Text(String),
}

impl TagRef {
    /// Parsed ID, or `None` when the reference is not a valid tag ID.
    pub fn id(&self) -> Option<i32> {
        match self {
            Self::Id(id) => i32::try_from(*id).ok(),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<i32> for TagRef {
    fn from(id: i32) -> Self {
        Self::Id(id.into())
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Text(text) => f.write_str(text.trim()),
        }
    }
}
