//! Request payloads for the JSON API.
//!
//! Update payloads distinguish "field absent" from "field set to null":
//! absent preserves the stored value, null clears it. The `double_option`
//! helper keeps that distinction through serde.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Signed so out-of-range values reach the clamping logic instead of
/// failing query deserialization.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorCreateRequest {
    pub lastname: String,
    pub firstname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorUpdateRequest {
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub firstname: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct BookCreateRequest {
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BookUpdateRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub comment: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub author_id: Option<Option<Uuid>>,
}

/// Maps a present-but-null JSON field to `Some(None)`. Absent fields fall
/// back to the `#[serde(default)]` of `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
