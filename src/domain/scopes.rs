//! Domain types for API scopes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// API permission scope with resource/action granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiScope {
    AuthorRead,
    AuthorWrite,
    BookRead,
    BookWrite,
}

impl ApiScope {
    /// Returns the slug used for serialization and configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthorRead => "author_read",
            Self::AuthorWrite => "author_write",
            Self::BookRead => "book_read",
            Self::BookWrite => "book_write",
        }
    }

    /// Returns all scope variants for iteration.
    pub fn all() -> &'static [ApiScope] {
        &[
            Self::AuthorRead,
            Self::AuthorWrite,
            Self::BookRead,
            Self::BookWrite,
        ]
    }
}

impl Display for ApiScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author_read" => Ok(Self::AuthorRead),
            "author_write" => Ok(Self::AuthorWrite),
            "book_read" => Ok(Self::BookRead),
            "book_write" => Ok(Self::BookWrite),
            _ => Err(()),
        }
    }
}
