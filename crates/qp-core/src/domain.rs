//! Blog-domain enums and value types: account roles, post categories and
//! media references.
//!
//! Enums serialize in lowercase (roles) or their display name (categories)
//! and implement `Display`/`FromStr` manually so that database columns and
//! multipart form fields share one string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Account role, fixed at registration.
///
/// The legacy names `user` and `admin` are accepted on input and map to
/// `Reader` and `Author`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Reader,
    #[serde(alias = "admin")]
    Author,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reader => write!(f, "reader"),
            Self::Author => write!(f, "author"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" | "user" => Ok(Self::Reader),
            "author" | "admin" => Ok(Self::Author),
            other => Err(Error::Validation(format!(
                "unknown role '{other}' (expected reader or author)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Post category. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Category {
    Devotional,
    Sports,
    Tourism,
    Technology,
    Entertainment,
    Health,
    Business,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 7] = [
        Category::Devotional,
        Category::Sports,
        Category::Tourism,
        Category::Technology,
        Category::Entertainment,
        Category::Health,
        Category::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devotional => "Devotional",
            Self::Sports => "Sports",
            Self::Tourism => "Tourism",
            Self::Technology => "Technology",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Business => "Business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Validation(format!("unknown category '{wanted}'")))
    }
}

// ---------------------------------------------------------------------------
// MediaRef
// ---------------------------------------------------------------------------

/// Durable reference to an uploaded image: the public URL plus the handle
/// the media store needs to release it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MediaRef {
    pub url: String,
    pub delete_id: String,
}
