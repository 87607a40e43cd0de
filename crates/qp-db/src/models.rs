//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use std::str::FromStr;

use qp_core::{AccountId, Category, MediaRef, PostId, Role};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

/// Parse a text column through the type's `FromStr` impl.
fn parse_text<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = qp_core::Error>,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e: qp_core::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Combine a nullable (url, delete_id) column pair.
fn media_ref(url: Option<String>, delete_id: Option<String>) -> Option<MediaRef> {
    match (url, delete_id) {
        (Some(url), Some(delete_id)) => Some(MediaRef { url, delete_id }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Column list matching [`Account::from_row`].
pub const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, role, name, phone, education, photo_url, photo_delete_id, created_at";

#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub phone: String,
    pub education: String,
    pub photo: Option<MediaRef>,
    pub created_at: String,
}

impl Account {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            role: parse_text(row, 3)?,
            name: row.get(4)?,
            phone: row.get(5)?,
            education: row.get(6)?,
            photo: media_ref(row.get(7)?, row.get(8)?),
            created_at: row.get(9)?,
        })
    }
}

/// Fields required to insert a new account.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub name: &'a str,
    pub phone: &'a str,
    pub education: &'a str,
    pub photo: Option<&'a MediaRef>,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// Select list matching [`Post::from_row`]; expects `posts p JOIN accounts a`.
pub const POST_SELECT: &str = "SELECT p.id, p.owner_id, p.title, p.category, p.about, \
     p.image_url, p.image_delete_id, p.created_at, p.updated_at, a.name, a.photo_url \
     FROM posts p JOIN accounts a ON a.id = p.owner_id";

/// A post together with its owner's public name and photo.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub owner: AccountId,
    pub title: String,
    pub category: Category,
    pub about: String,
    pub image: MediaRef,
    pub created_at: String,
    pub updated_at: String,
    pub author_name: String,
    pub author_photo: Option<String>,
}

impl Post {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            owner: parse_id(row, 1)?,
            title: row.get(2)?,
            category: parse_text(row, 3)?,
            about: row.get(4)?,
            image: MediaRef {
                url: row.get(5)?,
                delete_id: row.get(6)?,
            },
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            author_name: row.get(9)?,
            author_photo: row.get(10)?,
        })
    }
}

/// The mutable fields of a post, written as one unit on create and update.
#[derive(Debug, Clone)]
pub struct PostFields<'a> {
    pub title: &'a str,
    pub category: Category,
    pub about: &'a str,
    pub image: &'a MediaRef,
}
