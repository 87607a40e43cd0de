//! Post CRUD operations.
//!
//! Reads join the owning account so that every [`Post`] carries the author's
//! display name and photo.

use chrono::{SecondsFormat, Utc};
use qp_core::{AccountId, Category, Error, PostId, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Post, PostFields, POST_SELECT};

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Insert a post owned by `owner` and return it as read back from the store.
pub fn create_post(conn: &Connection, owner: AccountId, fields: &PostFields<'_>) -> Result<Post> {
    let id = PostId::new();
    let ts = now();

    conn.execute(
        "INSERT INTO posts (id, owner_id, title, category, about, image_url, image_delete_id,
                            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        rusqlite::params![
            id.to_string(),
            owner.to_string(),
            fields.title,
            fields.category.to_string(),
            fields.about,
            fields.image.url,
            fields.image.delete_id,
            ts,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_post(conn, id)?.ok_or_else(|| Error::Internal(format!("post {id} vanished after insert")))
}

/// Get a post by primary key.
pub fn get_post(conn: &Connection, id: PostId) -> Result<Option<Post>> {
    conn.query_row(
        &format!("{POST_SELECT} WHERE p.id = ?1"),
        [id.to_string()],
        Post::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List posts newest first, optionally restricted to one category.
pub fn list_posts(conn: &Connection, category: Option<Category>) -> Result<Vec<Post>> {
    match category {
        Some(c) => query_posts(
            conn,
            &format!("{POST_SELECT} WHERE p.category = ?1 ORDER BY p.created_at DESC, p.rowid DESC"),
            [c.to_string()],
        ),
        None => query_posts(
            conn,
            &format!("{POST_SELECT} ORDER BY p.created_at DESC, p.rowid DESC"),
            rusqlite::params![],
        ),
    }
}

/// List posts owned by `owner`, newest first.
pub fn list_posts_by_owner(conn: &Connection, owner: AccountId) -> Result<Vec<Post>> {
    query_posts(
        conn,
        &format!("{POST_SELECT} WHERE p.owner_id = ?1 ORDER BY p.created_at DESC, p.rowid DESC"),
        [owner.to_string()],
    )
}

/// Replace all mutable fields of a post. Returns false if no row matched.
pub fn update_post(conn: &Connection, id: PostId, fields: &PostFields<'_>) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE posts
             SET title = ?1, category = ?2, about = ?3, image_url = ?4, image_delete_id = ?5,
                 updated_at = ?6
             WHERE id = ?7",
            rusqlite::params![
                fields.title,
                fields.category.to_string(),
                fields.about,
                fields.image.url,
                fields.image.delete_id,
                now(),
                id.to_string(),
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a post by ID. Returns true if a row was deleted.
pub fn delete_post(conn: &Connection, id: PostId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM posts WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

fn query_posts<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Post>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(params, Post::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAccount;
    use crate::pool::init_memory_pool;
    use crate::queries::accounts::create_account;
    use qp_core::{MediaRef, Role};

    fn author(conn: &Connection, email: &str) -> AccountId {
        create_account(
            conn,
            &NewAccount {
                email,
                password_hash: "hash",
                role: Role::Author,
                name: "Writer",
                phone: "5550100",
                education: "MBA",
                photo: None,
            },
        )
        .unwrap()
        .id
    }

    fn image(id: &str) -> MediaRef {
        MediaRef {
            url: format!("/media/{id}.png"),
            delete_id: id.into(),
        }
    }

    fn fields<'a>(title: &'a str, category: Category, image: &'a MediaRef) -> PostFields<'a> {
        PostFields {
            title,
            category,
            about: "Some body text",
            image,
        }
    }

    #[test]
    fn create_and_get_joins_author() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let owner = author(&conn, "w@example.com");
        let img = image("one");

        let post = create_post(&conn, owner, &fields("Hello", Category::Tourism, &img)).unwrap();
        assert_eq!(post.owner, owner);
        assert_eq!(post.author_name, "Writer");
        assert_eq!(post.image, img);
        assert_eq!(post.created_at, post.updated_at);

        let again = get_post(&conn, post.id).unwrap().unwrap();
        assert_eq!(again, post);
    }

    #[test]
    fn list_filters_by_category() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let owner = author(&conn, "w@example.com");
        let img = image("x");
        create_post(&conn, owner, &fields("A", Category::Sports, &img)).unwrap();
        create_post(&conn, owner, &fields("B", Category::Health, &img)).unwrap();
        create_post(&conn, owner, &fields("C", Category::Sports, &img)).unwrap();

        assert_eq!(list_posts(&conn, None).unwrap().len(), 3);
        let sports = list_posts(&conn, Some(Category::Sports)).unwrap();
        assert_eq!(sports.len(), 2);
        assert_eq!(sports[0].title, "C");
    }

    #[test]
    fn list_by_owner() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let a = author(&conn, "a@example.com");
        let b = author(&conn, "b@example.com");
        let img = image("y");
        create_post(&conn, a, &fields("mine", Category::Business, &img)).unwrap();
        create_post(&conn, b, &fields("theirs", Category::Business, &img)).unwrap();

        let mine = list_posts_by_owner(&conn, a).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[test]
    fn update_replaces_fields() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let owner = author(&conn, "w@example.com");
        let old = image("old");
        let new = image("new");
        let post = create_post(&conn, owner, &fields("Before", Category::Sports, &old)).unwrap();

        assert!(update_post(&conn, post.id, &fields("After", Category::Health, &new)).unwrap());
        let updated = get_post(&conn, post.id).unwrap().unwrap();
        assert_eq!(updated.title, "After");
        assert_eq!(updated.category, Category::Health);
        assert_eq!(updated.image, new);
        assert_eq!(updated.owner, owner);
    }

    #[test]
    fn update_and_delete_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let img = image("z");
        assert!(!update_post(&conn, PostId::new(), &fields("x", Category::Sports, &img)).unwrap());
        assert!(!delete_post(&conn, PostId::new()).unwrap());
    }

    #[test]
    fn delete_removes_row() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let owner = author(&conn, "w@example.com");
        let img = image("d");
        let post = create_post(&conn, owner, &fields("Gone", Category::Devotional, &img)).unwrap();

        assert!(delete_post(&conn, post.id).unwrap());
        assert!(get_post(&conn, post.id).unwrap().is_none());
    }
}
