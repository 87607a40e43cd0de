//! Account persistence: insert and lookup by id or email.

use chrono::{SecondsFormat, Utc};
use qp_core::{AccountId, Error, Result, Role};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Account, NewAccount, ACCOUNT_COLUMNS};

/// Insert a new account and return it.
///
/// The email is stored lowercased. A unique-constraint violation maps to
/// [`Error::DuplicateEmail`].
pub fn create_account(conn: &Connection, new: &NewAccount<'_>) -> Result<Account> {
    let id = AccountId::new();
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let email = new.email.trim().to_lowercase();

    conn.execute(
        "INSERT INTO accounts (id, email, password_hash, role, name, phone, education,
                               photo_url, photo_delete_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            id.to_string(),
            email,
            new.password_hash,
            new.role.to_string(),
            new.name,
            new.phone,
            new.education,
            new.photo.map(|p| p.url.as_str()),
            new.photo.map(|p| p.delete_id.as_str()),
            created_at,
        ],
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::DuplicateEmail(email.clone())
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(Account {
        id,
        email,
        password_hash: new.password_hash.to_string(),
        role: new.role,
        name: new.name.to_string(),
        phone: new.phone.to_string(),
        education: new.education.to_string(),
        photo: new.photo.cloned(),
        created_at,
    })
}

/// Get an account by primary key.
pub fn get_account_by_id(conn: &Connection, id: AccountId) -> Result<Option<Account>> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
        [id.to_string()],
        Account::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get an account by email, ignoring case.
pub fn get_account_by_email(conn: &Connection, email: &str) -> Result<Option<Account>> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
        [email.trim()],
        Account::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Whether an account with this email exists.
pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM accounts WHERE email = ?1",
        [email.trim()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// List all accounts holding `role`, oldest first.
pub fn list_accounts_by_role(conn: &Connection, role: Role) -> Result<Vec<Account>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = ?1 ORDER BY created_at ASC"
        ))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([role.to_string()], Account::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use qp_core::MediaRef;

    fn new_account<'a>(email: &'a str, role: Role) -> NewAccount<'a> {
        NewAccount {
            email,
            password_hash: "hash",
            role,
            name: "Alice",
            phone: "5550100",
            education: "MCA",
            photo: None,
        }
    }

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let a = create_account(&conn, &new_account("alice@example.com", Role::Author)).unwrap();
        assert_eq!(a.role, Role::Author);

        let found = get_account_by_id(&conn, a.id).unwrap().unwrap();
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(found.role, Role::Author);
        assert!(found.photo.is_none());
    }

    #[test]
    fn email_is_case_insensitive() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_account(&conn, &new_account("Bob@Example.com", Role::Reader)).unwrap();

        let found = get_account_by_email(&conn, "BOB@example.COM").unwrap().unwrap();
        assert_eq!(found.email, "bob@example.com");
        assert!(email_exists(&conn, "bob@EXAMPLE.com").unwrap());
    }

    #[test]
    fn duplicate_email_any_case() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_account(&conn, &new_account("dup@example.com", Role::Reader)).unwrap();
        let err = create_account(&conn, &new_account("DUP@example.com", Role::Author)).unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(_)));
    }

    #[test]
    fn photo_reference_round_trips() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let photo = MediaRef {
            url: "/media/abc.png".into(),
            delete_id: "abc".into(),
        };
        let mut new = new_account("pic@example.com", Role::Author);
        new.photo = Some(&photo);
        let a = create_account(&conn, &new).unwrap();

        let found = get_account_by_id(&conn, a.id).unwrap().unwrap();
        assert_eq!(found.photo, Some(photo));
    }

    #[test]
    fn list_by_role() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_account(&conn, &new_account("a1@example.com", Role::Author)).unwrap();
        create_account(&conn, &new_account("r1@example.com", Role::Reader)).unwrap();
        create_account(&conn, &new_account("a2@example.com", Role::Author)).unwrap();

        let authors = list_accounts_by_role(&conn, Role::Author).unwrap();
        assert_eq!(authors.len(), 2);
        assert!(authors.iter().all(|a| a.role == Role::Author));
    }

    #[test]
    fn missing_account_is_none() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(get_account_by_id(&conn, AccountId::new()).unwrap().is_none());
        assert!(get_account_by_email(&conn, "nobody@example.com").unwrap().is_none());
    }
}
