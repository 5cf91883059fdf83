//! User lookup used to attribute editorial remarks.

use crate::model::remark::{User, UserId};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub trait UserRepository {
    fn create_user(&self, email: &str, name: &str) -> RepoResult<UserId>;
    /// Exact, case-sensitive email lookup.
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, email: &str, name: &str) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (email, name) VALUES (?1, ?2);",
            params![email, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, name FROM users WHERE email = ?1;",
                [email],
                |row| {
                    Ok(User {
                        id: row.get("id")?,
                        email: row.get("email")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
