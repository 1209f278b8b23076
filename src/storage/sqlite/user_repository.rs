use rusqlite::Row;

use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::UserRepository;

pub struct SqliteUserRepository {
    storage: SqliteStorage,
}

impl SqliteUserRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            created_at: row.get(1)?,
            updated_at: row.get(2)?,
            name: row.get(3)?,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    fn create_user(&self, user: &User) -> GatorResult<User> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO users (id, created_at, updated_at, name) VALUES (?1, ?2, ?3, ?4)",
            (&user.id, &user.created_at, &user.updated_at, &user.name),
        )
        .map_err(|e| GatorError::from_insert(e, format!("user {}", user.name)))?;

        Ok(user.clone())
    }

    fn get_user_by_name(&self, name: &str) -> GatorResult<User> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, created_at, updated_at, name FROM users WHERE name = ?1")?;

        match stmt.query_row([name], Self::from_row) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(GatorError::NotFound(format!("user {}", name)))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_users(&self) -> GatorResult<Vec<User>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, created_at, updated_at, name FROM users ORDER BY name")?;

        let users = stmt.query_map([], Self::from_row)?;
        users.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn reset(&self) -> GatorResult<usize> {
        let conn = self.storage.connection()?;
        Ok(conn.execute("DELETE FROM users", [])?)
    }
}
