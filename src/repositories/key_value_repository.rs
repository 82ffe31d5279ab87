// src/repositories/key_value_repository.rs

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use rusqlite::{params, OptionalExtension};

use crate::db::ConnectionPool;
use crate::error::AppResult;

/// Durable string-keyed storage.
///
/// No cross-key transactions; concurrent writes to one key are
/// last-write-wins.
pub trait KeyValueRepository: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>>;
}

pub struct SqliteKeyValueRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteKeyValueRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl KeyValueRepository for SqliteKeyValueRepository {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.pool.get()?;

        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT key FROM kv_store WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;

        let keys = stmt
            .query_map(params![prefix, prefix.chars().count() as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys)
    }
}

/// Process-local store, used by tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryKeyValueRepository {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueRepository for InMemoryKeyValueRepository {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection_pool, create_memory_pool, initialize_database};

    fn sqlite_repo() -> SqliteKeyValueRepository {
        let pool = create_memory_pool().unwrap();
        initialize_database(&pool.get().unwrap()).unwrap();
        SqliteKeyValueRepository::new(Arc::new(pool))
    }

    fn exercise(repo: &dyn KeyValueRepository) {
        assert_eq!(repo.get("missing").unwrap(), None);

        repo.set("favorites:a", "[1]").unwrap();
        repo.set("favorites:a", "[1,2]").unwrap();
        repo.set("favorites:b", "[]").unwrap();
        repo.set("auth:user", "{}").unwrap();

        assert_eq!(repo.get("favorites:a").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(
            repo.keys_with_prefix("favorites:").unwrap(),
            vec!["favorites:a".to_string(), "favorites:b".to_string()]
        );

        repo.remove("favorites:a").unwrap();
        repo.remove("never-written").unwrap();
        assert_eq!(repo.get("favorites:a").unwrap(), None);
    }

    #[test]
    fn test_sqlite_repository_contract() {
        exercise(&sqlite_repo());
    }

    #[test]
    fn test_in_memory_repository_contract() {
        exercise(&InMemoryKeyValueRepository::new());
    }

    #[test]
    fn test_sqlite_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let pool = create_connection_pool(&path).unwrap();
            initialize_database(&pool.get().unwrap()).unwrap();
            let repo = SqliteKeyValueRepository::new(Arc::new(pool));
            repo.set("auth:user", r#"{"id":"u"}"#).unwrap();
        }

        let pool = create_connection_pool(&path).unwrap();
        initialize_database(&pool.get().unwrap()).unwrap();
        let repo = SqliteKeyValueRepository::new(Arc::new(pool));
        assert_eq!(repo.get("auth:user").unwrap().as_deref(), Some(r#"{"id":"u"}"#));
    }
}
