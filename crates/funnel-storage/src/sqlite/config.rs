//! Config key-value operations for [`SqliteStore`].

use rusqlite::params;

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;

impl SqliteStore {
    /// Sets a configuration key-value pair.
    pub(crate) fn set_config_impl(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Gets a configuration value by key.
    pub(crate) fn get_config_impl(&self, key: &str) -> Result<String> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT value FROM config WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("config", key),
            other => StorageError::Query(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Storage;

    #[test]
    fn set_get_overwrite() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_config("actor", "laura").unwrap();
        assert_eq!(store.get_config("actor").unwrap(), "laura");
        store.set_config("actor", "marta").unwrap();
        assert_eq!(store.get_config("actor").unwrap(), "marta");
        assert!(store.get_config("missing").unwrap_err().is_not_found());
    }
}
