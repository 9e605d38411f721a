//! Client operations for [`SqliteStore`].

use rusqlite::{Row, params};
use tracing::debug;

use funnel_core::client::Client;

use crate::error::{Result, StorageError};
use crate::sqlite::leads::{datetime_from_sql, format_datetime, is_unique_violation};
use crate::sqlite::store::SqliteStore;

pub(crate) const CLIENT_COLUMNS: &str =
    "id, name, email, phone, handle, source_lead_id, created_at";

/// Deserialises a row into a [`Client`]. Column order must match [`CLIENT_COLUMNS`].
pub(crate) fn scan_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    let created_at: String = row.get("created_at")?;
    Ok(Client {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        handle: row.get("handle")?,
        source_lead_id: row.get("source_lead_id")?,
        created_at: datetime_from_sql(&created_at)?,
    })
}

impl SqliteStore {
    pub(crate) fn create_client_impl(&self, client: &Client) -> Result<()> {
        let conn = self.lock_conn()?;
        let result = conn.execute(
            "INSERT INTO clients (id, name, email, phone, handle, source_lead_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                client.id,
                client.name,
                client.email,
                client.phone,
                client.handle,
                client.source_lead_id,
                format_datetime(&client.created_at),
            ],
        );

        match result {
            Ok(_) => {
                debug!(id = %client.id, source = %client.source_lead_id, "created client");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                Err(StorageError::duplicate("client", &client.id))
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    pub(crate) fn get_client_impl(&self, id: &str) -> Result<Client> {
        let conn = self.lock_conn()?;
        conn.query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
            params![id],
            scan_client,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("client", id),
            other => StorageError::Query(other),
        })
    }

    pub(crate) fn delete_client_impl(&self, id: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute("DELETE FROM clients WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::not_found("client", id));
        }
        debug!(id, "deleted client");
        Ok(())
    }

    pub(crate) fn list_clients_impl(&self) -> Result<Vec<Client>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at, id"
        ))?;
        let clients = stmt
            .query_map([], scan_client)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }
}
