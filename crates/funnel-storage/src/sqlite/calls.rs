//! Call operations for [`SqliteStore`].

use rusqlite::{Row, params};
use tracing::debug;

use funnel_core::call::{Call, CallOutcome};

use crate::error::{Result, StorageError};
use crate::sqlite::leads::{datetime_from_sql, format_datetime, is_unique_violation};
use crate::sqlite::store::SqliteStore;

pub(crate) const CALL_COLUMNS: &str =
    "id, lead_id, client_id, scheduled_at, recording_url, notes, outcome, created_at";

/// Deserialises a row into a [`Call`]. Column order must match [`CALL_COLUMNS`].
pub(crate) fn scan_call(row: &Row<'_>) -> rusqlite::Result<Call> {
    let scheduled_at: String = row.get("scheduled_at")?;
    let created_at: String = row.get("created_at")?;
    let outcome: String = row.get("outcome")?;

    Ok(Call {
        id: row.get("id")?,
        lead_id: row.get("lead_id")?,
        client_id: row.get("client_id")?,
        scheduled_at: datetime_from_sql(&scheduled_at)?,
        recording_url: row.get("recording_url")?,
        notes: row.get("notes")?,
        outcome: CallOutcome::from(outcome),
        created_at: datetime_from_sql(&created_at)?,
    })
}

impl SqliteStore {
    pub(crate) fn create_call_impl(&self, call: &Call) -> Result<()> {
        let conn = self.lock_conn()?;

        // Referential validity: a call created against a lead must point at
        // an existing one.
        if let Some(ref lead_id) = call.lead_id {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1)",
                params![lead_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(StorageError::not_found("lead", lead_id));
            }
        }

        let result = conn.execute(
            "INSERT INTO calls (id, lead_id, client_id, scheduled_at, recording_url, notes, outcome, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                call.id,
                call.lead_id,
                call.client_id,
                format_datetime(&call.scheduled_at),
                call.recording_url,
                call.notes,
                call.outcome.as_str(),
                format_datetime(&call.created_at),
            ],
        );

        match result {
            Ok(_) => {
                debug!(id = %call.id, lead_id = ?call.lead_id, "created call");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::duplicate("call", &call.id)),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    pub(crate) fn get_call_impl(&self, id: &str) -> Result<Call> {
        let conn = self.lock_conn()?;
        conn.query_row(
            &format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ?1"),
            params![id],
            scan_call,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("call", id),
            other => StorageError::Query(other),
        })
    }

    pub(crate) fn list_calls_for_lead_impl(&self, lead_id: &str) -> Result<Vec<Call>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CALL_COLUMNS} FROM calls WHERE lead_id = ?1 ORDER BY scheduled_at DESC, id"
        ))?;
        let calls = stmt
            .query_map(params![lead_id], scan_call)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(calls)
    }
}
