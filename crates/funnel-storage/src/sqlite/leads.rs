//! Lead operations for [`SqliteStore`].

use chrono::{DateTime, Utc};
use rusqlite::{Row, params};
use tracing::{debug, warn};

use funnel_core::lead::Lead;

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;
use crate::traits::LeadUpdates;

/// All lead columns in a deterministic order for SELECT queries.
pub(crate) const LEAD_COLUMNS: &str =
    "id, name, handle, notes, stage, stage_entered_at, client_id, converted, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row scanning and timestamp helpers
// ---------------------------------------------------------------------------

/// Formats a `DateTime<Utc>` as ISO 8601 TEXT for SQLite.
///
/// Millisecond precision: every timestamp that becomes part of an ack key
/// goes through here, so stored and compared values always agree.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses an ISO 8601 TEXT string from SQLite into a `DateTime<Utc>`.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| StorageError::Internal(format!("bad timestamp {s:?}: {e}")))
}

/// Wraps a timestamp parse failure as a rusqlite conversion error so it can
/// flow out of `query_map` row closures.
pub(crate) fn datetime_from_sql(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_datetime(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Deserialises a row into a [`Lead`]. Column order must match [`LEAD_COLUMNS`].
pub(crate) fn scan_lead(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let stage_entered_at: String = row.get("stage_entered_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let converted: i32 = row.get("converted")?;

    Ok(Lead {
        id: row.get("id")?,
        name: row.get("name")?,
        handle: row.get("handle")?,
        notes: row.get("notes")?,
        stage: row.get("stage")?,
        stage_entered_at: datetime_from_sql(&stage_entered_at)?,
        client_id: row.get("client_id")?,
        converted: converted != 0,
        created_at: datetime_from_sql(&created_at)?,
        updated_at: datetime_from_sql(&updated_at)?,
    })
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    pub(crate) fn create_lead_impl(&self, lead: &Lead) -> Result<()> {
        let conn = self.lock_conn()?;
        let result = conn.execute(
            "INSERT INTO leads (id, name, handle, notes, stage, stage_entered_at, client_id, converted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                lead.id,
                lead.name,
                lead.handle,
                lead.notes,
                lead.stage,
                format_datetime(&lead.stage_entered_at),
                lead.client_id,
                lead.converted as i32,
                format_datetime(&lead.created_at),
                format_datetime(&lead.updated_at),
            ],
        );

        match result {
            Ok(_) => {
                debug!(id = %lead.id, stage = %lead.stage, "created lead");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::duplicate("lead", &lead.id)),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    pub(crate) fn get_lead_impl(&self, id: &str) -> Result<Lead> {
        let conn = self.lock_conn()?;
        conn.query_row(
            &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
            params![id],
            scan_lead,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("lead", id),
            other => StorageError::Query(other),
        })
    }

    pub(crate) fn list_leads_impl(&self) -> Result<Vec<Lead>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE converted = 0 ORDER BY created_at, id"
        ))?;
        let leads = stmt
            .query_map([], scan_lead)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leads)
    }

    pub(crate) fn list_leads_in_stages_impl(&self, stages: &[String]) -> Result<Vec<Lead>> {
        if stages.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock_conn()?;

        let placeholders = (1..=stages.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads
             WHERE converted = 0 AND stage IN ({placeholders})
             ORDER BY stage_entered_at, id"
        ))?;
        // Lenient scan: one malformed row must not take down the whole
        // follow-up pass, so bad rows are logged and dropped.
        let leads = stmt
            .query_map(rusqlite::params_from_iter(stages.iter()), scan_lead)?
            .filter_map(|r| match r {
                Ok(lead) => Some(lead),
                Err(e) => {
                    warn!("skipping malformed lead row: {e}");
                    None
                }
            })
            .collect();
        Ok(leads)
    }

    pub(crate) fn update_lead_impl(&self, id: &str, updates: &LeadUpdates) -> Result<()> {
        let conn = self.lock_conn()?;

        let mut set_clauses: Vec<String> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        macro_rules! add_field {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = updates.$field {
                    set_clauses.push(format!("{} = ?", $col));
                    param_values.push(Box::new(val.clone()));
                }
            };
        }

        add_field!(name, "name");
        add_field!(handle, "handle");
        add_field!(notes, "notes");

        if set_clauses.is_empty() {
            return Ok(());
        }

        set_clauses.push("updated_at = ?".to_string());
        param_values.push(Box::new(format_datetime(&Utc::now())));

        let sql = format!(
            "UPDATE leads SET {} WHERE id = ?",
            set_clauses.join(", ")
        );
        param_values.push(Box::new(id.to_string()));

        let affected = conn.execute(
            &sql,
            rusqlite::params_from_iter(param_values.iter().map(|p| p.as_ref())),
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("lead", id));
        }
        Ok(())
    }

    pub(crate) fn set_lead_stage_impl(
        &self,
        id: &str,
        stage: &str,
        entered_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        let now_str = format_datetime(&Utc::now());
        let affected = conn.execute(
            "UPDATE leads SET stage = ?1, stage_entered_at = ?2, updated_at = ?3 WHERE id = ?4",
            params![stage, format_datetime(&entered_at), now_str, id],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("lead", id));
        }
        debug!(id, stage, "set lead stage");
        Ok(())
    }

    pub(crate) fn mark_lead_converted_impl(&self, id: &str, client_id: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let now_str = format_datetime(&Utc::now());

        // Conditional on converted = 0 so racing conversions cannot both win.
        let affected = conn.execute(
            "UPDATE leads SET converted = 1, client_id = ?1, updated_at = ?2
             WHERE id = ?3 AND converted = 0",
            params![client_id, now_str, id],
        )?;
        if affected == 0 {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )?;
            return if exists {
                Err(StorageError::conflict("lead", id))
            } else {
                Err(StorageError::not_found("lead", id))
            };
        }
        debug!(id, client_id, "marked lead converted");
        Ok(())
    }

    pub(crate) fn delete_lead_impl(&self, id: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute("DELETE FROM leads WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::not_found("lead", id));
        }
        Ok(())
    }
}

/// Returns `true` for a UNIQUE/PRIMARY KEY constraint failure.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
