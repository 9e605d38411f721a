//! Dispatch acknowledgement operations for [`SqliteStore`].
//!
//! Acks are insert-only. The composite primary key includes the lead's
//! `stage_entered_at`, so `INSERT OR IGNORE` gives mark-sent its idempotency
//! and a stage change silently retires every older ack for that lead.

use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::debug;

use funnel_core::ack::DispatchAck;

use crate::error::Result;
use crate::sqlite::leads::format_datetime;
use crate::sqlite::store::SqliteStore;

impl SqliteStore {
    pub(crate) fn insert_ack_impl(&self, ack: &DispatchAck) -> Result<bool> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "INSERT OR IGNORE INTO dispatch_acks (rule_id, lead_id, stage_entered_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                ack.rule_id,
                ack.lead_id,
                format_datetime(&ack.stage_entered_at),
                format_datetime(&ack.created_at),
            ],
        )?;
        if affected > 0 {
            debug!(rule_id = %ack.rule_id, lead_id = %ack.lead_id, "recorded dispatch ack");
        }
        Ok(affected > 0)
    }

    pub(crate) fn has_ack_impl(
        &self,
        rule_id: &str,
        lead_id: &str,
        stage_entered_at: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.lock_conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM dispatch_acks
                 WHERE rule_id = ?1 AND lead_id = ?2 AND stage_entered_at = ?3
             )",
            params![rule_id, lead_id, format_datetime(&stage_entered_at)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
