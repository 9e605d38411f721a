//! Follow-up rule operations for [`SqliteStore`].

use rusqlite::{Row, params};
use tracing::debug;

use funnel_core::rule::FollowUpRule;

use crate::error::{Result, StorageError};
use crate::sqlite::leads::{datetime_from_sql, format_datetime, is_unique_violation};
use crate::sqlite::store::SqliteStore;
use crate::traits::RuleUpdates;

pub(crate) const RULE_COLUMNS: &str = "id, message, delay_hours, active, stages, created_at";

/// Deserialises a row into a [`FollowUpRule`]. Column order must match
/// [`RULE_COLUMNS`]. The stage set is a JSON array in TEXT, like the other
/// list-valued columns in this schema.
pub(crate) fn scan_rule(row: &Row<'_>) -> rusqlite::Result<FollowUpRule> {
    let active: i32 = row.get("active")?;
    let stages_json: String = row.get("stages")?;
    let created_at: String = row.get("created_at")?;

    let stages: Vec<String> = serde_json::from_str(&stages_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(FollowUpRule {
        id: row.get("id")?,
        message: row.get("message")?,
        delay_hours: row.get("delay_hours")?,
        active: active != 0,
        stages,
        created_at: datetime_from_sql(&created_at)?,
    })
}

impl SqliteStore {
    pub(crate) fn create_rule_impl(&self, rule: &FollowUpRule) -> Result<()> {
        if rule.delay_hours < 0 {
            return Err(StorageError::validation("delay_hours must be >= 0"));
        }
        let conn = self.lock_conn()?;
        let stages_json = serde_json::to_string(&rule.stages)?;
        let result = conn.execute(
            "INSERT INTO followup_rules (id, message, delay_hours, active, stages, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                rule.id,
                rule.message,
                rule.delay_hours,
                rule.active as i32,
                stages_json,
                format_datetime(&rule.created_at),
            ],
        );

        match result {
            Ok(_) => {
                debug!(id = %rule.id, delay_hours = rule.delay_hours, "created follow-up rule");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::duplicate("rule", &rule.id)),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    pub(crate) fn get_rule_impl(&self, id: &str) -> Result<FollowUpRule> {
        let conn = self.lock_conn()?;
        conn.query_row(
            &format!("SELECT {RULE_COLUMNS} FROM followup_rules WHERE id = ?1"),
            params![id],
            scan_rule,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("rule", id),
            other => StorageError::Query(other),
        })
    }

    pub(crate) fn list_rules_impl(&self, only_active: bool) -> Result<Vec<FollowUpRule>> {
        let conn = self.lock_conn()?;
        let filter = if only_active { "WHERE active = 1" } else { "" };
        let mut stmt = conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM followup_rules {filter} ORDER BY created_at, id"
        ))?;
        let rules = stmt
            .query_map([], scan_rule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rules)
    }

    pub(crate) fn update_rule_impl(&self, id: &str, updates: &RuleUpdates) -> Result<()> {
        if let Some(delay) = updates.delay_hours {
            if delay < 0 {
                return Err(StorageError::validation("delay_hours must be >= 0"));
            }
        }
        let conn = self.lock_conn()?;

        let mut set_clauses: Vec<String> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ref message) = updates.message {
            set_clauses.push("message = ?".to_string());
            param_values.push(Box::new(message.clone()));
        }
        if let Some(delay) = updates.delay_hours {
            set_clauses.push("delay_hours = ?".to_string());
            param_values.push(Box::new(delay));
        }
        if let Some(active) = updates.active {
            set_clauses.push("active = ?".to_string());
            param_values.push(Box::new(active as i32));
        }
        if let Some(ref stages) = updates.stages {
            set_clauses.push("stages = ?".to_string());
            param_values.push(Box::new(serde_json::to_string(stages)?));
        }

        if set_clauses.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE followup_rules SET {} WHERE id = ?",
            set_clauses.join(", ")
        );
        param_values.push(Box::new(id.to_string()));

        let affected = conn.execute(
            &sql,
            rusqlite::params_from_iter(param_values.iter().map(|p| p.as_ref())),
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("rule", id));
        }
        Ok(())
    }

    pub(crate) fn delete_rule_impl(&self, id: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute("DELETE FROM followup_rules WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::not_found("rule", id));
        }
        Ok(())
    }
}
