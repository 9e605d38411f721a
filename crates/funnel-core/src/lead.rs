//! Lead struct -- the central domain model for the funnel pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Helper for `skip_serializing_if` on `bool` fields.
fn is_false(b: &bool) -> bool {
    !b
}

/// A prospect moving through the pipeline board.
///
/// `stage_entered_at` is the anchor of the follow-up subsystem: it changes
/// exactly once per successful stage change and never on a no-op write, and
/// dispatch acknowledgements are keyed against its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub id: String,

    // ===== Display fields =====
    #[serde(default)]
    pub name: String,

    /// Social handle or other contact reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub handle: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    // ===== Pipeline position =====
    /// Current stage; always one of the catalog identifiers.
    #[serde(default)]
    pub stage: String,

    /// When the lead entered its current stage.
    #[serde(default = "Utc::now")]
    pub stage_entered_at: DateTime<Utc>,

    // ===== Conversion =====
    /// Set when the conversion workflow has created a client from this lead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Permanent marker; converted leads leave the board.
    #[serde(default, skip_serializing_if = "is_false")]
    pub converted: bool,

    // ===== Timestamps =====
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Creates a lead in the given stage with both timestamps set to `now`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stage: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            handle: String::new(),
            notes: String::new(),
            stage: stage.into(),
            stage_entered_at: now,
            client_id: None,
            converted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hours the lead has sat in its current stage, truncated toward zero.
    pub fn hours_in_stage(&self, now: DateTime<Utc>) -> i64 {
        (now - self.stage_entered_at).num_hours()
    }
}

/// Read-only snapshot of a lead handed to callers alongside
/// pending-conversion results, so the conversion form can be prefilled
/// without a second store read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSnapshot {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub notes: String,
    pub stage: String,
}

impl From<&Lead> for LeadSnapshot {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id.clone(),
            name: lead.name.clone(),
            handle: lead.handle.clone(),
            notes: lead.notes.clone(),
            stage: lead.stage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn hours_in_stage_truncates() {
        let now = Utc::now();
        let mut lead = Lead::new("ld-1", "Ada", "nuevo", now);
        lead.stage_entered_at = now - Duration::minutes(25 * 60 + 59);
        assert_eq!(lead.hours_in_stage(now), 25);
    }

    #[test]
    fn snapshot_carries_display_fields() {
        let now = Utc::now();
        let mut lead = Lead::new("ld-2", "Grace", "propuesta_enviada", now);
        lead.handle = "@grace".into();
        let snap = LeadSnapshot::from(&lead);
        assert_eq!(snap.id, "ld-2");
        assert_eq!(snap.handle, "@grace");
        assert_eq!(snap.stage, "propuesta_enviada");
    }
}
