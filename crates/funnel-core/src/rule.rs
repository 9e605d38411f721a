//! Follow-up rule configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Helper for `skip_serializing_if` on `Vec` fields.
fn is_empty_vec<T>(v: &Vec<T>) -> bool {
    v.is_empty()
}

/// A configured follow-up rule.
///
/// Read-only to the scheduler; created and edited by operator tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRule {
    #[serde(default)]
    pub id: String,

    /// Message template shown to the operator when the rule fires.
    #[serde(default)]
    pub message: String,

    /// How long a lead must sit in an applicable stage before the rule fires.
    pub delay_hours: i64,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Stage identifiers this rule applies to.
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub stages: Vec<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl FollowUpRule {
    /// Returns `true` if the rule applies to the given stage.
    pub fn applies_to(&self, stage_id: &str) -> bool {
        self.stages.iter().any(|s| s == stage_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_to_matches_exact_ids() {
        let rule = FollowUpRule {
            id: "fr-1".into(),
            message: "¿Seguimos en contacto?".into(),
            delay_hours: 24,
            active: true,
            stages: vec!["mensaje_conexion".into(), "respuesta_recibida".into()],
            created_at: Utc::now(),
        };
        assert!(rule.applies_to("mensaje_conexion"));
        assert!(!rule.applies_to("mensaje"));
    }
}
