//! Call record created by the call workflow (or directly by an operator).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Result tag of a call.
///
/// Serialized as a snake_case string with a custom fallback, so operator
/// tooling can introduce its own tags without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallOutcome {
    Pending,
    Completed,
    NoShow,
    Cancelled,
    Custom(String),
}

impl CallOutcome {
    /// Returns the string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns `true` if this is the default variant.
    pub fn is_default(&self) -> bool {
        *self == Self::Pending
    }
}

impl Default for CallOutcome {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CallOutcome {
    fn from(s: &str) -> Self {
        match s {
            "pending" | "" => Self::Pending,
            "completed" => Self::Completed,
            "no_show" => Self::NoShow,
            "cancelled" => Self::Cancelled,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for CallOutcome {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl Serialize for CallOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// A scheduled (or held) call.
///
/// `lead_id` is optional: a call created against a lead keeps the link, but
/// when the lead is later converted the call may be re-linked to the client
/// instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    pub scheduled_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recording_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default, skip_serializing_if = "CallOutcome::is_default")]
    pub outcome: CallOutcome,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Call {
    /// Creates a pending call tied to a lead.
    pub fn for_lead(
        id: impl Into<String>,
        lead_id: impl Into<String>,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            lead_id: Some(lead_id.into()),
            client_id: None,
            scheduled_at,
            recording_url: String::new(),
            notes: String::new(),
            outcome: CallOutcome::Pending,
            created_at: now,
        }
    }
}
