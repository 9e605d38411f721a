//! Client record produced by the conversion workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contact fields supplied by the operator when converting a lead.
///
/// The conversion workflow merges these with the lead's own display fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientFields {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
}

/// A converted client.
///
/// Creation is one-way: the originating lead is permanently marked
/// converted and leaves the pipeline board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub handle: String,

    /// The lead this client was converted from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_lead_id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
