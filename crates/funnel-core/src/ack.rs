//! Dispatch acknowledgement -- suppresses re-notification for one
//! stage-entry instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records that a follow-up message was sent for `(rule, lead)` while the
/// lead's `stage_entered_at` held the captured value.
///
/// The timestamp in the key is the whole design: when the lead re-enters a
/// stage its `stage_entered_at` changes, old acks stop matching, and the
/// rule can fire again with no cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchAck {
    pub rule_id: String,
    pub lead_id: String,

    /// The lead's `stage_entered_at` at acknowledgement time. Read
    /// server-side, never supplied by the caller.
    pub stage_entered_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
