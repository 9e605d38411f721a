//! The [`Storage`] trait -- the public API for pipeline persistence.
//!
//! The engine and CLI depend on this trait rather than on a concrete
//! implementation so that alternative backends (mocks, failure-injecting
//! proxies) can be substituted.

use chrono::{DateTime, Utc};

use funnel_core::ack::DispatchAck;
use funnel_core::call::Call;
use funnel_core::client::Client;
use funnel_core::lead::Lead;
use funnel_core::rule::FollowUpRule;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Partial-update structs
// ---------------------------------------------------------------------------

/// Typed partial-update struct for leads.
///
/// Only `Some` fields are applied; `None` fields are left unchanged. Stage
/// changes deliberately do NOT go through here -- they use
/// [`Storage::set_lead_stage`] so the stage and its entry timestamp always
/// move together.
#[derive(Debug, Clone, Default)]
pub struct LeadUpdates {
    pub name: Option<String>,
    pub handle: Option<String>,
    pub notes: Option<String>,
}

/// Typed partial-update struct for follow-up rules.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdates {
    pub message: Option<String>,
    pub delay_hours: Option<i64>,
    pub active: Option<bool>,
    pub stages: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Primary storage interface for the pipeline tracker.
///
/// Single-row writes are atomic, and a write followed by a read through the
/// same store observes the written value. The compensating write in the
/// transition engine depends on that ordering.
pub trait Storage: Send + Sync {
    // -- Leads ---------------------------------------------------------------

    /// Creates a new lead.
    fn create_lead(&self, lead: &Lead) -> Result<()>;

    /// Retrieves a lead by its ID.
    fn get_lead(&self, id: &str) -> Result<Lead>;

    /// Returns all leads still on the board (not converted), in creation order.
    fn list_leads(&self) -> Result<Vec<Lead>>;

    /// Returns unconverted leads whose current stage is in `stages`.
    fn list_leads_in_stages(&self, stages: &[String]) -> Result<Vec<Lead>>;

    /// Applies partial display-field updates to a lead.
    fn update_lead(&self, id: &str, updates: &LeadUpdates) -> Result<()>;

    /// Writes a lead's stage and stage-entry timestamp in one atomic update.
    fn set_lead_stage(&self, id: &str, stage: &str, entered_at: DateTime<Utc>) -> Result<()>;

    /// Permanently marks a lead converted and links it to its client.
    ///
    /// Fails with [`StorageError::Conflict`](crate::StorageError::Conflict)
    /// if the lead is already converted, so two racing conversions cannot
    /// both succeed.
    fn mark_lead_converted(&self, id: &str, client_id: &str) -> Result<()>;

    /// Deletes a lead. Calls keep their rows with `lead_id` cleared.
    fn delete_lead(&self, id: &str) -> Result<()>;

    // -- Calls ---------------------------------------------------------------

    /// Creates a call record. The referenced lead must exist.
    fn create_call(&self, call: &Call) -> Result<()>;

    /// Retrieves a call by its ID.
    fn get_call(&self, id: &str) -> Result<Call>;

    /// Returns all calls for a lead, most recently scheduled first.
    fn list_calls_for_lead(&self, lead_id: &str) -> Result<Vec<Call>>;

    // -- Clients -------------------------------------------------------------

    /// Creates a client record.
    fn create_client(&self, client: &Client) -> Result<()>;

    /// Retrieves a client by its ID.
    fn get_client(&self, id: &str) -> Result<Client>;

    /// Deletes a client. Used by the conversion workflow to undo a client
    /// whose lead lost the conversion race; never part of normal flows.
    fn delete_client(&self, id: &str) -> Result<()>;

    /// Returns all clients in creation order.
    fn list_clients(&self) -> Result<Vec<Client>>;

    // -- Follow-up rules -----------------------------------------------------

    /// Creates a follow-up rule.
    fn create_rule(&self, rule: &FollowUpRule) -> Result<()>;

    /// Retrieves a rule by its ID.
    fn get_rule(&self, id: &str) -> Result<FollowUpRule>;

    /// Returns all rules in creation order.
    fn list_rules(&self) -> Result<Vec<FollowUpRule>>;

    /// Returns only active rules, in creation order.
    fn list_active_rules(&self) -> Result<Vec<FollowUpRule>>;

    /// Applies partial updates to a rule.
    fn update_rule(&self, id: &str, updates: &RuleUpdates) -> Result<()>;

    /// Deletes a rule. Existing acks for it are left behind; they match
    /// nothing once the rule is gone.
    fn delete_rule(&self, id: &str) -> Result<()>;

    // -- Dispatch acknowledgements -------------------------------------------

    /// Inserts a dispatch acknowledgement.
    ///
    /// Returns `true` if a row was inserted, `false` if the exact key
    /// already existed (idempotent double-click case).
    fn insert_ack(&self, ack: &DispatchAck) -> Result<bool>;

    /// Returns `true` if an ack exists for this exact stage-entry instant.
    fn has_ack(
        &self,
        rule_id: &str,
        lead_id: &str,
        stage_entered_at: DateTime<Utc>,
    ) -> Result<bool>;

    // -- Configuration -------------------------------------------------------

    /// Sets a configuration key-value pair.
    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    /// Gets a configuration value by key.
    fn get_config(&self, key: &str) -> Result<String>;

    // -- Lifecycle -----------------------------------------------------------

    /// Closes the database connection and releases resources.
    fn close(&self) -> Result<()>;
}
