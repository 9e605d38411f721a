//! Storage backend for the funnel pipeline tracker.
//!
//! Provides the [`Storage`] trait and a SQLite implementation
//! ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience.
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::{LeadUpdates, RuleUpdates, Storage};

// ---------------------------------------------------------------------------
// Storage trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};

use funnel_core::ack::DispatchAck;
use funnel_core::call::Call;
use funnel_core::client::Client;
use funnel_core::lead::Lead;
use funnel_core::rule::FollowUpRule;

use crate::error::Result;

impl Storage for SqliteStore {
    fn create_lead(&self, lead: &Lead) -> Result<()> {
        self.create_lead_impl(lead)
    }

    fn get_lead(&self, id: &str) -> Result<Lead> {
        self.get_lead_impl(id)
    }

    fn list_leads(&self) -> Result<Vec<Lead>> {
        self.list_leads_impl()
    }

    fn list_leads_in_stages(&self, stages: &[String]) -> Result<Vec<Lead>> {
        self.list_leads_in_stages_impl(stages)
    }

    fn update_lead(&self, id: &str, updates: &LeadUpdates) -> Result<()> {
        self.update_lead_impl(id, updates)
    }

    fn set_lead_stage(&self, id: &str, stage: &str, entered_at: DateTime<Utc>) -> Result<()> {
        self.set_lead_stage_impl(id, stage, entered_at)
    }

    fn mark_lead_converted(&self, id: &str, client_id: &str) -> Result<()> {
        self.mark_lead_converted_impl(id, client_id)
    }

    fn delete_lead(&self, id: &str) -> Result<()> {
        self.delete_lead_impl(id)
    }

    fn create_call(&self, call: &Call) -> Result<()> {
        self.create_call_impl(call)
    }

    fn get_call(&self, id: &str) -> Result<Call> {
        self.get_call_impl(id)
    }

    fn list_calls_for_lead(&self, lead_id: &str) -> Result<Vec<Call>> {
        self.list_calls_for_lead_impl(lead_id)
    }

    fn create_client(&self, client: &Client) -> Result<()> {
        self.create_client_impl(client)
    }

    fn get_client(&self, id: &str) -> Result<Client> {
        self.get_client_impl(id)
    }

    fn delete_client(&self, id: &str) -> Result<()> {
        self.delete_client_impl(id)
    }

    fn list_clients(&self) -> Result<Vec<Client>> {
        self.list_clients_impl()
    }

    fn create_rule(&self, rule: &FollowUpRule) -> Result<()> {
        self.create_rule_impl(rule)
    }

    fn get_rule(&self, id: &str) -> Result<FollowUpRule> {
        self.get_rule_impl(id)
    }

    fn list_rules(&self) -> Result<Vec<FollowUpRule>> {
        self.list_rules_impl(false)
    }

    fn list_active_rules(&self) -> Result<Vec<FollowUpRule>> {
        self.list_rules_impl(true)
    }

    fn update_rule(&self, id: &str, updates: &RuleUpdates) -> Result<()> {
        self.update_rule_impl(id, updates)
    }

    fn delete_rule(&self, id: &str) -> Result<()> {
        self.delete_rule_impl(id)
    }

    fn insert_ack(&self, ack: &DispatchAck) -> Result<bool> {
        self.insert_ack_impl(ack)
    }

    fn has_ack(
        &self,
        rule_id: &str,
        lead_id: &str,
        stage_entered_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.has_ack_impl(rule_id, lead_id, stage_entered_at)
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.set_config_impl(key, value)
    }

    fn get_config(&self, key: &str) -> Result<String> {
        self.get_config_impl(key)
    }

    fn close(&self) -> Result<()> {
        // The connection closes when the inner Connection is dropped.
        Ok(())
    }
}
