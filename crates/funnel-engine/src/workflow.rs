//! Call and conversion workflows -- the side-effect handlers the transition
//! engine (and operators, directly) invoke.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use funnel_core::call::Call;
use funnel_core::client::{Client, ClientFields};
use funnel_core::idgen::{self, EntityKind};
use funnel_core::lead::Lead;
use funnel_storage::{Storage, StorageError};

use crate::clock::Clock;
use crate::error::{EngineError, Result};

/// Collision-retry budget for hash IDs. Collisions at these table sizes are
/// vanishingly rare; the loop exists so a retry is deterministic, not lucky.
const ID_RETRIES: i32 = 5;

/// Creates call records tied to leads.
pub struct CallWorkflow<'a> {
    store: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> CallWorkflow<'a> {
    pub fn new(store: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Creates a pending call for the lead at the given time.
    ///
    /// The lead must exist; no other invariants attach here.
    pub fn create_call(&self, lead_id: &str, scheduled_at: DateTime<Utc>) -> Result<Call> {
        self.create_call_with_notes(lead_id, scheduled_at, "")
    }

    /// Like [`create_call`](Self::create_call) with operator notes attached.
    pub fn create_call_with_notes(
        &self,
        lead_id: &str,
        scheduled_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<Call> {
        let now = self.clock.now();
        let seed = format!("{lead_id}|{}", scheduled_at.timestamp());

        let mut nonce = 0;
        loop {
            let id = idgen::generate_id(EntityKind::Call, &seed, now, nonce);
            let mut call = Call::for_lead(id, lead_id, scheduled_at, now);
            call.notes = notes.to_string();
            match self.store.create_call(&call) {
                Ok(()) => {
                    debug!(call_id = %call.id, lead_id, "call created");
                    return Ok(call);
                }
                Err(StorageError::Duplicate { .. }) if nonce < ID_RETRIES => {
                    nonce += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Converts leads into clients. One-way and idempotent: a lead converts at
/// most once, ever.
pub struct ConversionWorkflow<'a> {
    store: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> ConversionWorkflow<'a> {
    pub fn new(store: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Creates a client from the lead plus operator-supplied fields, then
    /// permanently removes the lead from the pipeline board.
    ///
    /// A second call for the same lead fails with
    /// [`EngineError::AlreadyConverted`] and never creates a second client.
    /// If two conversions race, the converted-marker write is the gate: the
    /// loser deletes the client it just created and reports
    /// `AlreadyConverted` as well.
    pub fn convert(&self, lead_id: &str, fields: &ClientFields) -> Result<Client> {
        let lead = self.store.get_lead(lead_id)?;
        if lead.converted {
            return Err(EngineError::AlreadyConverted(lead_id.to_string()));
        }

        let client = self.create_client_from(&lead, fields)?;

        match self.store.mark_lead_converted(lead_id, &client.id) {
            Ok(()) => {
                debug!(lead_id, client_id = %client.id, "lead converted");
                Ok(client)
            }
            Err(StorageError::Conflict { .. }) => {
                // Another conversion won between our check and our marker
                // write. Undo our client so exactly one survives.
                if let Err(e) = self.store.delete_client(&client.id) {
                    warn!(client_id = %client.id, "failed to undo client after lost conversion race: {e}");
                }
                Err(EngineError::AlreadyConverted(lead_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_client_from(&self, lead: &Lead, fields: &ClientFields) -> Result<Client> {
        let now = self.clock.now();
        let name = if fields.name.is_empty() {
            lead.name.clone()
        } else {
            fields.name.clone()
        };
        let seed = format!("{}|{}|{}", lead.id, name, fields.email);

        let mut nonce = 0;
        loop {
            let client = Client {
                id: idgen::generate_id(EntityKind::Client, &seed, now, nonce),
                name: name.clone(),
                email: fields.email.clone(),
                phone: fields.phone.clone(),
                handle: lead.handle.clone(),
                source_lead_id: lead.id.clone(),
                created_at: now,
            };
            match self.store.create_client(&client) {
                Ok(()) => return Ok(client),
                Err(StorageError::Duplicate { .. }) if nonce < ID_RETRIES => {
                    nonce += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
