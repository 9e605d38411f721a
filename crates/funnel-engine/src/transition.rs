//! Stage transition engine with compensating side effects.
//!
//! The engine decides whether moving a lead to a target stage is a plain
//! stage+timestamp write or must run an auxiliary workflow, executes it,
//! and upholds one invariant: no lead may be persistently observed in a
//! call-required stage without a call created no earlier than the
//! transition.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use funnel_core::lead::LeadSnapshot;
use funnel_core::stage::StageCatalog;
use funnel_storage::Storage;

use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::workflow::CallWorkflow;

/// Successful result of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The stage write (and any required call) is fully finalized.
    Committed,

    /// The stage write landed, but the lead now awaits conversion. The
    /// snapshot lets the caller prefill the conversion form; the engine
    /// neither retries nor rolls back if the caller abandons it.
    PendingConversion(LeadSnapshot),
}

/// Executes stage transitions against a store.
pub struct TransitionEngine<'a> {
    store: &'a dyn Storage,
    catalog: &'a StageCatalog,
    clock: &'a dyn Clock,
}

impl<'a> TransitionEngine<'a> {
    pub fn new(store: &'a dyn Storage, catalog: &'a StageCatalog, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    /// Moves a lead to `target_stage`.
    ///
    /// `call_at` is the scheduled time for the call a call-required stage
    /// mandates; it is ignored for other stages and required
    /// ([`EngineError::CallTimeRequired`]) for call-required ones, checked
    /// before anything is written.
    ///
    /// Re-applying the lead's current stage is a no-op that succeeds
    /// without touching `stage_entered_at`.
    pub fn transition(
        &self,
        lead_id: &str,
        target_stage: &str,
        call_at: Option<DateTime<Utc>>,
    ) -> Result<TransitionOutcome> {
        let requirements = self
            .catalog
            .requirements(target_stage)
            .ok_or_else(|| EngineError::UnknownStage(target_stage.to_string()))?;

        let lead = self.store.get_lead(lead_id)?;
        if lead.converted {
            return Err(EngineError::AlreadyConverted(lead_id.to_string()));
        }
        if lead.stage == target_stage {
            debug!(lead_id, stage = target_stage, "no-op transition");
            return Ok(TransitionOutcome::Committed);
        }

        // Fail fast before any write: a call-required stage without a call
        // time never needs compensation.
        if requirements.call && call_at.is_none() {
            return Err(EngineError::CallTimeRequired {
                stage: target_stage.to_string(),
            });
        }

        let now = self.clock.now();
        let prev_stage = lead.stage.clone();
        let prev_entered_at = lead.stage_entered_at;

        // Speculative stage write; plain transitions are done after this.
        self.store.set_lead_stage(lead_id, target_stage, now)?;
        debug!(lead_id, from = %prev_stage, to = target_stage, "stage written");

        if requirements.call {
            if let Some(scheduled_at) = call_at {
                let workflow = CallWorkflow::new(self.store, self.clock);
                if let Err(call_err) = workflow.create_call(lead_id, scheduled_at) {
                    warn!(
                        lead_id,
                        stage = target_stage,
                        "call creation failed, compensating stage write: {call_err}"
                    );
                    // Restore the previous stage so no reader sees the lead
                    // in a call-required stage without a call. The prior
                    // entry timestamp is restored too, keeping follow-up
                    // acks for the old stage entry valid.
                    self.store
                        .set_lead_stage(lead_id, &prev_stage, prev_entered_at)
                        .map_err(|e| EngineError::CompensationFailed {
                            lead_id: lead_id.to_string(),
                            reason: e.to_string(),
                        })?;
                    return Err(EngineError::CallCreationFailed {
                        lead_id: lead_id.to_string(),
                        restored_stage: prev_stage,
                        reason: call_err.to_string(),
                    });
                }
            }
        }

        if requirements.conversion {
            // The stage write stands; actual client creation is a separate,
            // operator-driven convert call.
            let mut snapshot = LeadSnapshot::from(&lead);
            snapshot.stage = target_stage.to_string();
            return Ok(TransitionOutcome::PendingConversion(snapshot));
        }

        Ok(TransitionOutcome::Committed)
    }
}
