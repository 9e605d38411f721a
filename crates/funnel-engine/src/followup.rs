//! Follow-up due scheduler.
//!
//! Computes which (rule, lead) pairs are due for a follow-up message and
//! records dispatch acknowledgements. Designed to be polled (cron or
//! operator refresh) and safe to run concurrently with transitions: acks
//! are keyed to the lead's live `stage_entered_at`, so a concurrent stage
//! change at worst causes one extra firing, never a dropped one.

use chrono::{DateTime, Utc};
use tracing::warn;

use funnel_core::ack::DispatchAck;
use funnel_core::lead::Lead;
use funnel_core::rule::FollowUpRule;
use funnel_storage::Storage;

use crate::clock::Clock;
use crate::error::Result;

/// One due lead under a rule, annotated for operator display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDueInfo {
    pub lead_id: String,
    pub display_name: String,
    /// Whole hours the lead has sat in its current stage.
    pub elapsed_hours: i64,
}

/// A rule with its currently due leads. Rules with no due leads are not
/// reported.
#[derive(Debug, Clone)]
pub struct RuleDue {
    pub rule: FollowUpRule,
    pub leads: Vec<LeadDueInfo>,
}

/// Result of recording a dispatch acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// A new acknowledgement was recorded.
    Acknowledged,
    /// The exact key already existed; double-clicks are not errors.
    AlreadyAcknowledged,
}

/// Computes due follow-ups and records acknowledgements.
pub struct FollowUpScheduler<'a> {
    store: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> FollowUpScheduler<'a> {
    pub fn new(store: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Returns, per active rule, the leads currently due for its message.
    ///
    /// A lead is due under rule R when its stage is in R's stage set, it
    /// has sat there at least `delay_hours` whole hours as of `now`, and
    /// no acknowledgement exists for its current stage-entry instant.
    ///
    /// Individual lead failures are logged and skipped; a partial result
    /// is more valuable than none.
    pub fn due_followups(&self, now: DateTime<Utc>) -> Result<Vec<RuleDue>> {
        let mut result = Vec::new();

        for rule in self.store.list_active_rules()? {
            if rule.stages.is_empty() {
                continue;
            }

            let leads = match self.store.list_leads_in_stages(&rule.stages) {
                Ok(leads) => leads,
                Err(e) => {
                    warn!(rule_id = %rule.id, "skipping rule, lead query failed: {e}");
                    continue;
                }
            };

            let mut due = Vec::new();
            for lead in leads {
                match self.is_due(&rule, &lead, now) {
                    Ok(Some(info)) => due.push(info),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(rule_id = %rule.id, lead_id = %lead.id, "skipping lead: {e}");
                    }
                }
            }

            if !due.is_empty() {
                result.push(RuleDue { rule, leads: due });
            }
        }

        Ok(result)
    }

    fn is_due(
        &self,
        rule: &FollowUpRule,
        lead: &Lead,
        now: DateTime<Utc>,
    ) -> Result<Option<LeadDueInfo>> {
        let elapsed_hours = lead.hours_in_stage(now);
        if elapsed_hours < rule.delay_hours {
            return Ok(None);
        }
        if self
            .store
            .has_ack(&rule.id, &lead.id, lead.stage_entered_at)?
        {
            return Ok(None);
        }
        Ok(Some(LeadDueInfo {
            lead_id: lead.id.clone(),
            display_name: lead.name.clone(),
            elapsed_hours,
        }))
    }

    /// Records that the rule's message was sent to the lead.
    ///
    /// The lead's `stage_entered_at` is read here, at acknowledgement time,
    /// never taken from the caller: if the lead changed stage since the due
    /// list was computed, the ack binds to the new entry instant and cannot
    /// suppress the rule for a stage entry it never covered.
    pub fn mark_sent(&self, rule_id: &str, lead_id: &str) -> Result<AckOutcome> {
        self.store.get_rule(rule_id)?;
        let lead = self.store.get_lead(lead_id)?;

        let inserted = self.store.insert_ack(&DispatchAck {
            rule_id: rule_id.to_string(),
            lead_id: lead_id.to_string(),
            stage_entered_at: lead.stage_entered_at,
            created_at: self.clock.now(),
        })?;

        Ok(if inserted {
            AckOutcome::Acknowledged
        } else {
            AckOutcome::AlreadyAcknowledged
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SystemClock};
    use crate::transition::TransitionEngine;
    use chrono::Duration;
    use funnel_core::stage::StageCatalog;
    use funnel_storage::SqliteStore;
    use pretty_assertions::assert_eq;

    fn rule_24h(id: &str) -> FollowUpRule {
        FollowUpRule {
            id: id.into(),
            message: "¿Seguimos en contacto?".into(),
            delay_hours: 24,
            active: true,
            stages: vec!["mensaje_conexion".into()],
            created_at: Utc::now(),
        }
    }

    fn lead_in_stage_since(store: &SqliteStore, id: &str, stage: &str, entered: DateTime<Utc>) {
        let mut lead = Lead::new(id, "Ada Lovelace", stage, entered);
        lead.stage_entered_at = entered;
        store.create_lead(&lead).unwrap();
    }

    #[test]
    fn due_respects_delay_and_reports_elapsed() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_rule(&rule_24h("fr-1")).unwrap();

        let t0 = Utc::now();
        lead_in_stage_since(&store, "ld-1", "mensaje_conexion", t0);

        let clock = SystemClock;
        let scheduler = FollowUpScheduler::new(&store, &clock);

        // 23 hours in: not due yet.
        assert!(scheduler
            .due_followups(t0 + Duration::hours(23))
            .unwrap()
            .is_empty());

        // 25 hours in: due, with whole-hour elapsed annotation.
        let due = scheduler.due_followups(t0 + Duration::hours(25)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].rule.id, "fr-1");
        assert_eq!(
            due[0].leads,
            vec![LeadDueInfo {
                lead_id: "ld-1".into(),
                display_name: "Ada Lovelace".into(),
                elapsed_hours: 25,
            }]
        );
    }

    #[test]
    fn inactive_rules_and_other_stages_ignored() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut inactive = rule_24h("fr-1");
        inactive.active = false;
        store.create_rule(&inactive).unwrap();
        store.create_rule(&rule_24h("fr-2")).unwrap();

        let t0 = Utc::now();
        lead_in_stage_since(&store, "ld-1", "propuesta_enviada", t0);

        let clock = SystemClock;
        let scheduler = FollowUpScheduler::new(&store, &clock);
        // Lead is ancient but in a stage no active rule covers.
        assert!(scheduler
            .due_followups(t0 + Duration::hours(100))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn mark_sent_suppresses_current_entry_only() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_rule(&rule_24h("fr-1")).unwrap();

        let t0 = Utc::now();
        lead_in_stage_since(&store, "ld-1", "mensaje_conexion", t0);

        let clock = SystemClock;
        let scheduler = FollowUpScheduler::new(&store, &clock);

        assert_eq!(
            scheduler.mark_sent("fr-1", "ld-1").unwrap(),
            AckOutcome::Acknowledged
        );
        // Operator double-click: same live key, not an error.
        assert_eq!(
            scheduler.mark_sent("fr-1", "ld-1").unwrap(),
            AckOutcome::AlreadyAcknowledged
        );

        assert!(scheduler
            .due_followups(t0 + Duration::hours(26))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reentry_makes_old_ack_irrelevant() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_rule(&rule_24h("fr-1")).unwrap();
        let catalog = StageCatalog::default();

        let t0 = Utc::now() - Duration::hours(60);
        lead_in_stage_since(&store, "ld-1", "mensaje_conexion", t0);

        let clock = SystemClock;
        let scheduler = FollowUpScheduler::new(&store, &clock);
        scheduler.mark_sent("fr-1", "ld-1").unwrap();
        assert!(scheduler
            .due_followups(t0 + Duration::hours(26))
            .unwrap()
            .is_empty());

        // Leave the stage and come back at T0+30h.
        let reentry_clock = FixedClock(t0 + Duration::hours(30));
        let engine = TransitionEngine::new(&store, &catalog, &reentry_clock);
        engine.transition("ld-1", "respuesta_recibida", None).unwrap();
        engine.transition("ld-1", "mensaje_conexion", None).unwrap();

        // At T0+55h the lead has 25 fresh hours in the stage; the old ack
        // is keyed to a dead instant and no longer suppresses the rule.
        let due = scheduler.due_followups(t0 + Duration::hours(55)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].leads[0].lead_id, "ld-1");
        assert_eq!(due[0].leads[0].elapsed_hours, 25);
    }

    #[test]
    fn mark_sent_uses_post_change_timestamp() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_rule(&rule_24h("fr-1")).unwrap();
        let catalog = StageCatalog::default();

        let t0 = Utc::now() - Duration::hours(30);
        lead_in_stage_since(&store, "ld-1", "mensaje_conexion", t0);

        // Stage changes between the due computation and the ack: the lead
        // re-enters the stage with a fresh timestamp.
        let clock = SystemClock;
        let engine = TransitionEngine::new(&store, &catalog, &clock);
        engine.transition("ld-1", "respuesta_recibida", None).unwrap();
        engine.transition("ld-1", "mensaje_conexion", None).unwrap();

        let scheduler = FollowUpScheduler::new(&store, &clock);
        scheduler.mark_sent("fr-1", "ld-1").unwrap();

        // The ack is bound to the post-change instant, not the stale t0.
        let lead = store.get_lead("ld-1").unwrap();
        assert!(store
            .has_ack("fr-1", "ld-1", lead.stage_entered_at)
            .unwrap());
        assert!(!store.has_ack("fr-1", "ld-1", lead.created_at).unwrap());
    }

    #[test]
    fn missing_rule_or_lead_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let clock = SystemClock;
        let scheduler = FollowUpScheduler::new(&store, &clock);

        assert!(scheduler.mark_sent("fr-404", "ld-1").unwrap_err().is_not_found());

        store.create_rule(&rule_24h("fr-1")).unwrap();
        assert!(scheduler.mark_sent("fr-1", "ld-404").unwrap_err().is_not_found());
    }
}
