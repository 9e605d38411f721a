//! Business logic for the funnel: stage transitions with compensating
//! writes, call and conversion workflows, and the follow-up scheduler.
//!
//! Everything here works against the [`funnel_storage::Storage`] trait and
//! an injectable [`Clock`], so the rules are testable without touching the
//! wall clock or a real database file.

pub mod clock;
pub mod error;
pub mod followup;
pub mod transition;
pub mod workflow;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{EngineError, Result};
pub use followup::{AckOutcome, FollowUpScheduler, LeadDueInfo, RuleDue};
pub use transition::{TransitionEngine, TransitionOutcome};
pub use workflow::{CallWorkflow, ConversionWorkflow};
