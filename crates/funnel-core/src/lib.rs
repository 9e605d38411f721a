//! Core types for the funnel pipeline tracker.
//!
//! This crate contains the domain model shared by the storage, engine, and
//! CLI crates: leads, calls, clients, follow-up rules, dispatch
//! acknowledgements, and the stage catalog.

pub mod ack;
pub mod call;
pub mod client;
pub mod idgen;
pub mod lead;
pub mod rule;
pub mod stage;
