//! Front-desk access control.
//!
//! Decides whether a member or dependent may pass through a venue's access
//! point, and logs the passages that do happen. Evaluation never writes;
//! recording a passage never evaluates.

pub mod domain;
pub mod evaluator;
pub mod policy;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AccessPoint, AccessRecord, AccessRecordFilter, Direction, GateStatistics, PassageRequest,
    PersonKind, Venue,
};
pub use evaluator::AccessEvaluator;
pub use policy::{Decision, DenialReason};
pub use router::{access_router, EvaluateRequest};
pub use rules::{AccessRule, RuleOutcome};
pub use service::AccessService;
