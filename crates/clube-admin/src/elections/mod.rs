//! Board elections: listing and the ballot tally.

pub mod domain;
pub mod router;
pub mod service;
pub mod tally;

pub use domain::{
    Ballot, Candidate, Election, ElectionStatus, Slate, SlateResult, TallyResult,
};
pub use router::election_router;
pub use service::ElectionService;
pub use tally::tally_ballots;
