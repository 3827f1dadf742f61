//! Decision core for the club administration platform: front-desk access
//! eligibility, passage recording and election tallying over an injected
//! persistence gateway.

pub mod access;
pub mod config;
pub mod domain;
pub mod elections;
pub mod error;
pub mod finance;
pub mod gateway;
pub mod members;
pub mod messaging;
pub mod telemetry;

pub use error::{AppError, ClubError};
