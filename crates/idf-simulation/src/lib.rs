//! Simulated dashboard data: swap quotes, multi-chain portfolio and the
//! cross-chain message inbox. Every random draw goes through a caller-supplied
//! RNG so tests can seed it.

use thiserror::Error;

pub mod assets;
pub mod messages;
pub mod swap;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("identity verification required")]
    NotVerified,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("cannot swap a token for itself")]
    SameToken,

    #[error("message body is empty")]
    EmptyMessage,
}
