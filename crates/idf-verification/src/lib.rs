//! Identity verification gate. Two independent flows can each mark the user
//! verified; consumers only ever read the combined result.

use async_trait::async_trait;
use idf_api_types::{Notification, VerifyRequest};
use serde_json::Value;
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

pub mod policy;

pub use policy::{DisclosurePolicy, ProofRequest};

/// How long the mocked humanity check takes in the browser.
pub const DEFAULT_HUMANITY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationStatus {
    pub proof_verified: bool,
    pub humanity_verified: bool,
}

impl VerificationStatus {
    pub fn is_verified(&self) -> bool {
        self.proof_verified || self.humanity_verified
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error("verification endpoint error: {0}")]
    Endpoint(String),
}

impl VerificationError {
    pub fn notification(&self) -> Notification {
        Notification::destructive(
            "Verification Failed",
            "There was an error verifying your identity",
        )
    }
}

/// Answer from the verification backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProofVerdict {
    pub valid: bool,
    pub credential_subject: Option<Value>,
    pub details: Option<Value>,
}

/// Where proofs are checked. The browser posts to the verification service;
/// tests use fakes.
#[async_trait(?Send)]
pub trait ProofEndpoint {
    async fn verify(&self, request: &VerifyRequest) -> Result<ProofVerdict, VerificationError>;
}

/// Owns the flags. Hand out [`VerificationGate`]s to readers and flows to
/// the two verification widgets.
#[derive(Debug, Default)]
pub struct Verification {
    status: Rc<Cell<VerificationStatus>>,
}

impl Verification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self) -> VerificationGate {
        VerificationGate {
            status: self.status.clone(),
        }
    }

    pub fn proof_flow<E: ProofEndpoint>(&self, endpoint: E) -> ProofFlow<E> {
        ProofFlow {
            endpoint,
            status: self.status.clone(),
        }
    }

    pub fn humanity_flow(&self) -> HumanityFlow {
        HumanityFlow {
            status: self.status.clone(),
            pending: Cell::new(false),
        }
    }
}

/// Read-only view of the verification flags.
#[derive(Debug, Clone)]
pub struct VerificationGate {
    status: Rc<Cell<VerificationStatus>>,
}

impl VerificationGate {
    pub fn status(&self) -> VerificationStatus {
        self.status.get()
    }

    pub fn is_verified(&self) -> bool {
        self.status.get().is_verified()
    }
}

/// Zero-knowledge proof flow: the proving app hands back a proof, the
/// endpoint judges it.
pub struct ProofFlow<E> {
    endpoint: E,
    status: Rc<Cell<VerificationStatus>>,
}

impl<E: ProofEndpoint> ProofFlow<E> {
    /// Returns the disclosed credential subject on success. A rejected proof
    /// or an unreachable endpoint leaves the flags untouched.
    pub async fn submit(
        &self,
        user_id: Option<String>,
        proof: Value,
        public_signals: Vec<String>,
    ) -> Result<Option<Value>, VerificationError> {
        let request = VerifyRequest {
            user_id,
            proof: Some(proof),
            public_signals: Some(public_signals),
        };

        let verdict = match self.endpoint.verify(&request).await {
            Ok(verdict) => verdict,
            Err(VerificationError::Endpoint(reason)) => {
                tracing::warn!(reason = %reason, "proof endpoint unavailable");
                return Err(VerificationError::VerificationFailed(reason));
            }
            Err(err) => return Err(err),
        };

        if !verdict.valid {
            let details = verdict
                .details
                .map(|d| d.to_string())
                .unwrap_or_else(|| "proof rejected".to_owned());
            tracing::warn!(details = %details, "proof rejected");
            return Err(VerificationError::VerificationFailed(details));
        }

        let mut status = self.status.get();
        status.proof_verified = true;
        self.status.set(status);
        tracing::info!("proof verified");
        Ok(verdict.credential_subject)
    }

    pub fn success_notification() -> Notification {
        Notification::success(
            "Verification Successful",
            "You've been verified with your zkPassport",
        )
    }
}

/// Mocked humanity check: succeeds once the supplied delay elapses.
pub struct HumanityFlow {
    status: Rc<Cell<VerificationStatus>>,
    pending: Cell<bool>,
}

impl HumanityFlow {
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// `delay` is usually a timer for [`DEFAULT_HUMANITY_DELAY`]. Returns
    /// immediately when the flag is already set.
    pub async fn verify<D>(&self, delay: D) -> VerificationStatus
    where
        D: Future<Output = ()>,
    {
        if self.status.get().humanity_verified {
            return self.status.get();
        }
        self.pending.set(true);
        delay.await;
        self.pending.set(false);

        let mut status = self.status.get();
        status.humanity_verified = true;
        self.status.set(status);
        tracing::info!("humanity verified");
        status
    }

    pub fn success_notification() -> Notification {
        Notification::success("Verification Successful", "You've been verified with World ID")
    }
}
