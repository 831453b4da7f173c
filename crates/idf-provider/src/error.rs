use idf_api_types::{Notification, TransportKind};
use thiserror::Error;

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193 "Unauthorized".
pub const UNAUTHORIZED: i64 = 4100;
/// EIP-1193 "Disconnected".
pub const DISCONNECTED: i64 = 4900;
/// MetaMask "Unrecognized chain ID" returned by `wallet_switchEthereumChain`.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Failure reported by a wallet transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("wallet transport unavailable: {0}")]
    Unavailable(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        TransportError::Rpc {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            TransportError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code() == Some(USER_REJECTED)
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(UNRECOGNIZED_CHAIN)
    }
}

/// Errors surfaced by the provider adapter to the triggering user action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no {0} wallet provider found")]
    NoProviderFound(TransportKind),

    #[error("user rejected the connection request")]
    UserRejected,

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("user rejected the signature request")]
    SigningRejected,

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("chain switch error: {0}")]
    ChainSwitchError(String),
}

impl ProviderError {
    pub fn notification(&self) -> Notification {
        match self {
            ProviderError::NoProviderFound(TransportKind::Injected) => Notification::destructive(
                "Wallet not found",
                "Please install a browser wallet extension",
            ),
            ProviderError::NoProviderFound(TransportKind::RemoteSigner) => {
                Notification::destructive(
                    "Wallet not found",
                    "Remote signer connections are not available",
                )
            }
            ProviderError::UserRejected => Notification::destructive(
                "Connection Rejected",
                "The connection request was declined in your wallet",
            ),
            ProviderError::ConnectionError(_) => Notification::destructive(
                "Connection Failed",
                "Failed to connect wallet. Please try again.",
            ),
            ProviderError::SigningRejected => Notification::destructive(
                "Signature Rejected",
                "The signature request was declined in your wallet",
            ),
            ProviderError::SigningError(_) => Notification::destructive(
                "Signing Failed",
                "Could not sign the message",
            ),
            ProviderError::ChainSwitchError(_) => Notification::destructive(
                "Failed to Switch Chain",
                "Could not switch to the requested chain",
            ),
        }
    }
}
