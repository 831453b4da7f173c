//! Wallet provider adapter: one contract over injected browser wallets and
//! remote signers.

pub mod adapter;
pub mod address;
pub mod deadline;
pub mod ens;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;
pub mod units;

pub use adapter::{Connection, ProviderAdapter};
pub use deadline::with_deadline;
pub use error::{ProviderError, TransportError, UNRECOGNIZED_CHAIN, USER_REJECTED};
pub use transport::{
    EventSink, SubscribedEvent, SubscriptionId, Transport, TransportEvent, TransportResult,
};
