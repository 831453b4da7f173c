use crate::error::TransportError;
use async_trait::async_trait;
use idf_api_types::{AddChainParameter, ChainId, TransportKind};
use tokio::sync::mpsc::UnboundedSender;

/// Notifications a wallet pushes without being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribedEvent {
    pub subscription: SubscriptionId,
    pub event: TransportEvent,
}

pub type EventSink = UnboundedSender<SubscribedEvent>;

pub type TransportResult<T> = Result<T, TransportError>;

/// One wallet connection mechanism. Implementations wrap an EIP-1193 style
/// request/response channel.
#[async_trait(?Send)]
pub trait Transport {
    fn kind(&self) -> TransportKind;

    /// `eth_requestAccounts`. May prompt the user.
    async fn request_accounts(&self) -> TransportResult<Vec<String>>;

    async fn chain_id(&self) -> TransportResult<u64>;

    /// `eth_getBalance` at `latest`, as a hex wei quantity.
    async fn get_balance(&self, address: &str) -> TransportResult<String>;

    /// Reverse name lookup. `Ok(None)` when the address has no name.
    async fn lookup_address(&self, address: &str) -> TransportResult<Option<String>>;

    async fn personal_sign(&self, message: &str, address: &str) -> TransportResult<String>;

    async fn switch_chain(&self, chain_id: ChainId) -> TransportResult<()>;

    async fn add_chain(&self, param: &AddChainParameter) -> TransportResult<()>;

    /// Starts forwarding events into `sink`, tagged with the returned id.
    fn subscribe(&self, sink: EventSink) -> TransportResult<SubscriptionId>;

    fn unsubscribe(&self, id: SubscriptionId);
}
