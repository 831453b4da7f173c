use crate::address::normalize_address;
use crate::error::{ProviderError, TransportError};
use crate::transport::{EventSink, SubscriptionId, Transport};
use crate::units::format_ether;
use idf_api_types::{ChainId, TransportKind, WalletAddress};
use idf_chain_registry::add_chain_parameter;
use idf_storage::{HintStore, NoopHintStore};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Outcome of a successful account request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub kind: TransportKind,
    pub account: WalletAddress,
    pub chain_id: u64,
}

/// Uniform wallet contract over whichever transports the host registered.
pub struct ProviderAdapter {
    transports: HashMap<TransportKind, Rc<dyn Transport>>,
    active: RefCell<Option<Rc<dyn Transport>>>,
    hints: Box<dyn HintStore>,
}

impl Default for ProviderAdapter {
    fn default() -> Self {
        Self::new(Box::new(NoopHintStore))
    }
}

impl ProviderAdapter {
    pub fn new(hints: Box<dyn HintStore>) -> Self {
        Self {
            transports: HashMap::new(),
            active: RefCell::new(None),
            hints,
        }
    }

    pub fn register(&mut self, transport: Rc<dyn Transport>) {
        self.transports.insert(transport.kind(), transport);
    }

    pub fn with_transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.register(transport);
        self
    }

    pub fn has_transport(&self, kind: TransportKind) -> bool {
        self.transports.contains_key(&kind)
    }

    pub fn active_kind(&self) -> Option<TransportKind> {
        self.active.borrow().as_ref().map(|t| t.kind())
    }

    fn active(&self) -> Option<Rc<dyn Transport>> {
        self.active.borrow().clone()
    }

    pub async fn connect(&self, kind: TransportKind) -> Result<Connection, ProviderError> {
        let transport = self
            .transports
            .get(&kind)
            .cloned()
            .ok_or(ProviderError::NoProviderFound(kind))?;

        let accounts = transport.request_accounts().await.map_err(|e| {
            if e.is_user_rejected() {
                ProviderError::UserRejected
            } else {
                ProviderError::ConnectionError(e.to_string())
            }
        })?;
        let first = accounts
            .first()
            .ok_or_else(|| ProviderError::ConnectionError("wallet returned no accounts".into()))?;
        let account = WalletAddress(normalize_address(first));

        let chain_id = transport
            .chain_id()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        *self.active.borrow_mut() = Some(transport);
        if let Err(err) = self.hints.save_hint(kind) {
            tracing::warn!(error = %err, "failed to persist reconnect hint");
        }

        tracing::info!(transport = %kind, account = %account, chain_id, "wallet connected");
        Ok(Connection {
            kind,
            account,
            chain_id,
        })
    }

    /// Forgets the active transport. The reconnect hint is left alone.
    pub fn release(&self) {
        self.active.borrow_mut().take();
    }

    /// Native balance as an ether decimal string; `"0"` on any failure.
    pub async fn get_balance(&self, address: &WalletAddress) -> String {
        let Some(transport) = self.active() else {
            return "0".to_owned();
        };
        match transport.get_balance(&address.0).await {
            Ok(raw) => format_ether(&raw),
            Err(err) => {
                tracing::warn!(address = %address, error = %err, "balance lookup failed");
                "0".to_owned()
            }
        }
    }

    pub async fn resolve_display_name(&self, address: &WalletAddress) -> Option<String> {
        let transport = self.active()?;
        match transport.lookup_address(&address.0).await {
            Ok(name) => name.filter(|n| !n.trim().is_empty()),
            Err(err) => {
                tracing::warn!(address = %address, error = %err, "name lookup failed");
                None
            }
        }
    }

    pub async fn sign_message(
        &self,
        address: &WalletAddress,
        message: &str,
    ) -> Result<String, ProviderError> {
        let transport = self
            .active()
            .ok_or_else(|| ProviderError::SigningError("no wallet connected".into()))?;
        transport
            .personal_sign(message, &address.0)
            .await
            .map_err(|e| {
                if e.is_user_rejected() {
                    ProviderError::SigningRejected
                } else {
                    ProviderError::SigningError(e.to_string())
                }
            })
    }

    /// Switches the wallet's network. A wallet that does not know the chain
    /// gets the registry entry added, then one more switch attempt.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let transport = self
            .active()
            .ok_or_else(|| ProviderError::ChainSwitchError("no wallet connected".into()))?;
        let target = ChainId(chain_id);

        match transport.switch_chain(target).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_unrecognized_chain() => {
                let param = add_chain_parameter(chain_id).ok_or_else(|| {
                    ProviderError::ChainSwitchError(format!("chain {chain_id} is not supported"))
                })?;
                tracing::info!(chain_id, chain_name = %param.chain_name, "adding chain to wallet");
                transport.add_chain(&param).await.map_err(chain_switch_error)?;
                transport.switch_chain(target).await.map_err(chain_switch_error)
            }
            Err(err) => Err(chain_switch_error(err)),
        }
    }

    pub fn subscribe(&self, sink: EventSink) -> Option<SubscriptionId> {
        let transport = self.active()?;
        match transport.subscribe(sink) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(error = %err, "event subscription failed");
                None
            }
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(transport) = self.active() {
            transport.unsubscribe(id);
        }
    }

    pub fn reconnect_hint(&self) -> Option<TransportKind> {
        match self.hints.load_hint() {
            Ok(hint) => hint,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read reconnect hint");
                None
            }
        }
    }

    pub fn clear_reconnect_hint(&self) {
        if let Err(err) = self.hints.clear_hint() {
            tracing::warn!(error = %err, "failed to clear reconnect hint");
        }
    }
}

fn chain_switch_error(err: TransportError) -> ProviderError {
    ProviderError::ChainSwitchError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::USER_REJECTED;
    use crate::testing::ScriptedTransport;
    use idf_storage::InMemoryHintStore;

    const ALICE: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    fn adapter_with(transport: ScriptedTransport) -> (ProviderAdapter, Rc<ScriptedTransport>) {
        let transport = Rc::new(transport);
        let adapter = ProviderAdapter::new(Box::new(InMemoryHintStore::default()))
            .with_transport(transport.clone());
        (adapter, transport)
    }

    #[tokio::test]
    async fn connect_returns_first_account_and_saves_hint() {
        let (adapter, _) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected)
                .with_accounts(&["0xABC...123", ALICE])
                .on_chain(1),
        );

        let conn = adapter.connect(TransportKind::Injected).await.expect("connect");
        assert_eq!(conn.account.0, "0xABC...123");
        assert_eq!(conn.chain_id, 1);
        assert_eq!(adapter.active_kind(), Some(TransportKind::Injected));
        assert_eq!(adapter.reconnect_hint(), Some(TransportKind::Injected));
    }

    #[tokio::test]
    async fn connect_checksums_account() {
        let (adapter, _) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected).with_accounts(&[ALICE]),
        );
        let conn = adapter.connect(TransportKind::Injected).await.expect("connect");
        assert_eq!(conn.account.0, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[tokio::test]
    async fn missing_transport_is_no_provider_found() {
        let (adapter, _) = adapter_with(ScriptedTransport::new(TransportKind::Injected));
        let err = adapter
            .connect(TransportKind::RemoteSigner)
            .await
            .expect_err("no remote signer registered");
        assert_eq!(err, ProviderError::NoProviderFound(TransportKind::RemoteSigner));
        assert_eq!(adapter.reconnect_hint(), None);
    }

    #[tokio::test]
    async fn rejection_and_empty_accounts_are_classified() {
        let (adapter, transport) = adapter_with(ScriptedTransport::new(TransportKind::Injected));
        transport.fail_accounts(TransportError::rpc(USER_REJECTED, "User denied"));
        assert_eq!(
            adapter.connect(TransportKind::Injected).await,
            Err(ProviderError::UserRejected)
        );

        transport.set_accounts(&[]);
        assert!(matches!(
            adapter.connect(TransportKind::Injected).await,
            Err(ProviderError::ConnectionError(_))
        ));
        assert_eq!(adapter.active_kind(), None);
    }

    #[tokio::test]
    async fn balance_is_formatted_and_failures_become_zero() {
        let (adapter, transport) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected)
                .with_accounts(&[ALICE])
                .with_balance(ALICE, "0x1bc16d674ec80000"),
        );
        let addr = WalletAddress(ALICE.to_owned());
        assert_eq!(adapter.get_balance(&addr).await, "0", "not connected yet");

        adapter.connect(TransportKind::Injected).await.expect("connect");
        assert_eq!(adapter.get_balance(&addr).await, "2.0");

        transport.fail_balance(TransportError::Other("rpc down".into()));
        assert_eq!(adapter.get_balance(&addr).await, "0");
    }

    #[tokio::test]
    async fn display_name_is_best_effort() {
        let (adapter, transport) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected)
                .with_accounts(&[ALICE])
                .with_name(ALICE, "alice.eth"),
        );
        adapter.connect(TransportKind::Injected).await.expect("connect");
        let addr = WalletAddress(ALICE.to_owned());
        assert_eq!(adapter.resolve_display_name(&addr).await.as_deref(), Some("alice.eth"));

        transport.fail_lookup(TransportError::Other("no resolver".into()));
        assert_eq!(adapter.resolve_display_name(&addr).await, None);
    }

    #[tokio::test]
    async fn signing_errors_are_classified() {
        let (adapter, transport) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected).with_accounts(&[ALICE]),
        );
        let addr = WalletAddress(ALICE.to_owned());
        assert!(matches!(
            adapter.sign_message(&addr, "hi").await,
            Err(ProviderError::SigningError(_))
        ));

        adapter.connect(TransportKind::Injected).await.expect("connect");
        let sig = adapter.sign_message(&addr, "hi").await.expect("signature");
        assert!(sig.starts_with("0x"));
        assert_eq!(transport.signed_messages(), vec!["hi".to_owned()]);

        transport.fail_sign(TransportError::rpc(USER_REJECTED, "denied"));
        assert_eq!(
            adapter.sign_message(&addr, "again").await,
            Err(ProviderError::SigningRejected)
        );
        transport.fail_sign(TransportError::Other("locked".into()));
        assert!(matches!(
            adapter.sign_message(&addr, "again").await,
            Err(ProviderError::SigningError(_))
        ));
    }

    #[tokio::test]
    async fn unrecognized_chain_is_added_then_switched() {
        let (adapter, transport) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected)
                .with_accounts(&[ALICE])
                .on_chain(1),
        );
        adapter.connect(TransportKind::Injected).await.expect("connect");

        adapter.switch_chain(137).await.expect("switch to polygon");
        let added = transport.added_chains();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].chain_id, "0x89");
        assert_eq!(added[0].chain_name, "Polygon Mainnet");
        assert_eq!(transport.current_chain(), 137);
        assert_eq!(transport.switch_attempts(), 2);
    }

    #[tokio::test]
    async fn unknown_chain_and_other_failures_are_switch_errors() {
        let (adapter, transport) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected)
                .with_accounts(&[ALICE])
                .on_chain(1),
        );
        adapter.connect(TransportKind::Injected).await.expect("connect");

        assert!(matches!(
            adapter.switch_chain(56).await,
            Err(ProviderError::ChainSwitchError(_))
        ));
        assert!(transport.added_chains().is_empty());

        transport.fail_switch(TransportError::rpc(USER_REJECTED, "denied"));
        assert!(matches!(
            adapter.switch_chain(42220).await,
            Err(ProviderError::ChainSwitchError(_))
        ));
        assert_eq!(transport.current_chain(), 1);
    }

    #[tokio::test]
    async fn release_and_clear_hint() {
        let (adapter, _) = adapter_with(
            ScriptedTransport::new(TransportKind::Injected).with_accounts(&[ALICE]),
        );
        adapter.connect(TransportKind::Injected).await.expect("connect");
        adapter.release();
        assert_eq!(adapter.active_kind(), None);
        assert_eq!(adapter.reconnect_hint(), Some(TransportKind::Injected));
        adapter.clear_reconnect_hint();
        assert_eq!(adapter.reconnect_hint(), None);
    }
}
