//! The one wallet session per tab. All mutation goes through [`SessionHandle`];
//! transport events arrive through the [`EventPump`].

use futures_util::future::join;
use idf_api_types::{TransportKind, WalletAddress};
use idf_chain_registry::{chain_display_name, explorer_address_url};
use idf_provider::address::{normalize_address, same_address};
use idf_provider::{
    ProviderAdapter, ProviderError, SubscribedEvent, SubscriptionId, TransportEvent, with_deadline,
};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedSender};

mod pump;

pub use pump::EventPump;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub address: Option<WalletAddress>,
    pub display_name: Option<String>,
    pub chain_id: Option<u64>,
    pub connected: bool,
    pub native_balance: Option<String>,
    pub transport: Option<TransportKind>,
}

impl WalletSession {
    /// Resolved name if there is one, otherwise the truncated address.
    pub fn display_label(&self) -> Option<String> {
        self.display_name
            .clone()
            .or_else(|| self.address.as_ref().map(WalletAddress::truncated))
    }

    pub fn network_name(&self) -> String {
        chain_display_name(self.chain_id)
    }

    pub fn explorer_url(&self) -> Option<String> {
        let address = self.address.as_ref()?;
        Some(explorer_address_url(self.chain_id.unwrap_or(1), &address.0))
    }
}

#[derive(Default)]
struct SessionState {
    session: WalletSession,
    // Bumped on every address, chain or connection change.
    generation: u64,
    subscription: Option<SubscriptionId>,
}

type Watcher = Box<dyn Fn(&WalletSession)>;

/// Reads an event leaves owing once its state change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refresh {
    Balance,
    BalanceAndName,
}

pub(crate) struct Shared {
    adapter: ProviderAdapter,
    state: RefCell<SessionState>,
    events: UnboundedSender<SubscribedEvent>,
    watchers: RefCell<Vec<Watcher>>,
}

#[derive(Clone)]
pub struct SessionHandle {
    shared: Rc<Shared>,
}

impl SessionHandle {
    pub fn new(adapter: ProviderAdapter) -> (Self, EventPump) {
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Rc::new(Shared {
            adapter,
            state: RefCell::new(SessionState::default()),
            events,
            watchers: RefCell::new(Vec::new()),
        });
        let pump = EventPump::new(Rc::downgrade(&shared), rx);
        (Self { shared }, pump)
    }

    pub(crate) fn from_shared(shared: Rc<Shared>) -> Self {
        Self { shared }
    }

    pub fn adapter(&self) -> &ProviderAdapter {
        &self.shared.adapter
    }

    pub fn snapshot(&self) -> WalletSession {
        self.shared.state.borrow().session.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state.borrow().session.connected
    }

    /// Registers a callback run with a fresh snapshot after every change.
    /// Callbacks must not register further watchers.
    pub fn watch(&self, watcher: impl Fn(&WalletSession) + 'static) {
        self.shared.watchers.borrow_mut().push(Box::new(watcher));
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for watcher in self.shared.watchers.borrow().iter() {
            watcher(&snapshot);
        }
    }

    pub async fn connect(&self, kind: TransportKind) -> Result<WalletSession, ProviderError> {
        if self.is_connected() {
            self.disconnect();
        }
        let result = self.establish(kind).await;
        if result.is_err() {
            self.release_if_idle();
        }
        result
    }

    /// [`connect`](Self::connect) bounded by `deadline`; expiry is a
    /// `ConnectionError` and leaves the session cleared.
    pub async fn connect_within<D>(
        &self,
        kind: TransportKind,
        deadline: D,
    ) -> Result<WalletSession, ProviderError>
    where
        D: Future<Output = ()>,
    {
        if self.is_connected() {
            self.disconnect();
        }
        let result = with_deadline(self.establish(kind), deadline, "connect").await;
        if result.is_err() {
            self.release_if_idle();
        }
        result
    }

    async fn establish(&self, kind: TransportKind) -> Result<WalletSession, ProviderError> {
        let started = self.shared.state.borrow().generation;
        let adapter = &self.shared.adapter;

        let conn = adapter.connect(kind).await?;
        let (balance, name) = join(
            adapter.get_balance(&conn.account),
            adapter.resolve_display_name(&conn.account),
        )
        .await;

        let session = WalletSession {
            address: Some(conn.account),
            display_name: name,
            chain_id: Some(conn.chain_id),
            connected: true,
            native_balance: Some(balance),
            transport: Some(kind),
        };
        {
            let mut state = self.shared.state.borrow_mut();
            if state.generation != started {
                return Err(ProviderError::ConnectionError(
                    "connection superseded by a newer session change".into(),
                ));
            }
            state.session = session.clone();
            state.generation += 1;
        }

        let subscription = adapter.subscribe(self.shared.events.clone());
        self.shared.state.borrow_mut().subscription = subscription;
        self.notify();
        Ok(session)
    }

    // A connect that got past the wallet but never committed must not leave
    // the transport active or a hint behind.
    fn release_if_idle(&self) {
        if !self.is_connected() && self.shared.adapter.active_kind().is_some() {
            self.shared.adapter.release();
            self.shared.adapter.clear_reconnect_hint();
        }
    }

    /// Clears every field, drops the event subscription and forgets the
    /// reconnect hint. Safe to call repeatedly.
    pub fn disconnect(&self) {
        let (was_connected, subscription) = {
            let mut state = self.shared.state.borrow_mut();
            let was_connected = state.session.connected;
            state.session = WalletSession::default();
            state.generation += 1;
            (was_connected, state.subscription.take())
        };

        if let Some(id) = subscription {
            self.shared.adapter.unsubscribe(id);
        }
        self.shared.adapter.release();
        self.shared.adapter.clear_reconnect_hint();

        if was_connected {
            tracing::info!("wallet disconnected");
            self.notify();
        }
    }

    /// Silent reconnect from the stored hint. A failed attempt forgets the hint.
    pub async fn restore(&self) -> bool {
        let Some(kind) = self.shared.adapter.reconnect_hint() else {
            return false;
        };
        let result = self.connect(kind).await;
        self.finish_restore(kind, result)
    }

    pub async fn restore_within<D>(&self, deadline: D) -> bool
    where
        D: Future<Output = ()>,
    {
        let Some(kind) = self.shared.adapter.reconnect_hint() else {
            return false;
        };
        let result = self.connect_within(kind, deadline).await;
        self.finish_restore(kind, result)
    }

    fn finish_restore(
        &self,
        kind: TransportKind,
        result: Result<WalletSession, ProviderError>,
    ) -> bool {
        match result {
            Ok(_) => {
                tracing::info!(transport = %kind, "session restored");
                true
            }
            Err(err) => {
                tracing::warn!(transport = %kind, error = %err, "silent reconnect failed");
                self.shared.adapter.clear_reconnect_hint();
                false
            }
        }
    }

    fn capture(&self) -> Option<(u64, WalletAddress, Option<u64>)> {
        let state = self.shared.state.borrow();
        if !state.session.connected {
            return None;
        }
        let address = state.session.address.clone()?;
        Some((state.generation, address, state.session.chain_id))
    }

    /// Refetches the native balance. The result is dropped if the address,
    /// chain or connection changed while the request was in flight.
    pub async fn refresh_balance(&self) {
        let Some((generation, address, chain_id)) = self.capture() else {
            return;
        };
        let balance = self.shared.adapter.get_balance(&address).await;

        let applied = {
            let mut state = self.shared.state.borrow_mut();
            let current = state.generation == generation
                && state.session.address.as_ref() == Some(&address)
                && state.session.chain_id == chain_id;
            if current {
                state.session.native_balance = Some(balance);
            }
            current
        };
        if applied {
            self.notify();
        } else {
            tracing::debug!(address = %address, "discarding stale balance result");
        }
    }

    /// Names depend on the address only, so a chain switch does not void them.
    pub async fn refresh_display_name(&self) {
        let Some((_, address, _)) = self.capture() else {
            return;
        };
        let name = self.shared.adapter.resolve_display_name(&address).await;

        let applied = {
            let mut state = self.shared.state.borrow_mut();
            let current =
                state.session.connected && state.session.address.as_ref() == Some(&address);
            if current {
                state.session.display_name = name;
            }
            current
        };
        if applied {
            self.notify();
        } else {
            tracing::debug!(address = %address, "discarding stale name result");
        }
    }

    /// Applies `event` and waits for the refreshes it triggers.
    pub async fn handle_event(&self, event: SubscribedEvent) {
        if let Some(refresh) = self.apply_event(event) {
            self.run_refresh(refresh).await;
        }
    }

    /// The synchronous half of an event: updates the session and reports
    /// which reads it still owes.
    pub(crate) fn apply_event(&self, event: SubscribedEvent) -> Option<Refresh> {
        let live = {
            let state = self.shared.state.borrow();
            state.session.connected && state.subscription == Some(event.subscription)
        };
        if !live {
            tracing::debug!(event = ?event.event, "ignoring event for inactive subscription");
            return None;
        }

        match event.event {
            TransportEvent::AccountsChanged(accounts) => self.apply_accounts(&accounts),
            TransportEvent::ChainChanged(chain_id) => self.apply_chain(chain_id),
            TransportEvent::Disconnected => {
                tracing::info!("wallet reported disconnect");
                self.disconnect();
                None
            }
        }
    }

    pub(crate) async fn run_refresh(&self, refresh: Refresh) {
        match refresh {
            Refresh::Balance => self.refresh_balance().await,
            Refresh::BalanceAndName => {
                join(self.refresh_balance(), self.refresh_display_name()).await;
            }
        }
    }

    fn apply_accounts(&self, accounts: &[String]) -> Option<Refresh> {
        let Some(first) = accounts.first() else {
            self.disconnect();
            return None;
        };
        let next = WalletAddress(normalize_address(first));

        let changed = {
            let mut state = self.shared.state.borrow_mut();
            let same = state
                .session
                .address
                .as_ref()
                .is_some_and(|current| same_address(&current.0, &next.0));
            if !state.session.connected || same {
                false
            } else {
                state.session.address = Some(next.clone());
                state.session.display_name = None;
                state.session.native_balance = None;
                state.generation += 1;
                true
            }
        };
        if !changed {
            return None;
        }

        tracing::info!(account = %next, "account changed");
        self.notify();
        Some(Refresh::BalanceAndName)
    }

    fn apply_chain(&self, chain_id: u64) -> Option<Refresh> {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            if state.session.connected && state.session.chain_id != Some(chain_id) {
                state.session.chain_id = Some(chain_id);
                state.generation += 1;
                true
            } else {
                false
            }
        };
        if !changed {
            return None;
        }

        tracing::info!(chain_id, network = %chain_display_name(Some(chain_id)), "chain changed");
        self.notify();
        Some(Refresh::Balance)
    }

    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        if !self.is_connected() {
            return Err(ProviderError::ChainSwitchError("no wallet connected".into()));
        }
        self.shared.adapter.switch_chain(chain_id).await?;
        if let Some(refresh) = self.apply_chain(chain_id) {
            self.run_refresh(refresh).await;
        }
        Ok(())
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        let address = self
            .shared
            .state
            .borrow()
            .session
            .address
            .clone()
            .ok_or_else(|| ProviderError::SigningError("no wallet connected".into()))?;
        self.shared.adapter.sign_message(&address, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idf_provider::testing::ScriptedTransport;
    use idf_provider::{TransportError, USER_REJECTED};
    use idf_storage::InMemoryHintStore;
    use std::cell::Cell;
    use std::time::Duration;

    const ALICE: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    const ALICE_CHECKSUM: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const BOB: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
    const BOB_CHECKSUM: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const ONE_ETH: &str = "0xde0b6b3a7640000";
    const TWO_ETH: &str = "0x1bc16d674ec80000";

    fn setup_with_hints(
        transport: ScriptedTransport,
        hints: InMemoryHintStore,
    ) -> (SessionHandle, EventPump, Rc<ScriptedTransport>) {
        let transport = Rc::new(transport);
        let adapter = ProviderAdapter::new(Box::new(hints)).with_transport(transport.clone());
        let (handle, pump) = SessionHandle::new(adapter);
        (handle, pump, transport)
    }

    fn setup(transport: ScriptedTransport) -> (SessionHandle, EventPump, Rc<ScriptedTransport>) {
        setup_with_hints(transport, InMemoryHintStore::default())
    }

    fn alice_wallet() -> ScriptedTransport {
        ScriptedTransport::new(TransportKind::Injected)
            .with_accounts(&[ALICE])
            .on_chain(1)
            .with_balance(ALICE, ONE_ETH)
            .with_balance(BOB, TWO_ETH)
            .with_name(BOB, "bob.eth")
    }

    #[tokio::test]
    async fn connect_populates_every_field() {
        let (handle, _pump, transport) = setup(
            ScriptedTransport::new(TransportKind::Injected)
                .with_accounts(&["0xABC...123"])
                .on_chain(1),
        );

        let session = handle.connect(TransportKind::Injected).await.expect("connect");
        assert!(session.connected);
        assert_eq!(session.address, Some(WalletAddress("0xABC...123".into())));
        assert_eq!(session.chain_id, Some(1));
        assert_eq!(session.native_balance.as_deref(), Some("0.0"));
        assert_eq!(session.transport, Some(TransportKind::Injected));
        assert_eq!(handle.snapshot(), session);
        assert_eq!(transport.subscriber_count(), 1);
        assert_eq!(handle.adapter().reconnect_hint(), Some(TransportKind::Injected));
    }

    #[tokio::test]
    async fn failed_connect_leaves_session_cleared() {
        let (handle, _pump, transport) = setup(alice_wallet());
        transport.fail_accounts(TransportError::rpc(USER_REJECTED, "User rejected"));

        let err = handle
            .connect(TransportKind::Injected)
            .await
            .expect_err("rejected");
        assert_eq!(err, ProviderError::UserRejected);
        assert_eq!(handle.snapshot(), WalletSession::default());
        assert_eq!(transport.subscriber_count(), 0);
        assert_eq!(handle.adapter().active_kind(), None);
    }

    #[tokio::test]
    async fn missing_transport_surfaces_no_provider_found() {
        let (handle, _pump, _) = setup(alice_wallet());
        let err = handle
            .connect(TransportKind::RemoteSigner)
            .await
            .expect_err("no remote signer");
        assert_eq!(err, ProviderError::NoProviderFound(TransportKind::RemoteSigner));
        assert!(!handle.is_connected());
    }

    #[tokio::test]
    async fn disconnect_clears_everything_and_is_idempotent() {
        let (handle, _pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");

        handle.disconnect();
        handle.disconnect();

        assert_eq!(handle.snapshot(), WalletSession::default());
        assert_eq!(transport.subscriber_count(), 0);
        assert_eq!(handle.adapter().reconnect_hint(), None);
        assert_eq!(handle.adapter().active_kind(), None);
    }

    #[tokio::test]
    async fn watchers_never_see_connected_without_address() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        let violations = Rc::new(Cell::new(0));
        let seen = Rc::new(Cell::new(0));
        {
            let violations = violations.clone();
            let seen = seen.clone();
            handle.watch(move |session| {
                seen.set(seen.get() + 1);
                if session.connected && session.address.is_none() {
                    violations.set(violations.get() + 1);
                }
            });
        }

        handle.connect(TransportKind::Injected).await.expect("connect");
        transport.emit(TransportEvent::AccountsChanged(vec![BOB.into()]));
        transport.emit(TransportEvent::ChainChanged(137));
        pump.drain().await;
        handle.disconnect();

        assert!(seen.get() >= 4);
        assert_eq!(violations.get(), 0);
    }

    #[tokio::test]
    async fn account_change_updates_address_balance_and_name() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");
        assert_eq!(handle.snapshot().native_balance.as_deref(), Some("1.0"));

        transport.emit(TransportEvent::AccountsChanged(vec![BOB.into()]));
        assert_eq!(pump.drain().await, 1);

        let session = handle.snapshot();
        assert_eq!(session.address, Some(WalletAddress(BOB_CHECKSUM.into())));
        assert_eq!(session.native_balance.as_deref(), Some("2.0"));
        assert_eq!(session.display_name.as_deref(), Some("bob.eth"));
        assert_eq!(session.display_label().as_deref(), Some("bob.eth"));
    }

    #[tokio::test]
    async fn same_account_event_is_a_no_op() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");
        let calls = transport.balance_calls();

        transport.emit(TransportEvent::AccountsChanged(vec![ALICE_CHECKSUM.into()]));
        pump.drain().await;

        assert_eq!(transport.balance_calls(), calls);
        assert_eq!(handle.snapshot().address, Some(WalletAddress(ALICE_CHECKSUM.into())));
    }

    #[tokio::test]
    async fn empty_account_list_disconnects() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");

        transport.emit(TransportEvent::AccountsChanged(Vec::new()));
        pump.drain().await;

        assert_eq!(handle.snapshot(), WalletSession::default());
        assert_eq!(handle.adapter().reconnect_hint(), None);
    }

    #[tokio::test]
    async fn transport_disconnect_clears_session() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");

        transport.emit(TransportEvent::Disconnected);
        pump.drain().await;

        assert!(!handle.is_connected());
        assert_eq!(transport.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn account_change_after_disconnect_is_ignored() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");

        // Both queued before the pump runs: order decides the outcome.
        transport.emit(TransportEvent::Disconnected);
        transport.emit(TransportEvent::AccountsChanged(vec![BOB.into()]));
        assert_eq!(pump.drain().await, 2);
        assert_eq!(handle.snapshot(), WalletSession::default());

        handle
            .handle_event(SubscribedEvent {
                subscription: SubscriptionId(1),
                event: TransportEvent::AccountsChanged(vec![BOB.into()]),
            })
            .await;
        assert_eq!(handle.snapshot(), WalletSession::default());
    }

    #[tokio::test]
    async fn events_from_superseded_subscription_are_ignored() {
        let (handle, _pump, _transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("first connect");
        handle.disconnect();
        handle.connect(TransportKind::Injected).await.expect("second connect");

        handle
            .handle_event(SubscribedEvent {
                subscription: SubscriptionId(1),
                event: TransportEvent::ChainChanged(137),
            })
            .await;
        assert_eq!(handle.snapshot().chain_id, Some(1));

        handle
            .handle_event(SubscribedEvent {
                subscription: SubscriptionId(2),
                event: TransportEvent::ChainChanged(137),
            })
            .await;
        assert_eq!(handle.snapshot().chain_id, Some(137));
    }

    #[tokio::test]
    async fn chain_change_refreshes_balance() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");
        let calls = transport.balance_calls();
        transport.set_balance(ALICE, TWO_ETH);

        transport.emit(TransportEvent::ChainChanged(42220));
        pump.drain().await;

        let session = handle.snapshot();
        assert_eq!(session.chain_id, Some(42220));
        assert_eq!(session.network_name(), "Celo");
        assert_eq!(session.native_balance.as_deref(), Some("2.0"));
        assert_eq!(transport.balance_calls(), calls + 1);
    }

    #[tokio::test]
    async fn stale_balance_for_previous_account_is_discarded() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");
        transport.set_balance(ALICE, "0x3");
        let gate = transport.hold_next_balance();

        let switch_account = async {
            transport.emit(TransportEvent::AccountsChanged(vec![BOB.into()]));
            pump.drain().await;
            let _ = gate.send(());
        };
        tokio::join!(handle.refresh_balance(), switch_account);

        let session = handle.snapshot();
        assert_eq!(session.address, Some(WalletAddress(BOB_CHECKSUM.into())));
        assert_eq!(session.native_balance.as_deref(), Some("2.0"));
    }

    #[tokio::test]
    async fn refresh_in_flight_during_disconnect_is_discarded() {
        let (handle, _pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");
        let gate = transport.hold_next_balance();
        let name_gate = transport.hold_next_lookup();

        let disconnect = async {
            handle.disconnect();
            let _ = gate.send(());
            let _ = name_gate.send(());
        };
        tokio::join!(handle.refresh_balance(), handle.refresh_display_name(), disconnect);

        assert_eq!(handle.snapshot(), WalletSession::default());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_is_not_queued_behind_a_stalled_balance_read() {
        let (handle, pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");
        let calls = transport.balance_calls();
        let gate = transport.hold_next_balance();

        transport.emit(TransportEvent::AccountsChanged(vec![BOB.into()]));
        transport.emit(TransportEvent::Disconnected);
        let observe = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            (handle.snapshot(), gate.is_closed())
        };
        let (session, read_dropped) = tokio::select! {
            _ = pump.run() => panic!("pump stopped while the session is alive"),
            seen = observe => seen,
        };

        assert!(!read_dropped, "balance read should still be in flight");
        assert_eq!(transport.balance_calls(), calls + 1);
        assert_eq!(session, WalletSession::default());
        assert_eq!(transport.subscriber_count(), 0);
        assert_eq!(handle.adapter().reconnect_hint(), None);
    }

    #[tokio::test]
    async fn switch_chain_adds_unknown_chain_then_updates_session() {
        let (handle, mut pump, transport) = setup(alice_wallet());
        handle.connect(TransportKind::Injected).await.expect("connect");

        handle.switch_chain(137).await.expect("switch");
        pump.drain().await;

        assert_eq!(handle.snapshot().chain_id, Some(137));
        assert_eq!(transport.added_chains()[0].chain_name, "Polygon Mainnet");
    }

    #[tokio::test]
    async fn switch_chain_requires_connection() {
        let (handle, _pump, _) = setup(alice_wallet());
        assert!(matches!(
            handle.switch_chain(137).await,
            Err(ProviderError::ChainSwitchError(_))
        ));
    }

    #[tokio::test]
    async fn sign_message_uses_session_address() {
        let (handle, _pump, transport) = setup(alice_wallet());
        assert!(matches!(
            handle.sign_message("hello").await,
            Err(ProviderError::SigningError(_))
        ));

        handle.connect(TransportKind::Injected).await.expect("connect");
        handle.sign_message("hello").await.expect("signature");
        assert_eq!(transport.signed_messages(), vec!["hello".to_owned()]);
    }

    #[tokio::test]
    async fn restore_reconnects_from_hint() {
        let (handle, _pump, _) = setup_with_hints(
            alice_wallet(),
            InMemoryHintStore::with_hint(TransportKind::Injected),
        );
        assert!(handle.restore().await);
        assert_eq!(
            handle.snapshot().address,
            Some(WalletAddress(ALICE_CHECKSUM.into()))
        );
    }

    #[tokio::test]
    async fn failed_restore_forgets_hint() {
        let (handle, _pump, transport) = setup_with_hints(
            alice_wallet(),
            InMemoryHintStore::with_hint(TransportKind::Injected),
        );
        transport.fail_accounts(TransportError::rpc(4100, "Unauthorized"));

        assert!(!handle.restore().await);
        assert_eq!(handle.adapter().reconnect_hint(), None);
        assert!(!handle.restore().await);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_within_deadline_expiry_is_connection_error() {
        let (handle, _pump, transport) = setup(alice_wallet());
        let _gate = transport.hold_next_balance();

        let err = handle
            .connect_within(
                TransportKind::Injected,
                tokio::time::sleep(Duration::from_secs(5)),
            )
            .await
            .expect_err("deadline");
        assert!(matches!(err, ProviderError::ConnectionError(_)));
        assert_eq!(handle.snapshot(), WalletSession::default());
        assert_eq!(handle.adapter().active_kind(), None);
    }
}
