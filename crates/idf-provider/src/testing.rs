//! In-process wallet used by tests across the workspace.

use crate::address::same_address;
use crate::error::{TransportError, UNRECOGNIZED_CHAIN};
use crate::transport::{
    EventSink, SubscribedEvent, SubscriptionId, Transport, TransportEvent, TransportResult,
};
use async_trait::async_trait;
use idf_api_types::{AddChainParameter, ChainId, TransportKind};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;

/// Scripted wallet. Balances and names are keyed by lowercase address so
/// tests can tell results for different accounts apart.
pub struct ScriptedTransport {
    kind: TransportKind,
    accounts: RefCell<Result<Vec<String>, TransportError>>,
    chain: Cell<u64>,
    chain_error: RefCell<Option<TransportError>>,
    known_chains: RefCell<Vec<u64>>,
    balances: RefCell<HashMap<String, String>>,
    balance_error: RefCell<Option<TransportError>>,
    balance_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
    balance_calls: Cell<usize>,
    names: RefCell<HashMap<String, String>>,
    lookup_error: RefCell<Option<TransportError>>,
    lookup_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
    sign_error: RefCell<Option<TransportError>>,
    signed: RefCell<Vec<String>>,
    switch_error: RefCell<Option<TransportError>>,
    switch_attempts: Cell<usize>,
    added: RefCell<Vec<AddChainParameter>>,
    sinks: RefCell<Vec<(SubscriptionId, EventSink)>>,
    next_subscription: Cell<u64>,
}

impl ScriptedTransport {
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            accounts: RefCell::new(Ok(Vec::new())),
            chain: Cell::new(1),
            chain_error: RefCell::new(None),
            known_chains: RefCell::new(vec![1]),
            balances: RefCell::new(HashMap::new()),
            balance_error: RefCell::new(None),
            balance_gates: RefCell::new(VecDeque::new()),
            balance_calls: Cell::new(0),
            names: RefCell::new(HashMap::new()),
            lookup_error: RefCell::new(None),
            lookup_gates: RefCell::new(VecDeque::new()),
            sign_error: RefCell::new(None),
            signed: RefCell::new(Vec::new()),
            switch_error: RefCell::new(None),
            switch_attempts: Cell::new(0),
            added: RefCell::new(Vec::new()),
            sinks: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }
    }

    pub fn with_accounts(self, accounts: &[&str]) -> Self {
        self.set_accounts(accounts);
        self
    }

    pub fn on_chain(self, chain_id: u64) -> Self {
        self.chain.set(chain_id);
        self.known_chains.borrow_mut().push(chain_id);
        self
    }

    pub fn with_balance(self, address: &str, hex_wei: &str) -> Self {
        self.set_balance(address, hex_wei);
        self
    }

    pub fn with_name(self, address: &str, name: &str) -> Self {
        self.names
            .borrow_mut()
            .insert(address.to_ascii_lowercase(), name.to_owned());
        self
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        *self.accounts.borrow_mut() = Ok(accounts.iter().map(|a| (*a).to_owned()).collect());
    }

    pub fn fail_accounts(&self, err: TransportError) {
        *self.accounts.borrow_mut() = Err(err);
    }

    pub fn fail_chain_id(&self, err: TransportError) {
        *self.chain_error.borrow_mut() = Some(err);
    }

    pub fn set_balance(&self, address: &str, hex_wei: &str) {
        self.balances
            .borrow_mut()
            .insert(address.to_ascii_lowercase(), hex_wei.to_owned());
    }

    /// Every later balance request fails with `err`.
    pub fn fail_balance(&self, err: TransportError) {
        *self.balance_error.borrow_mut() = Some(err);
    }

    pub fn fail_lookup(&self, err: TransportError) {
        *self.lookup_error.borrow_mut() = Some(err);
    }

    /// The next balance request parks until the returned sender fires.
    pub fn hold_next_balance(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.balance_gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn hold_next_lookup(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lookup_gates.borrow_mut().push_back(rx);
        tx
    }

    /// The next signature request fails with `err`.
    pub fn fail_sign(&self, err: TransportError) {
        *self.sign_error.borrow_mut() = Some(err);
    }

    /// The next switch request fails with `err`.
    pub fn fail_switch(&self, err: TransportError) {
        *self.switch_error.borrow_mut() = Some(err);
    }

    pub fn current_chain(&self) -> u64 {
        self.chain.get()
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.get()
    }

    pub fn switch_attempts(&self) -> usize {
        self.switch_attempts.get()
    }

    pub fn added_chains(&self) -> Vec<AddChainParameter> {
        self.added.borrow().clone()
    }

    pub fn signed_messages(&self) -> Vec<String> {
        self.signed.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.borrow().len()
    }

    /// Pushes `event` to every live subscriber, as a wallet would.
    pub fn emit(&self, event: TransportEvent) {
        for (id, sink) in self.sinks.borrow().iter() {
            let _ = sink.send(SubscribedEvent {
                subscription: *id,
                event: event.clone(),
            });
        }
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn request_accounts(&self) -> TransportResult<Vec<String>> {
        self.accounts.borrow().clone()
    }

    async fn chain_id(&self) -> TransportResult<u64> {
        match self.chain_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(self.chain.get()),
        }
    }

    async fn get_balance(&self, address: &str) -> TransportResult<String> {
        self.balance_calls.set(self.balance_calls.get() + 1);
        let gate = self.balance_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.balance_error.borrow().clone() {
            return Err(err);
        }
        Ok(self
            .balances
            .borrow()
            .get(&address.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| "0x0".to_owned()))
    }

    async fn lookup_address(&self, address: &str) -> TransportResult<Option<String>> {
        let gate = self.lookup_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.lookup_error.borrow().clone() {
            return Err(err);
        }
        Ok(self
            .names
            .borrow()
            .iter()
            .find(|(addr, _)| same_address(addr, address))
            .map(|(_, name)| name.clone()))
    }

    async fn personal_sign(&self, message: &str, _address: &str) -> TransportResult<String> {
        if let Some(err) = self.sign_error.borrow_mut().take() {
            return Err(err);
        }
        self.signed.borrow_mut().push(message.to_owned());
        Ok(format!("0x{}", hex::encode(message.as_bytes())))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> TransportResult<()> {
        self.switch_attempts.set(self.switch_attempts.get() + 1);
        if let Some(err) = self.switch_error.borrow_mut().take() {
            return Err(err);
        }
        if !self.known_chains.borrow().contains(&chain_id.0) {
            return Err(TransportError::rpc(
                UNRECOGNIZED_CHAIN,
                format!("Unrecognized chain ID \"{}\"", chain_id.to_hex()),
            ));
        }
        self.chain.set(chain_id.0);
        self.emit(TransportEvent::ChainChanged(chain_id.0));
        Ok(())
    }

    async fn add_chain(&self, param: &AddChainParameter) -> TransportResult<()> {
        let id = param
            .chain_id
            .strip_prefix("0x")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .ok_or_else(|| TransportError::rpc(-32602, "invalid chainId"))?;
        self.known_chains.borrow_mut().push(id);
        self.added.borrow_mut().push(param.clone());
        Ok(())
    }

    fn subscribe(&self, sink: EventSink) -> TransportResult<SubscriptionId> {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.sinks.borrow_mut().push((id, sink));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.sinks.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}
