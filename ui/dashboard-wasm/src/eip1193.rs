//! `window.ethereum` as a [`Transport`].

use async_trait::async_trait;
use idf_api_types::{AddChainParameter, ChainId, TransportKind};
use idf_provider::ens;
use idf_provider::units::parse_quantity;
use idf_provider::{
    EventSink, SubscribedEvent, SubscriptionId, Transport, TransportError, TransportEvent,
    TransportResult,
};
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const MAINNET: u64 = 1;

type Listener = Closure<dyn FnMut(JsValue)>;

struct Subscription {
    id: SubscriptionId,
    listeners: Vec<(&'static str, Listener)>,
}

/// Detaches each listener through `remove`. One the wallet may still call,
/// because removal failed, goes to `leak` instead of being dropped.
fn detach<L, E: std::fmt::Debug>(
    listeners: Vec<(&'static str, L)>,
    remove: impl Fn(&'static str, &L) -> Result<(), E>,
    mut leak: impl FnMut(L),
) {
    for (name, listener) in listeners {
        if let Err(err) = remove(name, &listener) {
            tracing::warn!(event = name, error = ?err, "failed to remove wallet listener");
            leak(listener);
        }
    }
}

pub struct Eip1193Transport {
    ethereum: JsValue,
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

impl Eip1193Transport {
    /// `None` when the page has no injected provider.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self {
            ethereum,
            subscriptions: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        })
    }

    fn release(&self, listeners: Vec<(&'static str, Listener)>) {
        let Ok(remove) = self.method("removeListener") else {
            listeners.into_iter().for_each(|(_, l)| l.forget());
            return;
        };
        detach(
            listeners,
            |name, listener: &Listener| {
                let name = JsValue::from_str(name);
                remove
                    .call2(&self.ethereum, &name, listener.as_ref())
                    .map(|_| ())
            },
            Closure::forget,
        );
    }

    fn method(&self, name: &str) -> TransportResult<Function> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| TransportError::Unavailable(format!("ethereum.{name} is not a function")))
    }

    async fn request(&self, method: &str, params: Option<Array>) -> TransportResult<JsValue> {
        let args = Object::new();
        set(&args, "method", &JsValue::from_str(method))?;
        if let Some(params) = params {
            set(&args, "params", &params)?;
        }

        let returned = self.method("request")?.call1(&self.ethereum, &args).map_err(js_error)?;
        let promise = returned
            .dyn_into::<Promise>()
            .map_err(|_| TransportError::Other(format!("{method} did not return a promise")))?;
        JsFuture::from(promise).await.map_err(js_error)
    }

    async fn request_string(&self, method: &str, params: Option<Array>) -> TransportResult<String> {
        self.request(method, params)
            .await?
            .as_string()
            .ok_or_else(|| TransportError::Other(format!("{method} returned a non-string")))
    }

    async fn eth_call(&self, to: &str, data: &str) -> TransportResult<String> {
        let call = Object::new();
        set(&call, "to", &JsValue::from_str(to))?;
        set(&call, "data", &JsValue::from_str(data))?;
        let params = Array::of2(&call, &JsValue::from_str("latest"));
        self.request_string("eth_call", Some(params)).await
    }
}

fn set(target: &Object, key: &str, value: &JsValue) -> TransportResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

/// Provider errors are plain objects carrying `code` and `message`.
fn js_error(err: JsValue) -> TransportError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok();
    let message = field("message")
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match field("code").and_then(|c| c.as_f64()) {
        Some(code) => TransportError::rpc(code as i64, message),
        None => TransportError::Other(message),
    }
}

fn parse_chain(raw: &JsValue) -> Option<u64> {
    let text = raw.as_string().or_else(|| raw.as_f64().map(|n| (n as u64).to_string()))?;
    parse_quantity(&text).and_then(|v| u64::try_from(v).ok())
}

fn to_event(name: &str, payload: &JsValue) -> Option<TransportEvent> {
    match name {
        "accountsChanged" => {
            let accounts = Array::from(payload)
                .iter()
                .filter_map(|a| a.as_string())
                .collect();
            Some(TransportEvent::AccountsChanged(accounts))
        }
        "chainChanged" => parse_chain(payload).map(TransportEvent::ChainChanged),
        "disconnect" => Some(TransportEvent::Disconnected),
        _ => None,
    }
}

#[async_trait(?Send)]
impl Transport for Eip1193Transport {
    fn kind(&self) -> TransportKind {
        TransportKind::Injected
    }

    async fn request_accounts(&self) -> TransportResult<Vec<String>> {
        let accounts = self.request("eth_requestAccounts", None).await?;
        Ok(Array::from(&accounts)
            .iter()
            .filter_map(|a| a.as_string())
            .collect())
    }

    async fn chain_id(&self) -> TransportResult<u64> {
        let raw = self.request("eth_chainId", None).await?;
        parse_chain(&raw).ok_or_else(|| TransportError::Other("unparsable chain id".into()))
    }

    async fn get_balance(&self, address: &str) -> TransportResult<String> {
        let params = Array::of2(&JsValue::from_str(address), &JsValue::from_str("latest"));
        self.request_string("eth_getBalance", Some(params)).await
    }

    async fn lookup_address(&self, address: &str) -> TransportResult<Option<String>> {
        if self.chain_id().await? != MAINNET {
            return Ok(None);
        }
        let node = ens::reverse_node(address);
        let resolver = self
            .eth_call(ens::ENS_REGISTRY, &ens::resolver_calldata(&node))
            .await?;
        let Some(resolver) = ens::decode_address(&resolver) else {
            return Ok(None);
        };
        let name = self.eth_call(&resolver, &ens::name_calldata(&node)).await?;
        Ok(ens::decode_string(&name))
    }

    async fn personal_sign(&self, message: &str, address: &str) -> TransportResult<String> {
        let params = Array::of2(
            &JsValue::from_str(&format!("0x{}", hex::encode(message))),
            &JsValue::from_str(address),
        );
        self.request_string("personal_sign", Some(params)).await
    }

    async fn switch_chain(&self, chain_id: ChainId) -> TransportResult<()> {
        let param = Object::new();
        set(&param, "chainId", &JsValue::from_str(&chain_id.to_hex()))?;
        self.request("wallet_switchEthereumChain", Some(Array::of1(&param)))
            .await
            .map(|_| ())
    }

    async fn add_chain(&self, param: &AddChainParameter) -> TransportResult<()> {
        let value = param
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| TransportError::Other(e.to_string()))?;
        self.request("wallet_addEthereumChain", Some(Array::of1(&value)))
            .await
            .map(|_| ())
    }

    fn subscribe(&self, sink: EventSink) -> TransportResult<SubscriptionId> {
        let on = self.method("on")?;
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let mut listeners = Vec::new();
        for name in ["accountsChanged", "chainChanged", "disconnect"] {
            let sink = sink.clone();
            let listener: Listener = Closure::new(move |payload: JsValue| {
                let Some(event) = to_event(name, &payload) else {
                    tracing::warn!(event = name, "ignoring malformed wallet event");
                    return;
                };
                if sink.send(SubscribedEvent { subscription: id, event }).is_err() {
                    tracing::debug!(event = name, "session gone, wallet event dropped");
                }
            });
            let registered = on.call2(&self.ethereum, &JsValue::from_str(name), listener.as_ref());
            if let Err(err) = registered {
                // The wallet may hold the failed one too.
                listener.forget();
                self.release(listeners);
                return Err(js_error(err));
            }
            listeners.push((name, listener));
        }

        self.subscriptions
            .borrow_mut()
            .push(Subscription { id, listeners });
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let removed = {
            let mut subs = self.subscriptions.borrow_mut();
            let Some(pos) = subs.iter().position(|s| s.id == id) else {
                return;
            };
            subs.remove(pos)
        };
        self.release(removed.listeners);
    }
}
