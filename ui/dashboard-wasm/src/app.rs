//! Dashboard state and the actions the UI triggers.
//!
//! One `App` per page, shared as `Rc<App>`. Every `RefCell` borrow is
//! released before the next await.

use crate::api::HttpProofEndpoint;
use crate::dom::{self, Elements};
use crate::{render, toast};
use gloo_timers::future::TimeoutFuture;
use idf_api_types::{Notification, TransportKind};
use idf_provider::ProviderError;
use idf_session::{SessionHandle, WalletSession};
use idf_simulation::SimulationError;
use idf_simulation::assets::simulate_portfolio;
use idf_simulation::messages::Inbox;
use idf_simulation::swap::{QuoteView, SwapForm, Swapper};
use idf_verification::{
    DEFAULT_HUMANITY_DELAY, DisclosurePolicy, HumanityFlow, ProofFlow, ProofRequest, Verification,
};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::time::Duration;

/// Silent reconnect gives up after this long.
pub const RESTORE_TIMEOUT: Duration = Duration::from_secs(10);

/// What the proving app hands back, pasted or scanned into the page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofSubmission {
    pub proof: Value,
    pub public_signals: Vec<String>,
}

fn millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

pub struct App {
    pub els: Elements,
    pub session: SessionHandle,
    verification: Verification,
    proof: ProofFlow<HttpProofEndpoint>,
    humanity: HumanityFlow,
    request: ProofRequest,
    swap: RefCell<SwapForm>,
    quote: RefCell<Option<QuoteView>>,
    inbox: RefCell<Inbox>,
    last_balance: RefCell<Option<Option<String>>>,
}

impl App {
    pub fn new(els: Elements, session: SessionHandle, api_base: &str) -> Self {
        let verification = Verification::new();
        let endpoint = HttpProofEndpoint::new(api_base);
        let request = ProofRequest::new(&DisclosurePolicy::default(), endpoint.url());
        let proof = verification.proof_flow(endpoint);
        let humanity = verification.humanity_flow();
        let swap = RefCell::new(SwapForm::new(verification.gate()));
        let inbox = RefCell::new(Inbox::seeded("you", &mut rand::thread_rng()));
        Self {
            els,
            session,
            verification,
            proof,
            humanity,
            request,
            swap,
            quote: RefCell::new(None),
            inbox,
            last_balance: RefCell::new(None),
        }
    }

    pub fn notify(&self, notification: &Notification) {
        toast::show(&self.els.toasts, notification);
    }

    pub fn render_all(&self) {
        self.on_session_changed(&self.session.snapshot());
        self.render_verification();
        dom::set_text(&self.els.proof_request, &self.request.to_json());
        render::inbox(&self.els, &self.inbox.borrow());
        let swap = self.swap.borrow();
        self.els.swap_from.set_value(swap.from.symbol);
        self.els.swap_to.set_value(swap.to.symbol);
        self.els.swap_fusion.set_checked(swap.fusion_plus);
    }

    fn render_verification(&self) {
        render::verification(
            &self.els,
            self.verification.gate().status(),
            self.humanity.is_pending(),
        );
    }

    /// Session watcher. Assets are only re-simulated when the balance moves.
    pub fn on_session_changed(&self, session: &WalletSession) {
        render::session(&self.els, session);

        let balance = session.native_balance.clone();
        let changed = self.last_balance.borrow().as_ref() != Some(&balance);
        if changed {
            let networks = simulate_portfolio(balance.as_deref(), &mut rand::thread_rng());
            render::assets(&self.els, &networks);
            *self.last_balance.borrow_mut() = Some(balance);
        }
    }

    pub async fn connect(&self, kind: TransportKind) {
        match self.session.connect(kind).await {
            Ok(session) => {
                let label = session.display_label().unwrap_or_default();
                *self.inbox.borrow_mut() = Inbox::seeded(&label, &mut rand::thread_rng());
                render::inbox(&self.els, &self.inbox.borrow());
                self.notify(&Notification::success(
                    "Wallet Connected",
                    format!("Connected to {label}"),
                ));
            }
            Err(err) => self.notify(&err.notification()),
        }
    }

    pub async fn restore(&self) {
        let deadline = TimeoutFuture::new(millis(RESTORE_TIMEOUT));
        if self.session.restore_within(deadline).await {
            let label = self.session.snapshot().display_label().unwrap_or_default();
            *self.inbox.borrow_mut() = Inbox::seeded(&label, &mut rand::thread_rng());
            render::inbox(&self.els, &self.inbox.borrow());
        }
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
        self.notify(&Notification::info(
            "Wallet Disconnected",
            "Your wallet has been disconnected",
        ));
    }

    pub async fn switch_chain(&self) {
        let Ok(chain_id) = dom::select_value(&self.els.chain_select).parse::<u64>() else {
            return;
        };
        match self.session.switch_chain(chain_id).await {
            Ok(()) => self.notify(&Notification::success(
                "Network Switched",
                format!("Switched to {}", self.session.snapshot().network_name()),
            )),
            Err(err) => self.notify(&err.notification()),
        }
    }

    pub async fn submit_proof(&self) {
        let raw = self.els.proof_input.value();
        let submission: ProofSubmission = match serde_json::from_str(raw.trim()) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(error = %err, "proof payload is not valid JSON");
                self.notify(&Notification::destructive(
                    "Verification Failed",
                    "The proof payload could not be read",
                ));
                return;
            }
        };

        let result = self
            .proof
            .submit(
                Some(self.request.user_id.clone()),
                submission.proof,
                submission.public_signals,
            )
            .await;
        match result {
            Ok(_) => self.notify(&ProofFlow::<HttpProofEndpoint>::success_notification()),
            Err(err) => self.notify(&err.notification()),
        }
        self.render_verification();
        self.update_quote();
    }

    pub async fn verify_humanity(&self) {
        let status = self.verification.gate().status();
        if status.humanity_verified || self.humanity.is_pending() {
            return;
        }
        render::verification(&self.els, status, true);
        let delay = TimeoutFuture::new(millis(DEFAULT_HUMANITY_DELAY));
        self.humanity.verify(delay).await;
        self.render_verification();
        self.update_quote();
        self.notify(&HumanityFlow::success_notification());
    }

    pub fn select_tokens(&self) {
        let from = dom::select_value(&self.els.swap_from);
        let to = dom::select_value(&self.els.swap_to);
        if let Err(err) = self.swap.borrow_mut().select(&from, &to) {
            tracing::warn!(error = %err, "token selection rejected");
        }
        self.update_quote();
    }

    pub fn flip_tokens(&self) {
        {
            let mut swap = self.swap.borrow_mut();
            swap.flip();
            self.els.swap_from.set_value(swap.from.symbol);
            self.els.swap_to.set_value(swap.to.symbol);
        }
        self.update_quote();
    }

    pub fn toggle_fusion(&self) {
        self.swap.borrow_mut().fusion_plus = self.els.swap_fusion.checked();
        self.update_quote();
    }

    pub fn update_quote(&self) {
        let amount = dom::input_value(&self.els.swap_amount);
        let quote = self.swap.borrow().quote(&amount, &mut rand::thread_rng());
        let quote = match quote {
            Ok(quote) => quote,
            Err(SimulationError::NotVerified) => None,
            Err(err) => {
                tracing::debug!(error = %err, "no quote for input");
                None
            }
        };
        render::swap_quote(&self.els, quote.as_ref());
        *self.quote.borrow_mut() = quote;
    }

    pub fn complete_swap(&self) {
        let session = self.session.snapshot();
        let Some(address) = session.address.as_ref().filter(|_| session.connected) else {
            let err = ProviderError::ConnectionError("no wallet connected".into());
            self.notify(&err.notification());
            return;
        };
        let Some(received) = self
            .quote
            .borrow()
            .as_ref()
            .map(|q| q.quote.to_amount_display.clone())
        else {
            return;
        };

        let amount = dom::input_value(&self.els.swap_amount);
        let swapper = Swapper {
            address,
            display_name: session.display_name.as_deref(),
            chain_id: session.chain_id,
        };
        let receipt = self.swap.borrow().complete(
            &amount,
            &received,
            swapper,
            js_sys::Date::now() as u64,
            &mut rand::thread_rng(),
        );
        match receipt {
            Ok(receipt) => {
                tracing::info!(hash = %receipt.message_hash, "swap announced");
                self.notify(&receipt.notification);
                self.els.swap_amount.set_value("");
                self.update_quote();
            }
            Err(SimulationError::NotVerified) => self.notify(&Notification::destructive(
                "Verification Required",
                "Verify your identity before swapping",
            )),
            Err(err) => self.notify(&Notification::destructive("Swap Failed", err.to_string())),
        }
    }

    pub fn mark_read(&self, id: u32) {
        if self.inbox.borrow_mut().mark_as_read(id) {
            render::inbox(&self.els, &self.inbox.borrow());
        }
    }

    pub fn send_message(&self) {
        let parse = |el: &web_sys::HtmlSelectElement| dom::select_value(el).parse::<u64>().ok();
        let (Some(from), Some(to)) = (parse(&self.els.message_from), parse(&self.els.message_to))
        else {
            return;
        };
        let body = dom::input_value(&self.els.message_body);
        let sent = self
            .inbox
            .borrow_mut()
            .send_message(from, to, &body, &mut rand::thread_rng());
        match sent {
            Ok(hash) => {
                self.els.message_body.set_value("");
                render::inbox(&self.els, &self.inbox.borrow());
                self.notify(&Notification::success(
                    "Message Sent",
                    format!("Message hash {}", hash.get(..10).unwrap_or(&hash)),
                ));
            }
            Err(err) => self.notify(&Notification::destructive(
                "Message Not Sent",
                err.to_string(),
            )),
        }
    }
}
