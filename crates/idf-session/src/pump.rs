use crate::{Refresh, SessionHandle, Shared};
use futures_util::future::{Either, FutureExt, LocalBoxFuture, select};
use futures_util::stream::{FuturesUnordered, StreamExt};
use idf_provider::SubscribedEvent;
use std::pin::pin;
use std::rc::Weak;
use tokio::sync::mpsc::UnboundedReceiver;

type Pending = FuturesUnordered<LocalBoxFuture<'static, ()>>;

/// Single consumer of transport events. State changes are applied in
/// arrival order; the balance and name reads they trigger run alongside the
/// next events, so a slow wallet never holds back a disconnect.
pub struct EventPump {
    session: Weak<Shared>,
    events: UnboundedReceiver<SubscribedEvent>,
}

impl EventPump {
    pub(crate) fn new(session: Weak<Shared>, events: UnboundedReceiver<SubscribedEvent>) -> Self {
        Self { session, events }
    }

    fn handle(&self) -> Option<SessionHandle> {
        self.session.upgrade().map(SessionHandle::from_shared)
    }

    // Applies one event; false once the session is gone.
    fn apply(&self, event: SubscribedEvent, pending: &Pending) -> bool {
        let Some(handle) = self.handle() else {
            return false;
        };
        if let Some(refresh) = handle.apply_event(event) {
            pending.push(run_refresh(handle, refresh).boxed_local());
        }
        true
    }

    /// Runs until the session is dropped. Spawn it on the local executor.
    pub async fn run(mut self) {
        let mut pending = Pending::new();
        loop {
            let event = if pending.is_empty() {
                self.events.recv().await
            } else {
                // Refreshes go first so each one reaches the wallet before
                // a later event can void it.
                match select(pending.next(), pin!(self.events.recv())).await {
                    Either::Left(_) => continue,
                    Either::Right((event, _)) => event,
                }
            };
            let Some(event) = event else {
                break;
            };
            if !self.apply(event, &pending) {
                break;
            }
        }
        tracing::debug!("event pump stopped");
    }

    /// Applies whatever is already queued, waits for the refreshes that
    /// triggered, and returns how many events were applied.
    pub async fn drain(&mut self) -> usize {
        let mut pending = Pending::new();
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if !self.apply(event, &pending) {
                break;
            }
            applied += 1;
        }
        while pending.next().await.is_some() {}
        applied
    }
}

async fn run_refresh(handle: SessionHandle, refresh: Refresh) {
    handle.run_refresh(refresh).await;
}
