//! Event binding. Async handlers are spawned with
//! `wasm_bindgen_futures::spawn_local`.

use crate::app::App;
use idf_api_types::TransportKind;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::EventTarget;

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(err) = target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()) {
        tracing::warn!(event, error = ?err, "failed to bind listener");
    }
    cb.forget();
}

/// Attach a sync handler: `on!(el, "click", app, |a| a.method())`.
macro_rules! on {
    ($target:expr, $event:literal, $app:expr, |$a:ident| $body:expr) => {{
        let $a = $app.clone();
        listen(&$target, $event, move |_| $body);
    }};
}

/// Attach an async handler: the body is a future run on the local executor.
macro_rules! on_async {
    ($target:expr, $event:literal, $app:expr, |$a:ident| $body:expr) => {{
        let app = $app.clone();
        listen(&$target, $event, move |_| {
            let $a = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $body.await;
            });
        });
    }};
}

pub fn bind_events(app: &Rc<App>) {
    let els = &app.els;

    // ── Wallet ──
    on_async!(els.connect_injected_btn, "click", app, |a| a.connect(TransportKind::Injected));
    on_async!(els.connect_remote_btn, "click", app, |a| a.connect(TransportKind::RemoteSigner));
    on!(els.disconnect_btn, "click", app, |a| a.disconnect());
    on_async!(els.switch_chain_btn, "click", app, |a| a.switch_chain());

    // ── Verification ──
    on_async!(els.submit_proof_btn, "click", app, |a| a.submit_proof());
    on_async!(els.humanity_btn, "click", app, |a| a.verify_humanity());

    // ── Swap ──
    on!(els.swap_from, "change", app, |a| a.select_tokens());
    on!(els.swap_to, "change", app, |a| a.select_tokens());
    on!(els.swap_flip_btn, "click", app, |a| a.flip_tokens());
    on!(els.swap_fusion, "change", app, |a| a.toggle_fusion());
    on!(els.swap_amount, "input", app, |a| a.update_quote());
    on!(els.swap_btn, "click", app, |a| a.complete_swap());

    // ── Messages ──
    on!(els.send_message_btn, "click", app, |a| a.send_message());
    {
        let app = app.clone();
        listen(&els.inbox_list, "click", move |event| {
            let id = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.closest("[data-message-id]").ok().flatten())
                .and_then(|el| el.get_attribute("data-message-id"))
                .and_then(|raw| raw.parse::<u32>().ok());
            if let Some(id) = id {
                app.mark_read(id);
            }
        });
    }
}
