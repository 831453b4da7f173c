//! Identifi dashboard, browser front-end.
//!
//! Binds the wallet session, verification flows and the simulated swap,
//! asset and message widgets to the page.

pub mod api;
pub mod app;
pub mod dom;
pub mod eip1193;
pub mod events;
pub mod render;
pub mod storage;
pub mod toast;

use idf_provider::ProviderAdapter;
use idf_session::SessionHandle;
use std::rc::Rc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber_wasm::MakeConsoleWriter;
use wasm_bindgen::prelude::*;

/// WASM entry point, run when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_writer(MakeConsoleWriter::default().map_trace_level_to(tracing::Level::DEBUG))
        .without_time()
        .with_ansi(false)
        .init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;
    render::populate_selects(&els);

    // Only the injected wallet exists in the browser build; asking for a
    // remote signer surfaces "Wallet not found".
    let mut adapter = ProviderAdapter::new(Box::new(storage::LocalStorageHintStore));
    match eip1193::Eip1193Transport::detect() {
        Some(transport) => adapter.register(Rc::new(transport)),
        None => tracing::info!("no injected wallet on this page"),
    }

    let (session, pump) = SessionHandle::new(adapter);
    wasm_bindgen_futures::spawn_local(pump.run());

    let app = Rc::new(app::App::new(els, session, &api::base_url()));
    {
        let weak = Rc::downgrade(&app);
        app.session.watch(move |snapshot| {
            if let Some(app) = weak.upgrade() {
                app.on_session_changed(snapshot);
            }
        });
    }
    app.render_all();
    events::bind_events(&app);

    app.restore().await;
    Ok(())
}
