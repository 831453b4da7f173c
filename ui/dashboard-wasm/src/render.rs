//! Pure view updates. Nothing here awaits or mutates app state.

use crate::dom::{self, Elements};
use idf_chain_registry::supported_chains;
use idf_session::WalletSession;
use idf_simulation::assets::{NetworkAssets, portfolio_total};
use idf_simulation::messages::Inbox;
use idf_simulation::swap::{QuoteView, TOKENS};
use idf_verification::VerificationStatus;
use web_sys::{Element, HtmlSelectElement};

fn append_option(select: &HtmlSelectElement, value: &str, label: &str) {
    if let Some(opt) = dom::create_element("option") {
        let _ = opt.set_attribute("value", value);
        dom::set_text(&opt, label);
        let _ = select.append_child(&opt);
    }
}

/// Fills the static selects: tokens and chains.
pub fn populate_selects(els: &Elements) {
    for select in [&els.swap_from, &els.swap_to] {
        dom::clear(select);
        for token in TOKENS {
            append_option(select, token.symbol, &format!("{} ({})", token.symbol, token.name));
        }
    }
    for select in [&els.chain_select, &els.message_from, &els.message_to] {
        dom::clear(select);
        for chain in supported_chains() {
            append_option(select, &chain.chain_id.to_string(), chain.name);
        }
    }
}

pub fn session(els: &Elements, session: &WalletSession) {
    dom::set_hidden(&els.connect_injected_btn, session.connected);
    dom::set_hidden(&els.connect_remote_btn, session.connected);
    dom::set_hidden(&els.disconnect_btn, !session.connected);
    dom::set_disabled(&els.switch_chain_btn, !session.connected);

    let label = session
        .display_label()
        .unwrap_or_else(|| "Not connected".to_owned());
    dom::set_text(&els.wallet_label, &label);

    if session.connected {
        dom::set_text(&els.wallet_network, &session.network_name());
        let balance = session.native_balance.as_deref().unwrap_or("0");
        dom::set_text(&els.wallet_balance, balance);
    } else {
        dom::set_text(&els.wallet_network, "");
        dom::set_text(&els.wallet_balance, "");
    }

    match session.explorer_url() {
        Some(url) => {
            let _ = els.explorer_link.set_attribute("href", &url);
            dom::set_hidden(&els.explorer_link, false);
        }
        None => dom::set_hidden(&els.explorer_link, true),
    }
    if let Some(chain_id) = session.chain_id {
        els.chain_select.set_value(&chain_id.to_string());
    }
}

pub fn verification(els: &Elements, status: VerificationStatus, humanity_pending: bool) {
    let text = match (status.proof_verified, status.humanity_verified) {
        (true, true) => "Verified (zkPassport + World ID)",
        (true, false) => "Verified (zkPassport)",
        (false, true) => "Verified (World ID)",
        (false, false) => "Not verified",
    };
    dom::set_text(&els.verify_badge, text);
    dom::toggle_class(&els.verify_badge, "verified", status.is_verified());

    dom::set_disabled(&els.submit_proof_btn, status.proof_verified);
    dom::set_disabled(&els.humanity_btn, status.humanity_verified || humanity_pending);
    if humanity_pending {
        dom::set_text(&els.humanity_btn, "Verifying...");
    } else if status.humanity_verified {
        dom::set_text(&els.humanity_btn, "World ID verified");
    } else {
        dom::set_text(&els.humanity_btn, "Verify with World ID");
    }

    dom::set_disabled(&els.swap_btn, !status.is_verified());
}

pub fn swap_quote(els: &Elements, quote: Option<&QuoteView>) {
    match quote {
        Some(view) => {
            dom::set_text(&els.swap_output, &view.quote.to_amount_display);
            dom::set_text(&els.swap_rate, &view.rate);
            dom::set_text(&els.swap_fee, view.fee);
        }
        None => {
            dom::set_text(&els.swap_output, "");
            dom::set_text(&els.swap_rate, "");
            dom::set_text(&els.swap_fee, "");
        }
    }
}

fn row(class: &str, cells: &[&str]) -> Option<Element> {
    let row = dom::create_element("div")?;
    dom::add_class(&row, class);
    for text in cells {
        let cell = dom::create_element("span")?;
        dom::set_text(&cell, text);
        row.append_child(&cell).ok()?;
    }
    Some(row)
}

pub fn assets(els: &Elements, networks: &[NetworkAssets]) {
    dom::set_text(&els.assets_total, &format!("${}", portfolio_total(networks)));
    dom::clear(&els.assets_list);
    for network in networks {
        if let Some(header) = row(
            "asset-network",
            &[network.network, format!("${}", network.total_value).as_str()],
        ) {
            let _ = els.assets_list.append_child(&header);
        }
        for asset in &network.assets {
            let change = format!("{:+.2}%", asset.change_24h);
            let value = format!("${}", asset.value);
            if let Some(line) = row(
                "asset",
                &[asset.symbol, asset.balance.as_str(), value.as_str(), change.as_str()],
            ) {
                let _ = els.assets_list.append_child(&line);
            }
        }
    }
}

pub fn inbox(els: &Elements, inbox: &Inbox) {
    dom::set_text(&els.inbox_unread, &inbox.unread_count().to_string());
    dom::clear(&els.inbox_list);
    for message in inbox.messages() {
        let Some(item) = row(
            "message",
            &[
                message.title.as_str(),
                message.description.as_str(),
                message.network.as_str(),
                message.time.as_str(),
            ],
        ) else {
            continue;
        };
        dom::toggle_class(&item, "unread", !message.read);
        let _ = item.set_attribute("data-message-id", &message.id.to_string());
        let _ = item.set_attribute("title", &message.message_hash);
        let _ = els.inbox_list.append_child(&item);
    }
}
