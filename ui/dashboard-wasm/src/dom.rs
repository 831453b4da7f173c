//! DOM lookups and small mutation helpers.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement};

pub fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

/// Like [`by_id_typed`] but an error naming the missing element.
pub fn require<T: JsCast>(id: &str) -> Result<T, JsValue> {
    by_id_typed(id).ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

pub fn create_element(tag: &str) -> Option<Element> {
    document()?.create_element(tag).ok()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn clear(el: &Element) {
    el.set_inner_html("");
}

pub fn input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn select_value(el: &HtmlSelectElement) -> String {
    el.value()
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_hidden(el: &Element, hidden: bool) {
    toggle_class(el, "hidden", hidden);
}

pub fn set_disabled(el: &HtmlElement, disabled: bool) {
    if disabled {
        let _ = el.set_attribute("disabled", "");
    } else {
        let _ = el.remove_attribute("disabled");
    }
}

/// Every element the dashboard touches, resolved once at startup.
#[derive(Clone)]
pub struct Elements {
    // Wallet header
    pub connect_injected_btn: HtmlElement,
    pub connect_remote_btn: HtmlElement,
    pub disconnect_btn: HtmlElement,
    pub wallet_label: Element,
    pub wallet_network: Element,
    pub wallet_balance: Element,
    pub explorer_link: Element,
    pub chain_select: HtmlSelectElement,
    pub switch_chain_btn: HtmlElement,

    // Verification
    pub verify_badge: Element,
    pub proof_request: Element,
    pub proof_input: web_sys::HtmlTextAreaElement,
    pub submit_proof_btn: HtmlElement,
    pub humanity_btn: HtmlElement,

    // Swap
    pub swap_from: HtmlSelectElement,
    pub swap_to: HtmlSelectElement,
    pub swap_flip_btn: HtmlElement,
    pub swap_amount: HtmlInputElement,
    pub swap_fusion: HtmlInputElement,
    pub swap_output: Element,
    pub swap_rate: Element,
    pub swap_fee: Element,
    pub swap_btn: HtmlElement,

    // Assets
    pub assets_total: Element,
    pub assets_list: Element,

    // Messages
    pub inbox_list: Element,
    pub inbox_unread: Element,
    pub message_from: HtmlSelectElement,
    pub message_to: HtmlSelectElement,
    pub message_body: HtmlInputElement,
    pub send_message_btn: HtmlElement,

    pub toasts: Element,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            connect_injected_btn: require("connectInjected")?,
            connect_remote_btn: require("connectRemote")?,
            disconnect_btn: require("disconnectWallet")?,
            wallet_label: require("walletLabel")?,
            wallet_network: require("walletNetwork")?,
            wallet_balance: require("walletBalance")?,
            explorer_link: require("explorerLink")?,
            chain_select: require("chainSelect")?,
            switch_chain_btn: require("switchChain")?,

            verify_badge: require("verifyBadge")?,
            proof_request: require("proofRequest")?,
            proof_input: require("proofInput")?,
            submit_proof_btn: require("submitProof")?,
            humanity_btn: require("verifyHumanity")?,

            swap_from: require("swapFrom")?,
            swap_to: require("swapTo")?,
            swap_flip_btn: require("swapFlip")?,
            swap_amount: require("swapAmount")?,
            swap_fusion: require("swapFusion")?,
            swap_output: require("swapOutput")?,
            swap_rate: require("swapRate")?,
            swap_fee: require("swapFee")?,
            swap_btn: require("swapSubmit")?,

            assets_total: require("assetsTotal")?,
            assets_list: require("assetsList")?,

            inbox_list: require("inboxList")?,
            inbox_unread: require("inboxUnread")?,
            message_from: require("messageFrom")?,
            message_to: require("messageTo")?,
            message_body: require("messageBody")?,
            send_message_btn: require("sendMessage")?,

            toasts: require("toasts")?,
        })
    }
}
