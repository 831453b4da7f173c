//! Client for the verification service.
//!
//! `base_url()` reads the `#apiBaseUrl` input and falls back to the page's
//! own origin.

use crate::dom;
use async_trait::async_trait;
use idf_api_types::{ErrorResponse, VerifyRequest, VerifyResponse};
use idf_verification::{ProofEndpoint, ProofVerdict, VerificationError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

pub const VERIFY_PATH: &str = "/api/verify";

pub fn base_url() -> String {
    if let Some(input) = dom::by_id_typed::<web_sys::HtmlInputElement>("apiBaseUrl") {
        let v = input.value().trim().to_string();
        if !v.is_empty() {
            return v.trim_end_matches('/').to_string();
        }
    }
    dom::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

fn js_err(context: &str, err: JsValue) -> VerificationError {
    VerificationError::Endpoint(format!("{context}: {err:?}"))
}

/// POSTs JSON and returns the status code and body text.
async fn post_json(url: &str, body: &str) -> Result<(u16, String), VerificationError> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);

    let headers = Headers::new().map_err(|e| js_err("headers", e))?;
    headers
        .set("Content-Type", "application/json")
        .map_err(|e| js_err("headers", e))?;
    opts.set_headers(&headers);
    opts.set_body(&JsValue::from_str(body));

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|e| js_err("request", e))?;
    let window =
        dom::window().ok_or_else(|| VerificationError::Endpoint("no window".to_owned()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_err("fetch error", e))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| VerificationError::Endpoint("response is not a Response".to_owned()))?;

    let text = JsFuture::from(resp.text().map_err(|e| js_err("body", e))?)
        .await
        .map_err(|e| js_err("text error", e))?;
    Ok((resp.status(), text.as_string().unwrap_or_default()))
}

/// Maps the service's answer onto a verdict. A 400 that carries a verdict
/// body is a rejected proof; anything else that is not a 200 is an endpoint
/// failure.
pub fn interpret(status: u16, body: &str) -> Result<ProofVerdict, VerificationError> {
    if let Ok(resp) = serde_json::from_str::<VerifyResponse>(body) {
        if status == 200 || status == 400 {
            return Ok(ProofVerdict {
                valid: status == 200 && resp.result,
                credential_subject: resp.credential_subject,
                details: resp.details,
            });
        }
    }
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| match e.error {
            Some(detail) => format!("{}: {detail}", e.message),
            None => e.message,
        })
        .unwrap_or_else(|_| body.to_owned());
    Err(VerificationError::Endpoint(format!("HTTP {status}: {message}")))
}

pub struct HttpProofEndpoint {
    url: String,
}

impl HttpProofEndpoint {
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}{VERIFY_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl ProofEndpoint for HttpProofEndpoint {
    async fn verify(&self, request: &VerifyRequest) -> Result<ProofVerdict, VerificationError> {
        let body = serde_json::to_string(request)
            .map_err(|e| VerificationError::Endpoint(e.to_string()))?;
        let (status, text) = post_json(&self.url, &body).await?;
        interpret(status, &text)
    }
}
