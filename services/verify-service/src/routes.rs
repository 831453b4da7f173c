use crate::backend::ProofBackend;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use idf_api_types::{ErrorResponse, VerifyRequest, VerifyResponse};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ProofBackend>,
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/verify", post(verify))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "verify-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "verify-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn error_response(status: StatusCode, message: &str, error: Option<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.to_owned(),
            error,
        }),
    )
        .into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    tracing::error!(error = %err, "proof verification errored");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error verifying proof",
        Some(err.to_string()),
    )
}

// `null`, `false`, `0` and `""` all count as an absent proof.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// `POST /api/verify`. Any JSON body is accepted; unparsable bodies are a
/// server-side failure rather than a client error.
async fn verify(State(state): State<AppState>, body: Bytes) -> Response {
    let request: VerifyRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => return internal_error(err),
    };

    let (proof, public_signals) = match (request.proof, request.public_signals) {
        (Some(proof), Some(signals)) if !is_falsy(&proof) => (proof, signals),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Proof and publicSignals are required",
                None,
            );
        }
    };

    let outcome = match state
        .backend
        .verify(request.user_id.as_deref(), &proof, &public_signals)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => return internal_error(err),
    };

    if outcome.is_valid {
        tracing::info!(user_id = ?request.user_id, "proof accepted");
        (
            StatusCode::OK,
            Json(VerifyResponse {
                status: "success".to_owned(),
                result: true,
                credential_subject: Some(outcome.credential_subject),
                message: None,
                details: None,
            }),
        )
            .into_response()
    } else {
        tracing::info!(user_id = ?request.user_id, details = %outcome.details, "proof rejected");
        (
            StatusCode::BAD_REQUEST,
            Json(VerifyResponse {
                status: "error".to_owned(),
                result: false,
                credential_subject: None,
                message: Some("Verification failed".to_owned()),
                details: Some(outcome.details),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StructuralGroth16Backend;
    use crate::backend::tests::{sample_proof, signals};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use idf_verification::DisclosurePolicy;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    fn app() -> Router {
        app_router(AppState {
            backend: Arc::new(StructuralGroth16Backend::new(DisclosurePolicy::default())),
        })
    }

    async fn post_verify(body: impl Into<Body>) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/verify")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        for body in [
            json!({}),
            json!({"proof": sample_proof()}),
            json!({"publicSignals": ["1"]}),
            json!({"proof": null, "publicSignals": ["1"]}),
            json!({"proof": "", "publicSignals": ["1"]}),
            json!({"proof": 0, "publicSignals": ["1"]}),
            json!({"proof": false, "publicSignals": ["1"]}),
        ] {
            let (status, json) = post_verify(body.to_string()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["message"], "Proof and publicSignals are required");
        }
    }

    #[tokio::test]
    async fn valid_proof_returns_credential_subject() {
        let body = json!({
            "userId": "user-42",
            "proof": sample_proof(),
            "publicSignals": signals("identifi-wallet-app", "25", "DEU"),
        });
        let (status, json) = post_verify(body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["result"], true);
        assert_eq!(json["credentialSubject"]["userId"], "user-42");
        assert_eq!(json["credentialSubject"]["nationality"], "DEU");
    }

    #[tokio::test]
    async fn policy_failure_returns_details() {
        let body = json!({
            "proof": sample_proof(),
            "publicSignals": signals("identifi-wallet-app", "25", "FRA"),
        });
        let (status, json) = post_verify(body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(json["result"], false);
        assert_eq!(json["message"], "Verification failed");
        assert_eq!(json["details"]["isValidNationality"], false);
        assert_eq!(json["details"]["isValidOlderThan"], true);
    }

    #[tokio::test]
    async fn malformed_proof_is_internal_error() {
        let body = json!({
            "proof": {"pi_a": "nope"},
            "publicSignals": signals("identifi-wallet-app", "25", "DEU"),
        });
        let (status, json) = post_verify(body.to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Error verifying proof");
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn unparsable_body_is_internal_error() {
        let (status, json) = post_verify("{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Error verifying proof");
    }
}
