//! HTTP endpoints: handshake, event delivery, account linking, health.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use secrecy::SecretString;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::bot::Bot;

use super::event::WebhookPayload;
use super::signature;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
    pub validation_token: String,
    pub app_secret: SecretString,
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// GET /webhook
///
/// Subscription handshake: echoes the challenge when the verify token
/// matches, 403 otherwise.
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let token_matches = params.verify_token.as_deref() == Some(state.validation_token.as_str());
    if params.mode.as_deref() == Some("subscribe") && token_matches {
        (StatusCode::OK, params.challenge.unwrap_or_default())
    } else {
        warn!("Webhook verification failed: mode or token mismatch");
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// POST /webhook
///
/// Event delivery. The signature is checked over the raw bytes before
/// any parsing: a bad signature is 403 and an undecodable body 400.
/// Accepted payloads are handed to the dialog engine and acknowledged
/// with 200.
async fn receive_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = headers
        .get("x-hub-signature")
        .and_then(|value| value.to_str().ok());
    if let Err(e) = signature::verify(&state.app_secret, header, &body) {
        warn!(error = %e, "Rejected webhook delivery");
        return StatusCode::FORBIDDEN;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Undecodable webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    state.bot.handle_payload(payload).await;
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct AuthorizeParams {
    account_linking_token: Option<String>,
    redirect_uri: Option<String>,
}

/// GET /authorize
///
/// Account-linking landing page. Issues a fresh authorization code and
/// links the user back to the platform redirect URI.
async fn authorize(Query(params): Query<AuthorizeParams>) -> Html<String> {
    let code = uuid::Uuid::new_v4();
    let token = params.account_linking_token.unwrap_or_default();
    let redirect = params
        .redirect_uri
        .map(|uri| format!("{uri}&authorization_code={code}"))
        .unwrap_or_default();

    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n<head><title>Account Linking</title></head>\n<body>\n\
         <h1>Link your account</h1>\n\
         <p>Linking token: {}</p>\n\
         <p><a href=\"{}\">Continue</a></p>\n\
         </body>\n</html>\n",
        escape_html(&token),
        escape_html(&redirect),
    ))
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "finder-bot"}))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Build the public HTTP surface.
pub fn webhook_routes(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(receive_events))
        .route("/authorize", get(authorize))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain token"), "plain token");
    }
}
