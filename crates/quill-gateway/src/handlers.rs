// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use quill_core::types::{
    now_iso, MessageRecord, MessageRole, UsageEvent, UsageMetric, UsageUnit, DEFAULT_THREAD,
};
use quill_core::QuillError;

use crate::auth::validate_webhook;
use crate::params::InboundSms;
use crate::server::GatewayState;
use crate::twiml;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// Callback body posted by the completion worker once generation is done.
#[derive(Debug, Deserialize)]
pub struct CompletionCallback {
    /// Outbox row correlating this callback to its dispatch.
    pub submission_id: String,
    /// User the conversation belongs to.
    pub user_id: String,
    /// Originating inbound message id.
    pub message_id: String,
    /// Phone number to deliver the reply to.
    pub number: String,
    /// Generated reply text.
    pub message: String,
    /// Tokens consumed by the completion, when the provider reported them.
    #[serde(default)]
    pub tokens: Option<i64>,
}

/// POST /sms/inbound
///
/// Validates the provider signature, decodes the form body, runs the
/// response coordinator, and answers with the XML reply document. Any
/// unclassified error is logged and converted to a bare 500; the
/// provider's own retry behavior is the backstop.
pub async fn post_inbound_sms(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let (params, pairs) = match InboundSms::from_form_body(&body) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "rejected malformed inbound webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "malformed webhook body".to_string(),
                }),
            )
                .into_response();
        }
    };

    if state.signature.enabled {
        let Some(ref auth_token) = state.signature.auth_token else {
            error!("signature validation enabled without a signing token -- rejecting");
            return signature_failure();
        };
        let url = format!("{}/sms/inbound", state.signature.public_url);
        let provided = headers
            .get("x-twilio-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !validate_webhook(auth_token, &url, &pairs, provided) {
            warn!(sender = %params.from, "rejected inbound webhook with invalid signature");
            return signature_failure();
        }
    }

    match state.coordinator.respond(&params.from, &params.body).await {
        Ok(reply) => {
            info!(
                sender = %params.from,
                replied = reply.is_some(),
                "inbound SMS handled"
            );
            xml_response(twiml::messaging_response(reply.as_deref()))
        }
        Err(e) => {
            error!(sender = %params.from, error = %e, "failed to handle inbound SMS");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn signature_failure() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            error: "invalid webhook signature".to_string(),
        }),
    )
        .into_response()
}

fn xml_response(body: String) -> Response {
    (
        StatusCode::OK,
        [("content-type", "text/xml")],
        body,
    )
        .into_response()
}

/// POST /internal/ai/completion
///
/// Persists the generated assistant message, records usage metrics, and
/// delivers the text to the recipient. The pending -> delivered outbox
/// transition runs first so a redelivered callback (at-least-once
/// delivery) can never double-persist or double-send.
pub async fn post_completion_callback(
    State(state): State<GatewayState>,
    Json(callback): Json<CompletionCallback>,
) -> Response {
    match state
        .store
        .mark_submission_delivered(&callback.submission_id)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            info!(
                submission_id = %callback.submission_id,
                "duplicate completion callback acknowledged"
            );
            return StatusCode::OK.into_response();
        }
        Err(QuillError::Precondition(message)) => {
            warn!(
                submission_id = %callback.submission_id,
                "completion callback for unknown submission"
            );
            return (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message }))
                .into_response();
        }
        Err(e) => return internal_error(e),
    }

    let assistant_msg = MessageRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: callback.user_id.clone(),
        role: MessageRole::Assistant,
        content: callback.message.clone(),
        thread_id: DEFAULT_THREAD.to_string(),
        created_at: now_iso(),
    };
    if let Err(e) = state.store.insert_message(&assistant_msg).await {
        return internal_error(e);
    }

    if let Err(e) = state
        .store
        .record_usage(&UsageMetric {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: callback.user_id.clone(),
            event: UsageEvent::Completion,
            event_id: Some(assistant_msg.id.clone()),
            unit: UsageUnit::Tokens,
            value: callback.tokens.unwrap_or(0),
            created_at: now_iso(),
        })
        .await
    {
        return internal_error(e);
    }

    if let Err(e) = state
        .sms
        .send(&callback.number, &callback.message, None)
        .await
    {
        return internal_error(e);
    }

    if let Err(e) = state
        .store
        .record_usage(&UsageMetric {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: callback.user_id.clone(),
            event: UsageEvent::Sms,
            event_id: Some(assistant_msg.id.clone()),
            unit: UsageUnit::Count,
            value: 1,
            created_at: now_iso(),
        })
        .await
    {
        return internal_error(e);
    }

    info!(
        user_id = %callback.user_id,
        submission_id = %callback.submission_id,
        "completion delivered"
    );
    StatusCode::OK.into_response()
}

fn internal_error(e: QuillError) -> Response {
    error!(error = %e, "completion callback failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal error".to_string(),
        }),
    )
        .into_response()
}

/// GET /health
///
/// Returns health status of the gateway.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
