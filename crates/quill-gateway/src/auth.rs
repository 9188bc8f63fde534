// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the gateway.
//!
//! Two independent schemes guard the two inbound surfaces:
//! 1. Bearer token for the internal completion callback
//!    (`Authorization: Bearer <token>`).
//! 2. Provider webhook signatures for the SMS path (`X-Twilio-Signature`:
//!    base64 HMAC-SHA1 over the full URL plus the alphabetically-sorted
//!    concatenated POST params).
//!
//! When no token is configured, all callback requests are rejected
//! (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Authentication configuration for the internal callback route.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects everything.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware validating the shared bearer secret.
///
/// If no token is configured, all requests are rejected (fail-closed).
pub async fn bearer_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref expected_token) = auth.bearer_token else {
        tracing::error!("internal callback has no bearer token configured -- rejecting request");
        return Err(StatusCode::FORBIDDEN);
    };

    let provided = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected_token => Ok(next.run(request).await),
        _ => Err(StatusCode::FORBIDDEN),
    }
}

/// Compute the provider signature for a webhook request.
///
/// The signed payload is the full request URL followed by every POST
/// parameter's name and value, concatenated in alphabetical key order.
pub fn sign_webhook(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut payload = String::from(url);
    for (key, value) in sorted {
        payload.push_str(key);
        payload.push_str(value);
    }

    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Validate a webhook signature against the signing token.
pub fn validate_webhook(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    let expected = sign_webhook(auth_token, url, params);
    // Same-length comparison; signatures are short and not secret, but
    // avoid trivially leaking the prefix length.
    expected.len() == signature.len()
        && expected
            .bytes()
            .zip(signature.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> Vec<(String, String)> {
        vec![
            ("From".to_string(), "+15551230001".to_string()),
            ("Body".to_string(), "hello".to_string()),
            ("MessageSid".to_string(), "SM123".to_string()),
        ]
    }

    #[test]
    fn sign_is_deterministic_and_order_insensitive() {
        let url = "https://quill.chat/sms/inbound";
        let mut reversed = sample_params();
        reversed.reverse();

        let a = sign_webhook("token", url, &sample_params());
        let b = sign_webhook("token", url, &reversed);
        assert_eq!(a, b, "param order must not affect the signature");
    }

    #[test]
    fn valid_signature_passes() {
        let url = "https://quill.chat/sms/inbound";
        let signature = sign_webhook("token", url, &sample_params());
        assert!(validate_webhook("token", url, &sample_params(), &signature));
    }

    #[test]
    fn tampered_body_fails() {
        let url = "https://quill.chat/sms/inbound";
        let signature = sign_webhook("token", url, &sample_params());

        let mut tampered = sample_params();
        tampered[1].1 = "goodbye".to_string();
        assert!(!validate_webhook("token", url, &tampered, &signature));
    }

    #[test]
    fn wrong_token_fails() {
        let url = "https://quill.chat/sms/inbound";
        let signature = sign_webhook("token", url, &sample_params());
        assert!(!validate_webhook("other-token", url, &sample_params(), &signature));
    }

    #[test]
    fn wrong_url_fails() {
        let signature =
            sign_webhook("token", "https://quill.chat/sms/inbound", &sample_params());
        assert!(!validate_webhook(
            "token",
            "https://evil.example.com/sms/inbound",
            &sample_params(),
            &signature
        ));
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            bearer_token: Some("secret-token".to_string()),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }
}
