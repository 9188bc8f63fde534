// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decodes the provider's form-encoded webhook body into a typed
//! parameter set.
//!
//! The provider posts a flat urlencoded form. Media attachments arrive
//! as `NumMedia` plus indexed `MediaUrl0..N` keys, which are collected
//! into a vector here so nothing downstream touches raw key names.

use quill_core::QuillError;

/// Typed view of one inbound SMS webhook request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundSms {
    /// Sender number (E.164).
    pub from: String,
    /// Recipient number (our number, E.164).
    pub to: String,
    /// Message text.
    pub body: String,
    /// Provider message id.
    pub message_sid: String,
    /// Attached media URLs, in index order.
    pub media_urls: Vec<String>,
}

impl InboundSms {
    /// Decodes a urlencoded webhook body.
    ///
    /// Unknown keys are ignored; `From` and `Body` are required for the
    /// request to be processable.
    pub fn from_form_body(body: &str) -> Result<(Self, Vec<(String, String)>), QuillError> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(body).map_err(|e| QuillError::Sms {
                message: "failed to parse inbound webhook body".to_string(),
                source: Some(Box::new(e)),
            })?;

        let mut params = InboundSms::default();
        let mut media: Vec<(usize, String)> = Vec::new();

        for (key, value) in &pairs {
            match key.as_str() {
                "From" => params.from = value.clone(),
                "To" => params.to = value.clone(),
                "Body" => params.body = value.clone(),
                "MessageSid" => params.message_sid = value.clone(),
                _ => {
                    if let Some(index) = key.strip_prefix("MediaUrl")
                        && let Ok(index) = index.parse::<usize>()
                    {
                        media.push((index, value.clone()));
                    }
                }
            }
        }

        media.sort_by_key(|(index, _)| *index);
        params.media_urls = media.into_iter().map(|(_, url)| url).collect();

        if params.from.is_empty() {
            return Err(QuillError::Sms {
                message: "inbound webhook missing From parameter".to_string(),
                source: None,
            });
        }

        Ok((params, pairs))
    }
}
