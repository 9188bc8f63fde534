// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the XML reply document the SMS provider expects.

/// Escape the five XML-significant characters.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render a reply document.
///
/// `Some(text)` wraps the reply text in a `<Message>` element; `None`
/// renders an empty `<Response>`, which tells the provider not to send
/// anything (the reply, if any, goes out-of-band).
pub fn messaging_response(content: Option<&str>) -> String {
    match content {
        Some(text) => format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
            escape(text)
        ),
        None => {
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>".to_string()
        }
    }
}
