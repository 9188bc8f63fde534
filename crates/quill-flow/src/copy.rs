// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted reply strings and the small text helpers they rely on.
//!
//! Every user-visible failure path maps to one of these strings; raw
//! errors never reach the sender. Multi-line strings are normalized so
//! source indentation does not leak into outbound messages.

/// Trim each line and join with `\n`, so indented string literals render
/// cleanly over SMS.
pub fn normalize_multiline(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Title-case every whitespace-separated word.
pub fn to_title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Name <email>` identity for outgoing emails.
pub fn sender_identity(name: &str, email: &str) -> String {
    format!("{name} <{email}>")
}

// --- Command replies ---

pub fn help(agent: &str) -> String {
    normalize_multiline(&format!(
        "You can talk to {agent} using natural language, or use one of the following system commands:

        @about: Find out more about {agent}.
        @billing: View and modify your subscription details.
        @contact: Retrieve the contact card for {agent}.
        @help: Get information on how to use {agent}.
        @invite <CODE>: Get access to {agent} with an invite code.
        @support <MESSAGE>: Send a support request to our team."
    ))
}

pub fn about(agent: &str, url: &str) -> String {
    format!("Here's more info on {agent}: {url}")
}

pub fn support_ack() -> String {
    "Support request received! You should get a response within 24 hours.".to_string()
}

pub fn contact_card(agent: &str) -> String {
    format!("Here is the contact card for {agent}:")
}

pub fn billing_portal(url: &str) -> String {
    format!("Manage your subscription here: {url}")
}

pub fn billing_none() -> String {
    "You don't have an active subscription.".to_string()
}

pub fn invite_link(url: &str) -> String {
    format!("Here's the link: {url}")
}

pub fn invite_invalid(code: &str) -> String {
    format!("'{}' is not a valid invite code.", code.to_uppercase())
}

// --- Usage gate replies ---

pub fn welcome_free(agent: &str, free_messages: i64) -> String {
    normalize_multiline(&format!(
        "Hello! You have {free_messages} free messages to test the power of {agent}. Your journey starts now.

        To learn more, use the '@help' command."
    ))
}

pub fn no_subscription(agent: &str) -> String {
    normalize_multiline(&format!(
        "You don't have an active {agent} subscription.

        If you have an invite code, use '@invite <CODE>' to generate a payment link. Once subscribed, you will immediately receive full access to {agent}.

        If you would like access to {agent}, please submit an invite request with '@support <MESSAGE>' and someone will be in touch with you."
    ))
}

// --- Opt-in flow replies ---

pub fn optin_introduction(agent: &str) -> String {
    normalize_multiline(&format!(
        "Hey! I'm building {agent}, an assistant you can text like a friend. It answers questions, keeps you on track, and remembers what matters to you.

        It's not finished yet, but when it is it will be free to get started.

        Can I send you an invite when it's ready?

        Reply with \"YES\" to confirm.

        By opting in, you will also receive updates about new features and launches. If you change your mind, you can reply with \"UNSUBSCRIBE\" at any time to opt out."
    ))
}

pub fn optin_confirmation_success() -> String {
    normalize_multiline(
        "Sweet! I will send you an invite when it's ready.

        Just so that I can remember you better, can you provide me your name?",
    )
}

pub fn optin_confirmation_failure() -> String {
    "Sorry, I didn't get that. Please reply with \"YES\" to opt in to updates.".to_string()
}

pub fn optin_name_success(first_name: &str) -> String {
    normalize_multiline(&format!(
        "Thank you {first_name}.

        One last thing: what's your email address? I'll link it to your account so that you have a seamless experience when you first sign in."
    ))
}

pub fn optin_name_failure() -> String {
    "Sorry, I didn't get anything. Please reply with your name.".to_string()
}

pub fn optin_email_success() -> String {
    "Perfect! That's all I need at the moment. Thanks for your support!".to_string()
}

pub fn optin_email_failure_generic() -> String {
    "Sorry, I couldn't understand that. Please reply with a valid email address.".to_string()
}

pub fn optin_email_failure_duplicate() -> String {
    "That email is associated with an existing account. Please provide a different email."
        .to_string()
}

pub fn optin_complete(agent: &str) -> String {
    format!("You're locked in! I'll send you an invite when {agent} is ready. That's all for now.")
}

pub fn optin_unsubscribe(agent: &str) -> String {
    format!("Opt-out successful. You will no longer receive updates from {agent}.")
}

pub fn optin_resubscribe(agent: &str) -> String {
    format!(
        "You have previously unsubscribed from updates from {agent}. If you would like to opt back in, please reply with \"YES\" to confirm."
    )
}
