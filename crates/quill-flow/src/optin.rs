// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign flow engine for the opt-in onboarding dialogue.
//!
//! Steps advance strictly forward: unstarted -> confirmation -> name ->
//! email -> complete. Opting out never rewinds the persisted step; it
//! flips the campaign subscription flag, and re-confirmation gates all
//! later steps until the user opts back in.
//!
//! The state machine is an explicit transition table: `transition` is a
//! pure function from (step, input) to (action, next step, reply), and
//! the engine only applies its outcome to storage. That keeps
//! exhaustiveness and forward-only progress checkable without a database.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use quill_core::types::{OptInStep, User};
use quill_core::{QuillError, Store};

use crate::copy;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

/// Returns true for input that reads as a plausible email address.
fn is_valid_email(value: &str) -> bool {
    value.len() <= 255 && EMAIL_RE.is_match(value)
}

/// A side effect the engine must apply when taking a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    /// No write beyond the step pointer.
    None,
    /// Set the campaign subscription flag to true.
    Subscribe,
    /// Store the user's display name (already title-cased).
    StoreName(String),
    /// Store the user's email (already lowercased). May hit a uniqueness
    /// conflict, which the engine converts into the duplicate reply.
    StoreEmail(String),
}

/// Outcome of one row of the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub action: FlowAction,
    /// `None` = the step pointer does not move.
    pub next: Option<OptInStep>,
    pub reply: String,
}

/// The opt-in flow's transition table.
///
/// Pure: given the persisted step and the raw message text, produce the
/// action, the next step, and the scripted reply. `agent` only brands
/// the reply strings.
pub fn transition(step: Option<OptInStep>, input: &str, agent: &str) -> Transition {
    let normalized = input.trim().to_lowercase();

    match step {
        None => Transition {
            action: FlowAction::None,
            next: Some(OptInStep::Confirmation),
            reply: copy::optin_introduction(agent),
        },

        Some(OptInStep::Confirmation) => {
            if normalized == "yes" {
                Transition {
                    action: FlowAction::Subscribe,
                    next: Some(OptInStep::Name),
                    reply: copy::optin_confirmation_success(),
                }
            } else {
                Transition {
                    action: FlowAction::None,
                    next: None,
                    reply: copy::optin_confirmation_failure(),
                }
            }
        }

        Some(OptInStep::Name) => {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                Transition {
                    action: FlowAction::None,
                    next: None,
                    reply: copy::optin_name_failure(),
                }
            } else {
                let name = copy::to_title_case(trimmed);
                let first = name
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                Transition {
                    action: FlowAction::StoreName(name),
                    next: Some(OptInStep::Email),
                    reply: copy::optin_name_success(&first),
                }
            }
        }

        Some(OptInStep::Email) => {
            if is_valid_email(&normalized) {
                Transition {
                    action: FlowAction::StoreEmail(normalized),
                    next: Some(OptInStep::Complete),
                    reply: copy::optin_email_success(),
                }
            } else {
                Transition {
                    action: FlowAction::None,
                    next: None,
                    reply: copy::optin_email_failure_generic(),
                }
            }
        }

        Some(OptInStep::Complete) => Transition {
            action: FlowAction::None,
            next: None,
            reply: copy::optin_complete(agent),
        },
    }
}

/// The persistent engine around the transition table.
pub struct OptInFlow {
    store: Arc<dyn Store>,
    flow_id: String,
    campaign_id: String,
    agent: String,
}

impl OptInFlow {
    pub fn new(
        store: Arc<dyn Store>,
        flow_id: impl Into<String>,
        campaign_id: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            store,
            flow_id: flow_id.into(),
            campaign_id: campaign_id.into(),
            agent: agent.into(),
        }
    }

    /// Returns true when the user already has a flow row, i.e. the flow
    /// has been engaged at least once.
    pub async fn is_engaged(&self, user_id: &str) -> Result<bool, QuillError> {
        Ok(self.store.get_flow(&self.flow_id, user_id).await?.is_some())
    }

    /// Processes one inbound message through the flow and returns the reply.
    pub async fn handle(&self, user: &User, content: &str) -> Result<String, QuillError> {
        // Lazily create the campaign as active on first reference. An
        // inactive campaign must never be engaged by users.
        let campaign = match self.store.get_campaign(&self.campaign_id).await? {
            Some(campaign) => campaign,
            None => {
                self.store.create_campaign(&self.campaign_id, true).await?;
                self.store
                    .get_campaign(&self.campaign_id)
                    .await?
                    .ok_or_else(|| {
                        QuillError::Internal("campaign vanished after create".to_string())
                    })?
            }
        };
        if !campaign.active {
            return Err(QuillError::Precondition(format!(
                "campaign `{}` is not currently active",
                campaign.id
            )));
        }

        // Lazily create the flow and membership rows.
        let flow = match self.store.get_flow(&self.flow_id, &user.id).await? {
            Some(flow) => flow,
            None => {
                self.store.create_flow(&self.flow_id, &user.id).await?;
                self.store
                    .get_flow(&self.flow_id, &user.id)
                    .await?
                    .ok_or_else(|| QuillError::Internal("flow vanished after create".to_string()))?
            }
        };
        let membership = match self
            .store
            .get_membership(&user.id, &self.campaign_id)
            .await?
        {
            Some(member) => member,
            None => {
                self.store
                    .create_membership(&user.id, &self.campaign_id)
                    .await?;
                self.store
                    .get_membership(&user.id, &self.campaign_id)
                    .await?
                    .ok_or_else(|| {
                        QuillError::Internal("membership vanished after create".to_string())
                    })?
            }
        };

        let normalized = content.trim().to_lowercase();

        // Opt-out overrides all state handling and never moves the step.
        if normalized == "unsubscribe" {
            self.store
                .set_subscribed(&user.id, &self.campaign_id, false)
                .await?;
            debug!(user_id = %user.id, campaign_id = %self.campaign_id, "user opted out");
            return Ok(copy::optin_unsubscribe(&self.agent));
        }

        // An opted-out user past the confirmation step must re-confirm
        // before any state handling resumes.
        if !membership.subscribed
            && flow
                .step
                .is_some_and(|step| step != OptInStep::Confirmation)
        {
            if normalized != "yes" {
                return Ok(copy::optin_resubscribe(&self.agent));
            }
            self.store
                .set_subscribed(&user.id, &self.campaign_id, true)
                .await?;
        }

        let t = transition(flow.step, content, &self.agent);

        match t.action {
            FlowAction::None => {}
            FlowAction::Subscribe => {
                self.store
                    .set_subscribed(&user.id, &self.campaign_id, true)
                    .await?;
            }
            FlowAction::StoreName(ref name) => {
                self.store.set_user_name(&user.id, name).await?;
            }
            FlowAction::StoreEmail(ref email) => {
                match self.store.set_user_email(&user.id, email).await {
                    Ok(()) => {}
                    // Someone else owns this email: scripted reply, step
                    // stays put.
                    Err(QuillError::Conflict { .. }) => {
                        return Ok(copy::optin_email_failure_duplicate());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if let Some(next) = t.next
            && flow.step != Some(next)
        {
            self.store
                .set_flow_step(&self.flow_id, &user.id, next)
                .await?;
            debug!(
                user_id = %user.id,
                flow_id = %self.flow_id,
                step = %next,
                "flow step advanced"
            );
        }

        Ok(t.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "Quill";

    #[test]
    fn unstarted_always_moves_to_confirmation() {
        for input in ["hi", "", "yes", "@nonsense"] {
            let t = transition(None, input, AGENT);
            assert_eq!(t.next, Some(OptInStep::Confirmation));
            assert_eq!(t.action, FlowAction::None);
            assert_eq!(t.reply, copy::optin_introduction(AGENT));
        }
    }

    #[test]
    fn confirmation_requires_yes() {
        let t = transition(Some(OptInStep::Confirmation), "  YES ", AGENT);
        assert_eq!(t.action, FlowAction::Subscribe);
        assert_eq!(t.next, Some(OptInStep::Name));

        let t = transition(Some(OptInStep::Confirmation), "maybe", AGENT);
        assert_eq!(t.action, FlowAction::None);
        assert_eq!(t.next, None);
        assert_eq!(t.reply, copy::optin_confirmation_failure());
    }

    #[test]
    fn name_step_title_cases_and_extracts_first_name() {
        let t = transition(Some(OptInStep::Name), "  ada lovelace  ", AGENT);
        assert_eq!(t.action, FlowAction::StoreName("Ada Lovelace".to_string()));
        assert_eq!(t.next, Some(OptInStep::Email));
        assert!(t.reply.contains("Ada"));
        assert!(!t.reply.contains("Lovelace"));
    }

    #[test]
    fn empty_name_does_not_advance() {
        let t = transition(Some(OptInStep::Name), "   ", AGENT);
        assert_eq!(t.action, FlowAction::None);
        assert_eq!(t.next, None);
        assert_eq!(t.reply, copy::optin_name_failure());
    }

    #[test]
    fn email_step_validates_syntax() {
        let t = transition(Some(OptInStep::Email), " Ada@Example.COM ", AGENT);
        assert_eq!(
            t.action,
            FlowAction::StoreEmail("ada@example.com".to_string())
        );
        assert_eq!(t.next, Some(OptInStep::Complete));

        for bad in ["not an email", "a@b", "@example.com", "a b@example.com"] {
            let t = transition(Some(OptInStep::Email), bad, AGENT);
            assert_eq!(t.action, FlowAction::None, "accepted {bad:?}");
            assert_eq!(t.next, None);
        }
    }

    #[test]
    fn oversized_email_is_rejected() {
        let long = format!("{}@example.com", "a".repeat(255));
        let t = transition(Some(OptInStep::Email), &long, AGENT);
        assert_eq!(t.action, FlowAction::None);
    }

    #[test]
    fn complete_is_terminal() {
        for input in ["anything", "yes", ""] {
            let t = transition(Some(OptInStep::Complete), input, AGENT);
            assert_eq!(t.next, None);
            assert_eq!(t.action, FlowAction::None);
            assert_eq!(t.reply, copy::optin_complete(AGENT));
        }
    }

    #[test]
    fn steps_only_move_forward() {
        // Every row of the table either stays put or strictly advances.
        fn rank(step: Option<OptInStep>) -> u8 {
            match step {
                None => 0,
                Some(OptInStep::Confirmation) => 1,
                Some(OptInStep::Name) => 2,
                Some(OptInStep::Email) => 3,
                Some(OptInStep::Complete) => 4,
            }
        }
        let steps = [
            None,
            Some(OptInStep::Confirmation),
            Some(OptInStep::Name),
            Some(OptInStep::Email),
            Some(OptInStep::Complete),
        ];
        let inputs = ["", "yes", "ada lovelace", "ada@example.com", "junk"];
        for step in steps {
            for input in inputs {
                let t = transition(step, input, AGENT);
                if let Some(next) = t.next {
                    assert!(
                        rank(Some(next)) > rank(step),
                        "{step:?} + {input:?} moved backwards to {next:?}"
                    );
                }
            }
        }
    }
}
