// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatcher: pattern-matches message text against the `@`
//! command prefixes and short-circuits to a handler when matched.
//!
//! Prefix matching happens on the trimmed, lowercased text; payloads
//! (`@support`, `@invite`) are extracted from the trimmed original so
//! casing and content survive. Prefixes are checked in fixed order and
//! the first match wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, warn};

use quill_core::types::User;
use quill_core::{BillingGateway, EmailGateway, QuillError, SmsGateway, Store};

use crate::copy;

/// What the dispatcher decided for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A command matched. `None` means the command already replied
    /// out-of-band (e.g. a media send) and no text reply is due.
    Matched(Option<String>),
    /// No command prefix matched; the caller falls through to the flow
    /// engine / usage gate path.
    NotMatched,
}

/// Configuration for the command dispatcher's scripted replies and
/// destinations.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    pub agent: String,
    pub about_url: String,
    pub contact_card_url: String,
    pub support_to: String,
    pub support_from: String,
    /// Lowercased invite code -> billing price id.
    pub invite_codes: BTreeMap<String, String>,
}

/// Dispatches `@` commands to their handlers.
pub struct CommandDispatcher {
    store: Arc<dyn Store>,
    sms: Arc<dyn SmsGateway>,
    email: Arc<dyn EmailGateway>,
    billing: Arc<dyn BillingGateway>,
    config: CommandConfig,
}

impl CommandDispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        sms: Arc<dyn SmsGateway>,
        email: Arc<dyn EmailGateway>,
        billing: Arc<dyn BillingGateway>,
        config: CommandConfig,
    ) -> Self {
        Self {
            store,
            sms,
            email,
            billing,
            config,
        }
    }

    /// Matches `raw` against the command set.
    ///
    /// `sender` is the inbound phone number, used for media replies and
    /// as the support-email display name.
    pub async fn dispatch(
        &self,
        user: &User,
        sender: &str,
        raw: &str,
    ) -> Result<CommandOutcome, QuillError> {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();

        if lowered.starts_with("@help") {
            return Ok(CommandOutcome::Matched(Some(copy::help(&self.config.agent))));
        }

        if lowered.starts_with("@about") {
            return Ok(CommandOutcome::Matched(Some(copy::about(
                &self.config.agent,
                &self.config.about_url,
            ))));
        }

        if lowered.starts_with("@support ") {
            let message = &trimmed["@support ".len()..];
            return Ok(CommandOutcome::Matched(Some(
                self.handle_support(sender, message).await,
            )));
        }

        if lowered.starts_with("@contact") {
            self.sms
                .send(
                    sender,
                    &copy::contact_card(&self.config.agent),
                    Some(&self.config.contact_card_url),
                )
                .await?;
            // The attachment is the reply.
            return Ok(CommandOutcome::Matched(None));
        }

        if lowered.starts_with("@billing") {
            return Ok(CommandOutcome::Matched(Some(self.handle_billing(user).await?)));
        }

        if lowered.starts_with("@invite ") {
            let code = lowered["@invite ".len()..].trim().to_string();
            return Ok(CommandOutcome::Matched(Some(
                self.handle_invite(user, &code).await?,
            )));
        }

        Ok(CommandOutcome::NotMatched)
    }

    /// Forwards a support request to the operator contact.
    ///
    /// Delivery failure is logged but invisible to the sender: they get
    /// the acknowledgment either way.
    async fn handle_support(&self, sender: &str, message: &str) -> String {
        let from = copy::sender_identity(sender, &self.config.support_from);
        if let Err(e) = self
            .email
            .send(&from, &self.config.support_to, "Support Request (SMS)", message)
            .await
        {
            error!(sender = %sender, error = %e, "failed to forward support request");
        }
        copy::support_ack()
    }

    async fn handle_billing(&self, user: &User) -> Result<String, QuillError> {
        let Some(customer_id) = self.ensure_billing_customer(user).await? else {
            return Ok(copy::billing_none());
        };

        match self.billing.portal_url(&customer_id).await {
            Ok(Some(url)) => Ok(copy::billing_portal(&url)),
            Ok(None) => Ok(copy::billing_none()),
            Err(e) => {
                // Portal generation failure reads as "nothing to manage",
                // not as an internal error.
                warn!(customer_id = %customer_id, error = %e, "portal link generation failed");
                Ok(copy::billing_none())
            }
        }
    }

    async fn handle_invite(&self, user: &User, code: &str) -> Result<String, QuillError> {
        let Some(price_id) = self.config.invite_codes.get(code) else {
            return Ok(copy::invite_invalid(code));
        };

        let Some(customer_id) = self.ensure_billing_customer(user).await? else {
            return Ok(copy::billing_none());
        };

        let url = self.billing.checkout_url(&customer_id, price_id).await?;
        Ok(copy::invite_link(&url))
    }

    /// Returns the user's billing customer id, creating one if absent.
    ///
    /// Creation requires a phone number on file; without one there is
    /// nothing to bill, and `None` is returned.
    async fn ensure_billing_customer(&self, user: &User) -> Result<Option<String>, QuillError> {
        if let Some(ref customer_id) = user.billing_customer_id {
            return Ok(Some(customer_id.clone()));
        }

        let Some(ref phone) = user.phone else {
            return Ok(None);
        };

        let customer_id = self.billing.create_customer(phone).await?;
        self.store
            .set_billing_customer(&user.id, &customer_id)
            .await?;
        Ok(Some(customer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_storage::SqliteStore;
    use quill_test_utils::{MockBilling, MockEmail, MockSms};
    use tempfile::tempdir;

    struct Fixture {
        store: Arc<SqliteStore>,
        sms: MockSms,
        email: MockEmail,
        billing: MockBilling,
        dispatcher: CommandDispatcher,
        user: User,
        _dir: tempfile::TempDir,
    }

    async fn setup() -> Fixture {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("commands.db");
        let store = Arc::new(SqliteStore::open(db_path.to_str().unwrap()).await.unwrap());
        store
            .create_user_with_phone("u1", "+15551230001")
            .await
            .unwrap();
        let user = store.get_user("u1").await.unwrap().unwrap();

        let sms = MockSms::new();
        let email = MockEmail::new();
        let billing = MockBilling::new();

        let mut invite_codes = BTreeMap::new();
        invite_codes.insert("kicsy".to_string(), "price_quill_founding".to_string());

        let dispatcher = CommandDispatcher::new(
            store.clone(),
            Arc::new(sms.clone()),
            Arc::new(email.clone()),
            Arc::new(billing.clone()),
            CommandConfig {
                agent: "Quill".to_string(),
                about_url: "https://quill.chat/about".to_string(),
                contact_card_url: "https://quill.chat/vcards/quill.vcf".to_string(),
                support_to: "support@quill.chat".to_string(),
                support_from: "relay@quill.chat".to_string(),
                invite_codes,
            },
        );

        Fixture {
            store,
            sms,
            email,
            billing,
            dispatcher,
            user,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn plain_text_is_not_matched() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "hello there")
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::NotMatched);
    }

    #[tokio::test]
    async fn help_is_case_insensitive() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "  @HELP  ")
            .await
            .unwrap();
        match outcome {
            CommandOutcome::Matched(Some(reply)) => assert!(reply.contains("@invite")),
            other => panic!("expected help reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn about_embeds_the_url() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@about")
            .await
            .unwrap();
        match outcome {
            CommandOutcome::Matched(Some(reply)) => {
                assert!(reply.contains("https://quill.chat/about"));
            }
            other => panic!("expected about reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn support_forwards_original_casing_and_acks() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@support My App Is BROKEN")
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Matched(Some(copy::support_ack())));

        let sent = f.email.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "My App Is BROKEN");
        assert_eq!(sent[0].to, "support@quill.chat");
        assert_eq!(sent[0].from, "+15551230001 <relay@quill.chat>");
        assert_eq!(sent[0].subject, "Support Request (SMS)");
    }

    #[tokio::test]
    async fn support_delivery_failure_still_acks() {
        let f = setup().await;
        f.email.fail_sends(true).await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@support help me")
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Matched(Some(copy::support_ack())));
    }

    #[tokio::test]
    async fn bare_support_without_argument_is_not_matched() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@support")
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::NotMatched);
    }

    #[tokio::test]
    async fn contact_sends_media_and_returns_no_text() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@contact")
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Matched(None));

        let sent = f.sms.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+15551230001");
        assert_eq!(
            sent[0].media_url.as_deref(),
            Some("https://quill.chat/vcards/quill.vcf")
        );
    }

    #[tokio::test]
    async fn billing_without_portal_reports_no_subscription() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@billing")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Matched(Some(copy::billing_none()))
        );

        // A customer was still created and linked.
        let user = f.store.get_user("u1").await.unwrap().unwrap();
        assert!(user.billing_customer_id.is_some());
    }

    #[tokio::test]
    async fn billing_with_portal_embeds_the_link() {
        let f = setup().await;
        f.billing.set_portal_available(true).await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@billing")
            .await
            .unwrap();
        match outcome {
            CommandOutcome::Matched(Some(reply)) => {
                assert!(reply.contains("https://billing.example.com/portal/"));
            }
            other => panic!("expected portal reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn billing_customer_is_created_once() {
        let f = setup().await;
        f.dispatcher
            .dispatch(&f.user, "+15551230001", "@billing")
            .await
            .unwrap();
        // Second dispatch uses the refreshed user row with the linked id.
        let user = f.store.get_user("u1").await.unwrap().unwrap();
        f.dispatcher
            .dispatch(&user, "+15551230001", "@billing")
            .await
            .unwrap();
        assert_eq!(f.billing.customers().await.len(), 1);
    }

    #[tokio::test]
    async fn known_invite_code_returns_checkout_link() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@invite KICSY")
            .await
            .unwrap();
        match outcome {
            CommandOutcome::Matched(Some(reply)) => {
                assert!(reply.starts_with("Here's the link: "));
                assert!(reply.contains("price_quill_founding"));
            }
            other => panic!("expected checkout reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_invite_code_echoes_uppercased() {
        let f = setup().await;
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@invite bogus")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Matched(Some("'BOGUS' is not a valid invite code.".to_string()))
        );
    }

    #[tokio::test]
    async fn first_match_wins_in_fixed_order() {
        let f = setup().await;
        // "@helpful" still matches the @help prefix; the dispatcher never
        // reaches later handlers.
        let outcome = f
            .dispatcher
            .dispatch(&f.user, "+15551230001", "@helpful @invite kicsy")
            .await
            .unwrap();
        match outcome {
            CommandOutcome::Matched(Some(reply)) => assert!(reply.contains("system commands")),
            other => panic!("expected help reply, got {other:?}"),
        }
    }
}
