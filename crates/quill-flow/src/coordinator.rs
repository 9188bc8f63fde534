// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response coordinator: composes identity resolution, command dispatch,
//! flow dispatch, the usage gate, and the conversation relay in fixed
//! precedence order.
//!
//! Returns the reply text for the webhook response, or `None` when the
//! reply (if any) arrives asynchronously.

use std::sync::Arc;

use tracing::{debug, info};

use quill_config::model::OnboardingMode;
use quill_core::{QuillError, SmsGateway};

use crate::commands::{CommandDispatcher, CommandOutcome};
use crate::copy;
use crate::identity::IdentityResolver;
use crate::optin::OptInFlow;
use crate::relay::ConversationRelay;
use crate::usage_gate::UsageGate;

/// Orchestrates the full inbound-message decision chain.
pub struct ResponseCoordinator {
    identity: IdentityResolver,
    commands: CommandDispatcher,
    optin: OptInFlow,
    gate: UsageGate,
    relay: ConversationRelay,
    sms: Arc<dyn SmsGateway>,
    onboarding: OnboardingMode,
    agent: String,
    free_messages: i64,
}

impl ResponseCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: IdentityResolver,
        commands: CommandDispatcher,
        optin: OptInFlow,
        gate: UsageGate,
        relay: ConversationRelay,
        sms: Arc<dyn SmsGateway>,
        onboarding: OnboardingMode,
        agent: impl Into<String>,
        free_messages: i64,
    ) -> Self {
        Self {
            identity,
            commands,
            optin,
            gate,
            relay,
            sms,
            onboarding,
            agent: agent.into(),
            free_messages,
        }
    }

    /// Produces the reply for one inbound message.
    ///
    /// `Ok(None)` means no synchronous reply; either a command already
    /// replied out-of-band or the AI reply will arrive via the
    /// completion callback.
    pub async fn respond(
        &self,
        sender: &str,
        content: &str,
    ) -> Result<Option<String>, QuillError> {
        // 1. Identity always resolves; absence creates the user.
        let user = self.identity.resolve(sender).await?;
        debug!(user_id = %user.id, sender = %sender, "resolved inbound sender");

        // 2. Commands short-circuit everything below.
        match self.commands.dispatch(&user, sender, content).await? {
            CommandOutcome::Matched(reply) => {
                info!(user_id = %user.id, "command handled");
                return Ok(reply);
            }
            CommandOutcome::NotMatched => {}
        }

        // 3. Optional explicit flow dispatch.
        let run_flow = match self.onboarding {
            OnboardingMode::Off => false,
            OnboardingMode::Always => true,
            OnboardingMode::Engaged => self.optin.is_engaged(&user.id).await?,
        };
        if run_flow {
            let reply = self.optin.handle(&user, content).await?;
            return Ok(Some(reply));
        }

        // 4. Usage gate.
        let decision = self.gate.check(&user).await?;
        if !decision.allowed {
            info!(user_id = %user.id, "AI path denied, trial exhausted");
            return Ok(Some(copy::no_subscription(&self.agent)));
        }

        // 5. One-time welcome, sent out-of-band before the AI reply.
        if decision.first_free {
            self.sms
                .send(
                    sender,
                    &copy::welcome_free(&self.agent, self.free_messages),
                    None,
                )
                .await?;
            info!(user_id = %user.id, "sent first-free welcome");
        }

        // 6. Relay to the AI path; reply arrives asynchronously.
        self.relay.relay(&user.id, content, sender).await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use quill_core::types::{MessageRole, OptInStep, DEFAULT_THREAD};
    use quill_core::Store;
    use quill_storage::SqliteStore;
    use quill_test_utils::{MockBilling, MockCompletion, MockEmail, MockSms};
    use tempfile::tempdir;

    use crate::commands::CommandConfig;

    const AGENT: &str = "Quill";
    const SENDER: &str = "+15551230001";

    struct Fixture {
        store: Arc<SqliteStore>,
        sms: MockSms,
        billing: MockBilling,
        completion: MockCompletion,
        coordinator: ResponseCoordinator,
        _dir: tempfile::TempDir,
    }

    async fn setup(onboarding: OnboardingMode) -> Fixture {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("coordinator.db");
        let store = Arc::new(SqliteStore::open(db_path.to_str().unwrap()).await.unwrap());

        let sms = MockSms::new();
        let email = MockEmail::new();
        let billing = MockBilling::new();
        let completion = MockCompletion::new();

        let mut invite_codes = BTreeMap::new();
        invite_codes.insert("kicsy".to_string(), "price_quill_founding".to_string());

        let store_dyn: Arc<dyn Store> = store.clone();
        let coordinator = ResponseCoordinator::new(
            IdentityResolver::new(store_dyn.clone()),
            CommandDispatcher::new(
                store_dyn.clone(),
                Arc::new(sms.clone()),
                Arc::new(email.clone()),
                Arc::new(billing.clone()),
                CommandConfig {
                    agent: AGENT.to_string(),
                    about_url: "https://quill.chat/about".to_string(),
                    contact_card_url: "https://quill.chat/vcards/quill.vcf".to_string(),
                    support_to: "support@quill.chat".to_string(),
                    support_from: "relay@quill.chat".to_string(),
                    invite_codes,
                },
            ),
            OptInFlow::new(
                store_dyn.clone(),
                "launch-updates-opt-in",
                "launch-updates",
                AGENT,
            ),
            UsageGate::new(store_dyn.clone(), Arc::new(billing.clone()), 10),
            ConversationRelay::new(store_dyn.clone(), Arc::new(completion.clone()), None),
            Arc::new(sms.clone()),
            onboarding,
            AGENT,
            10,
        );

        Fixture {
            store,
            sms,
            billing,
            completion,
            coordinator,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn new_user_in_flow_mode_gets_the_introduction() {
        // Scenario: new user texts "hi" with onboarding as catch-all.
        let f = setup(OnboardingMode::Always).await;

        let reply = f.coordinator.respond(SENDER, "hi").await.unwrap();
        assert_eq!(reply, Some(copy::optin_introduction(AGENT)));

        // The user was created and the flow advanced to confirmation.
        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        let flow = f
            .store
            .get_flow("launch-updates-opt-in", &user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flow.step, Some(OptInStep::Confirmation));
    }

    #[tokio::test]
    async fn yes_at_confirmation_subscribes_and_advances() {
        let f = setup(OnboardingMode::Always).await;

        f.coordinator.respond(SENDER, "hi").await.unwrap();
        let reply = f.coordinator.respond(SENDER, "yes").await.unwrap();
        assert_eq!(reply, Some(copy::optin_confirmation_success()));

        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        let flow = f
            .store
            .get_flow("launch-updates-opt-in", &user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flow.step, Some(OptInStep::Name));
        let member = f
            .store
            .get_membership(&user.id, "launch-updates")
            .await
            .unwrap()
            .unwrap();
        assert!(member.subscribed);
    }

    #[tokio::test]
    async fn invite_with_known_code_returns_checkout_url() {
        let f = setup(OnboardingMode::Engaged).await;

        let reply = f
            .coordinator
            .respond(SENDER, "@invite kicsy")
            .await
            .unwrap()
            .unwrap();
        assert!(reply.starts_with("Here's the link: "));
        assert!(reply.contains("price_quill_founding"));
    }

    #[tokio::test]
    async fn invite_with_bogus_code_echoes_uppercased() {
        let f = setup(OnboardingMode::Engaged).await;

        let reply = f
            .coordinator
            .respond(SENDER, "@invite bogus")
            .await
            .unwrap();
        assert_eq!(
            reply,
            Some("'BOGUS' is not a valid invite code.".to_string())
        );
    }

    #[tokio::test]
    async fn free_form_message_relays_and_returns_no_reply() {
        let f = setup(OnboardingMode::Engaged).await;

        let reply = f
            .coordinator
            .respond(SENDER, "tell me something interesting")
            .await
            .unwrap();
        assert_eq!(reply, None);

        // Welcome went out-of-band (first free message).
        let sent = f.sms.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("10 free messages"));

        // The completion job carries the persisted message.
        let jobs = f.completion.jobs().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].recipient, SENDER);
        assert_eq!(jobs[0].messages.len(), 1);
        assert_eq!(jobs[0].messages[0].content, "tell me something interesting");
    }

    #[tokio::test]
    async fn welcome_is_sent_only_once() {
        let f = setup(OnboardingMode::Engaged).await;

        f.coordinator.respond(SENDER, "first").await.unwrap();

        // Simulate the assistant reply landing.
        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        f.store
            .insert_message(&quill_core::types::MessageRecord {
                id: "a1".to_string(),
                user_id: user.id.clone(),
                role: MessageRole::Assistant,
                content: "reply".to_string(),
                thread_id: DEFAULT_THREAD.to_string(),
                created_at: quill_core::types::now_iso(),
            })
            .await
            .unwrap();

        f.coordinator.respond(SENDER, "second").await.unwrap();

        let welcomes = f
            .sms
            .sent()
            .await
            .iter()
            .filter(|s| s.body.contains("free messages"))
            .count();
        assert_eq!(welcomes, 1);
    }

    #[tokio::test]
    async fn exhausted_trial_without_subscription_is_denied() {
        let f = setup(OnboardingMode::Engaged).await;

        f.coordinator.respond(SENDER, "hello").await.unwrap();
        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        for i in 0..10 {
            f.store
                .insert_message(&quill_core::types::MessageRecord {
                    id: format!("a{i}"),
                    user_id: user.id.clone(),
                    role: MessageRole::Assistant,
                    content: "reply".to_string(),
                    thread_id: DEFAULT_THREAD.to_string(),
                    created_at: quill_core::types::now_iso(),
                })
                .await
                .unwrap();
        }

        let reply = f.coordinator.respond(SENDER, "another").await.unwrap();
        assert_eq!(reply, Some(copy::no_subscription(AGENT)));
        // Nothing new was relayed.
        assert_eq!(f.completion.jobs().await.len(), 1);
    }

    #[tokio::test]
    async fn subscribed_user_bypasses_trial_and_welcome() {
        let f = setup(OnboardingMode::Engaged).await;

        // Establish the user and link a billing customer.
        f.coordinator.respond(SENDER, "@billing").await.unwrap();
        f.billing.set_subscribed(true).await;

        let reply = f.coordinator.respond(SENDER, "hello quill").await.unwrap();
        assert_eq!(reply, None);

        // No welcome for subscribers.
        assert!(f.sms.sent().await.is_empty());
        assert_eq!(f.completion.jobs().await.len(), 1);
    }

    #[tokio::test]
    async fn commands_take_precedence_over_the_flow() {
        let f = setup(OnboardingMode::Always).await;

        let reply = f.coordinator.respond(SENDER, "@help").await.unwrap().unwrap();
        assert!(reply.contains("system commands"));

        // The flow was never engaged.
        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        assert!(f
            .store
            .get_flow("launch-updates-opt-in", &user.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn engaged_mode_only_routes_users_already_in_the_flow() {
        let f = setup(OnboardingMode::Engaged).await;

        // Unengaged user falls through to the AI path.
        let reply = f.coordinator.respond(SENDER, "hi").await.unwrap();
        assert_eq!(reply, None);

        // Engage the flow by hand, then the same text routes into it.
        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        f.store
            .create_flow("launch-updates-opt-in", &user.id)
            .await
            .unwrap();
        let reply = f.coordinator.respond(SENDER, "hi").await.unwrap();
        assert_eq!(reply, Some(copy::optin_introduction(AGENT)));
    }

    #[tokio::test]
    async fn off_mode_never_routes_into_the_flow() {
        let f = setup(OnboardingMode::Off).await;

        let user_reply = f.coordinator.respond(SENDER, "hi").await.unwrap();
        assert_eq!(user_reply, None);

        let user = f.store.find_user_by_phone(SENDER).await.unwrap().unwrap();
        f.store
            .create_flow("launch-updates-opt-in", &user.id)
            .await
            .unwrap();
        // Even an engaged row is ignored when the flow is off.
        let reply = f.coordinator.respond(SENDER, "hello again").await.unwrap();
        assert_eq!(reply, None);
    }
}
