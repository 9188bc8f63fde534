// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration, storage, and the gateway clients into a running
//! server.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use quill_billing::{BillingUrls, StripeClient};
use quill_config::QuillConfig;
use quill_core::{EmailGateway, QuillError, Store};
use quill_email::SmtpMailer;
use quill_flow::{
    CommandConfig, CommandDispatcher, ConversationRelay, IdentityResolver, OptInFlow,
    ResponseCoordinator, UsageGate,
};
use quill_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig, SignatureConfig};
use quill_openai::OpenAiCompletions;
use quill_sms::TwilioClient;
use quill_storage::SqliteStore;

/// Email gateway used when no SMTP relay is configured.
///
/// Support forwards fail (the dispatcher logs and still acknowledges),
/// so a missing relay degrades the `@support` command instead of
/// blocking startup.
struct DisabledMailer;

#[async_trait]
impl EmailGateway for DisabledMailer {
    async fn send(
        &self,
        _from: &str,
        _to: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<(), QuillError> {
        Err(QuillError::Email {
            message: "no SMTP relay configured".to_string(),
            source: None,
        })
    }
}

fn require(value: Option<String>, key: &str) -> Result<String, QuillError> {
    value.ok_or_else(|| QuillError::Config(format!("`{key}` must be set to serve")))
}

/// Run the Quill server until interrupted.
pub async fn run(config: QuillConfig) -> Result<(), QuillError> {
    let store = Arc::new(SqliteStore::open(&config.storage.database_path).await?);
    let store_dyn: Arc<dyn Store> = store.clone();

    let sms = Arc::new(TwilioClient::new(
        require(config.sms.account_sid.clone(), "sms.account_sid")?,
        require(config.sms.auth_token.clone(), "sms.auth_token")?,
        require(config.sms.from_number.clone(), "sms.from_number")?,
    )?);

    let email: Arc<dyn EmailGateway> = match config.email.smtp_host {
        Some(ref host) => Arc::new(SmtpMailer::new(
            host,
            config.email.smtp_port,
            config.email.smtp_username.clone(),
            config.email.smtp_password.clone(),
        )?),
        None => {
            warn!("no SMTP relay configured; @support forwarding is disabled");
            Arc::new(DisabledMailer)
        }
    };

    let billing = Arc::new(StripeClient::new(
        require(config.billing.secret_key.clone(), "billing.secret_key")?,
        BillingUrls {
            success_url: config.billing.success_url.clone(),
            cancel_url: config.billing.cancel_url.clone(),
            return_url: config.billing.return_url.clone(),
        },
    )?);

    let internal_token = require(
        config.gateway.internal_token.clone(),
        "gateway.internal_token",
    )?;
    let completion = Arc::new(OpenAiCompletions::new(
        require(config.ai.api_key.clone(), "ai.api_key")?,
        config.ai.model.clone(),
        format!("{}/internal/ai/completion", config.gateway.public_url),
        internal_token.clone(),
    )?);

    let coordinator = ResponseCoordinator::new(
        IdentityResolver::new(store_dyn.clone()),
        CommandDispatcher::new(
            store_dyn.clone(),
            sms.clone(),
            email,
            billing.clone(),
            CommandConfig {
                agent: config.agent.name.clone(),
                about_url: config.agent.about_url.clone(),
                contact_card_url: config.sms.contact_card_url.clone(),
                support_to: config.email.support_to.clone(),
                support_from: config.email.support_from.clone(),
                invite_codes: config
                    .invite
                    .codes
                    .iter()
                    .map(|(code, price)| (code.to_lowercase(), price.clone()))
                    .collect(),
            },
        ),
        OptInFlow::new(
            store_dyn.clone(),
            config.flows.flow_id.clone(),
            config.flows.campaign_id.clone(),
            config.agent.name.clone(),
        ),
        UsageGate::new(
            store_dyn.clone(),
            billing.clone(),
            config.trial.free_messages,
        ),
        ConversationRelay::new(
            store_dyn.clone(),
            completion,
            config.agent.system_prompt.clone(),
        ),
        sms.clone(),
        config.flows.onboarding,
        config.agent.name.clone(),
        config.trial.free_messages,
    );

    let state = GatewayState {
        coordinator: Arc::new(coordinator),
        store: store_dyn,
        sms,
        auth: AuthConfig {
            bearer_token: Some(internal_token),
        },
        signature: SignatureConfig {
            enabled: config.gateway.validate_signatures,
            auth_token: config.sms.auth_token.clone(),
            public_url: config.gateway.public_url.trim_end_matches('/').to_string(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    info!(
        agent = %config.agent.name,
        host = %server_config.host,
        port = server_config.port,
        "starting Quill server"
    );

    tokio::select! {
        result = quill_gateway::start_server(&server_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    store.close().await?;
    Ok(())
}
