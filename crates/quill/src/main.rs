// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quill - an SMS-first AI assistant backend.
//!
//! This is the binary entry point for the Quill server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod serve;

/// Quill - an SMS-first AI assistant backend.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Quill gateway server.
    Serve,
    /// Show the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match quill_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            quill_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level when set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                tracing::error!(error = %e, "server exited with error");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            print_config(&config);
        }
        None => {
            println!("quill: use --help for available commands");
        }
    }
}

/// Print the resolved, non-secret configuration.
fn print_config(config: &quill_config::QuillConfig) {
    println!("agent.name            = {}", config.agent.name);
    println!("agent.log_level       = {}", config.agent.log_level);
    println!("storage.database_path = {}", config.storage.database_path);
    println!(
        "gateway               = {}:{} (public: {})",
        config.gateway.host, config.gateway.port, config.gateway.public_url
    );
    println!(
        "gateway.signatures    = {}",
        config.gateway.validate_signatures
    );
    println!(
        "sms.from_number       = {}",
        config.sms.from_number.as_deref().unwrap_or("<unset>")
    );
    println!("ai.model              = {}", config.ai.model);
    println!("trial.free_messages   = {}", config.trial.free_messages);
    println!("flows.onboarding      = {:?}", config.flows.onboarding);
    println!(
        "invite.codes          = {}",
        config
            .invite
            .codes
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
}
