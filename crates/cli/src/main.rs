use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doorman_captcha::{IdiomCaptcha, RenderClient};
use doorman_core::VerifierConfig;
use doorman_http::{create_router, start_cleanup_worker, start_countdown_worker, AppState};
use doorman_storage::PgStorage;
use doorman_telegram::BotClient;
use doorman_verifier::Verifier;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doorman")]
#[command(about = "Telegram group gatekeeper: captcha verification for new members", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server and queue workers.
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Path to the idiom word list (JSON).
        #[arg(long, default_value = "idiom.json")]
        idiom_path: PathBuf,
    },
}

fn require_env(var: &str) -> Result<String> {
    std::env::var(var).with_context(|| format!("{var} environment variable must be set"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, idiom_path } => {
            let bot_token = require_env("BOT_TOKEN")?;
            let database_url = require_env("DATABASE_URL")?;
            let render_url = require_env("DOORMAN_RENDER_URL")?;

            let storage = Arc::new(PgStorage::connect(&database_url).await?);
            let bot = Arc::new(BotClient::new(bot_token)?);
            let render = RenderClient::new(render_url)?;
            let captcha = Arc::new(IdiomCaptcha::from_file(&idiom_path, render)?);
            let config = VerifierConfig::from_env();

            let verifier = Arc::new(Verifier::new(
                storage.clone(),
                storage.clone(),
                bot.clone(),
                captcha,
                config,
            ));

            let state = Arc::new(AppState { verifier, chat: bot, queue: storage });
            start_countdown_worker(Arc::clone(&state));
            start_cleanup_worker(Arc::clone(&state));

            let router = create_router(state);
            let addr = format!("{host}:{port}");
            tracing::info!(%addr, "starting webhook server");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, router).await?;
        },
    }

    Ok(())
}
