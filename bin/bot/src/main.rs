use rusgo_bot::{Assistant, BotConfig, telegram};
use std::process::ExitCode;
use std::sync::Arc;
use teloxide::Bot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rusgo=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = %report, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        model = %config.completion.model,
        ttl_minutes = config.session.ttl_minutes,
        max_history = config.session.max_history,
        "Loaded configuration"
    );

    let assistant = match Assistant::from_config(&config) {
        Ok(assistant) => assistant,
        Err(report) => {
            tracing::error!(error = %report, "failed to build assistant");
            return ExitCode::FAILURE;
        }
    };
    let bot = Bot::new(&config.telegram_token);

    if let Err(report) = telegram::run(bot, Arc::new(assistant)).await {
        tracing::error!(error = %report, "telegram transport failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
