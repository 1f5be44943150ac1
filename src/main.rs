//! Relic Whispers - guess the historical figure behind a relic
//!
//! A terminal game: pick a relic, talk to the AI persona bound to it, and
//! name the figure. The persona signals a correct guess with a marker and
//! the game moves on to the reveal.

mod config;
mod error;
mod game;
mod llm;
mod presentation;
mod session;
mod state_machine;
mod system_prompt;

#[cfg(test)]
mod testing;

use config::ConfigSource;
use game::Game;
use llm::{ChatCompletionsService, LlmService, LoggingService};
use presentation::TerminalPresenter;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "config/ai_config.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the game screen
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relic_whispers=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let location = std::env::var("RELIC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let source = ConfigSource::parse(&location);

    let mut game_config = match config::load(&source).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "Failed to load config");
            eprintln!("Failed to load the game configuration from {source}: {e}");
            return Err(e.into());
        }
    };

    if let Ok(key) = std::env::var("RELIC_API_KEY") {
        game_config.api_settings.set_bearer_token(&key);
    }

    if let Ok(value) = std::env::var("RELIC_REVEAL_DELAY_MS") {
        match parse_delay_ms(&value) {
            Some(delay) => game_config.reveal_delay = delay,
            None => tracing::warn!(
                value = %value,
                default_ms = %game_config.reveal_delay.as_millis(),
                "Ignoring RELIC_REVEAL_DELAY_MS, not a number of milliseconds"
            ),
        }
    }

    // Initialize LLM client
    let service: Arc<dyn LlmService> =
        Arc::new(ChatCompletionsService::new(&game_config.api_settings)?);
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(service));

    tracing::info!(
        endpoint = %game_config.api_settings.endpoint,
        model = %llm.model_id(),
        reveal_delay_ms = %game_config.reveal_delay.as_millis(),
        "LLM client initialized"
    );

    let mut game = Game::new(
        Arc::new(game_config),
        llm,
        TerminalPresenter::new(std::io::stdout()),
    );
    let mut input = BufReader::new(tokio::io::stdin());
    game.run(&mut input).await?;

    Ok(())
}

/// Reveal delay override in whole milliseconds
fn parse_delay_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}
