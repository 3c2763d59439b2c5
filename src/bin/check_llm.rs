//! Connectivity check for the completion endpoint: verifies the API key,
//! lists available models, and runs one small completion round trip.

use clap::Parser;
use std::time::Duration;
use url::Url;

use coderelay::{GenerationOptions, LLMClient, OpenRouterLLM, Role, Turn, logger};

#[derive(Parser, Debug)]
#[command(name = "check-llm", about = "Verify OpenRouter connectivity and credentials")]
struct Cli {
    /// OpenRouter API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: String,

    /// Base URL of the completion endpoint.
    #[arg(
        long,
        env = "OPENROUTER_API_URL",
        default_value = "https://openrouter.ai/api/v1"
    )]
    openrouter_api_url: String,

    /// Model to run the test completion against.
    #[arg(
        long,
        env = "OPENROUTER_MODEL",
        default_value = "arcee-ai/trinity-large-preview:free"
    )]
    openrouter_model: String,

    /// Request timeout in seconds.
    #[arg(long, env = "API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let cli = Cli::parse();

    if cli.openrouter_api_key.starts_with("sk-or-v1-") {
        tracing::info!("API key format looks valid");
    } else {
        tracing::warn!("API key does not start with 'sk-or-v1-'; it may be invalid");
    }

    let llm = OpenRouterLLM::new(
        reqwest::Client::new(),
        Url::parse(&cli.openrouter_api_url)?,
        cli.openrouter_api_key,
        cli.openrouter_model.clone(),
    );

    tracing::info!(endpoint = %cli.openrouter_api_url, "listing models");
    let models = llm.list_models().await?;
    tracing::info!(count = models.len(), "endpoint reachable");
    if models.iter().any(|m| m == &cli.openrouter_model) {
        tracing::info!(model = %cli.openrouter_model, "configured model is available");
    } else {
        tracing::warn!(
            model = %cli.openrouter_model,
            "configured model not in the endpoint's model list"
        );
    }

    tracing::info!("running test completion");
    let prompt = [
        Turn::new(Role::System, "You are a connectivity probe."),
        Turn::new(Role::User, "Reply with the single word: pong"),
    ];
    let options = GenerationOptions {
        max_tokens: 16,
        timeout: Duration::from_secs(cli.api_timeout),
        ..GenerationOptions::default()
    };
    let reply = llm.complete(&prompt, &options).await?;
    tracing::info!(reply = %reply.trim(), "inference round trip succeeded");

    tracing::info!("all checks passed");
    Ok(())
}
