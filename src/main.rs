use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use coderelay::{
    Args, Dispatcher, OpenRouterLLM, RetryLLM, RetryPolicy, TelegramBot, logger, run_polling,
    shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();
    tracing::info!(
        model = %args.openrouter_model,
        endpoint = %args.openrouter_api_url,
        "starting coderelay"
    );

    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .build()?;

    let llm = OpenRouterLLM::new(
        http.clone(),
        Url::parse(&args.openrouter_api_url)?,
        args.openrouter_api_key.clone(),
        args.openrouter_model.clone(),
    );
    let llm = Arc::new(RetryLLM::new(
        llm,
        RetryPolicy::new(2, Duration::from_secs(1)),
    ));

    let dispatcher = Arc::new(Dispatcher::new(
        llm,
        args.system_prompt.clone(),
        args.retention_window,
        args.max_response_length,
        args.generation_options(),
    ));

    let bot = Arc::new(TelegramBot::new(
        http,
        Url::parse(&args.telegram_api_url)?,
        args.telegram_bot_token.clone(),
    ));

    // Fail fast on a bad token before entering the serving loop.
    let me = bot.get_me().await?;
    tracing::info!(bot = %me.first_name, "connected to Telegram, waiting for messages");

    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("shutting down");
        }
        _ = run_polling(bot, dispatcher) => {}
    }
    Ok(())
}
