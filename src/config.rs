use crate::llm_client::GenerationOptions;
use clap::Parser;
use std::time::Duration;

/// Instruction sent ahead of every request when no override is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced programmer and \
code-writing assistant. Generate clean, well-structured code with comments. \
Always explain what you are doing. Prefer useful answers with usage examples.";

/// Command line and environment configuration for the relay bot.
///
/// Every option can come from the environment, so a plain `.env`-style
/// deployment works without flags. Missing required values abort startup
/// before the bot begins serving.
#[derive(Parser, Debug, Clone)]
#[command(name = "coderelay", about = "Telegram relay bot for AI code generation")]
pub struct Args {
    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: String,

    /// OpenRouter API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: String,

    /// Base URL of the OpenAI-compatible completion endpoint.
    #[arg(
        long,
        env = "OPENROUTER_API_URL",
        default_value = "https://openrouter.ai/api/v1"
    )]
    pub openrouter_api_url: String,

    /// Model identifier to request completions from.
    #[arg(
        long,
        env = "OPENROUTER_MODEL",
        default_value = "arcee-ai/trinity-large-preview:free"
    )]
    pub openrouter_model: String,

    /// Base URL of the Telegram Bot API.
    #[arg(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub telegram_api_url: String,

    /// Turns of history kept per user and included as context.
    #[arg(long, env = "RETENTION_WINDOW", default_value_t = 10)]
    pub retention_window: usize,

    /// Longest reply sent back before truncation, in characters.
    #[arg(long, env = "MAX_RESPONSE_LENGTH", default_value_t = 4000)]
    pub max_response_length: usize,

    /// Completion request timeout in seconds.
    #[arg(long, env = "API_TIMEOUT", default_value_t = 30)]
    pub api_timeout: u64,

    /// Sampling temperature, 0-1.
    #[arg(long, env = "API_TEMPERATURE", default_value_t = 0.7)]
    pub api_temperature: f32,

    /// Token budget for each completion.
    #[arg(long, env = "API_MAX_TOKENS", default_value_t = 2000)]
    pub api_max_tokens: u32,

    /// System prompt sent ahead of the conversation history.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,
}

impl Args {
    /// Generation options derived from the configured values.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.api_temperature,
            max_tokens: self.api_max_tokens,
            timeout: Duration::from_secs(self.api_timeout),
        }
    }
}
