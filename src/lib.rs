//! Building blocks for the `coderelay` bot: a bounded per-user
//! conversation store, prompt context assembly, response formatting, and
//! the Telegram / OpenRouter glue around them.

mod config;
mod context;
mod dispatcher;
mod format;
mod history;
mod llm_client;
pub mod logger;
mod openrouter;
mod retry;
mod shutdown;
mod telegram;

pub use config::{Args, DEFAULT_SYSTEM_PROMPT};
pub use context::ContextBuilder;
pub use dispatcher::{Dispatcher, Reply};
pub use format::format_response;
pub use history::{HistoryStore, Role, Turn, UserId};
pub use llm_client::{CompletionError, GenerationOptions, LLMClient};
pub use openrouter::OpenRouterLLM;
pub use retry::{RetryLLM, RetryPolicy};
pub use shutdown::shutdown_signal;
pub use telegram::{TelegramBot, TelegramError, run_polling};
