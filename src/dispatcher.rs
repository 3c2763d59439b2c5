use crate::context::ContextBuilder;
use crate::format::format_response;
use crate::history::{HistoryStore, Role, UserId};
use crate::llm_client::{GenerationOptions, LLMClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const HELP_TEXT: &str = "Available commands:\n\n\
/start - Begin\n\
/code - Start writing code\n\
/help - This help\n\
/cancel - Cancel the current request\n\n\
Example requests:\n\
- Write a function that sorts an array\n\
- Build a REST API in Python with FastAPI\n\
- How do I do authentication in Node.js?\n\n\
I keep the context of our conversation, so follow-up questions work.";

const CODE_PROMPT_TEXT: &str = "Great, describe the code you need.\n\
For example: 'Write a palindrome check in Python'\n\n\
/cancel - cancel";

const CANCEL_TEXT: &str = "Cancelled.\n\nUse /help for a command overview.";

const FAILURE_NOTICE: &str = "Something went wrong talking to the model.\n\
Check the API key and network connection, then try again.";

/// A formatted outbound reply plus its rendering hint.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    /// Whether the sender should interpret embedded markup.
    pub markdown: bool,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }
}

/// Routes inbound messages. Commands are answered directly; everything
/// else is appended to history, sent with its context to the model, and
/// the formatted completion is returned.
///
/// Processing is serialized per user with a dedicated lock so the
/// append/complete/append sequence never interleaves for one user, while
/// different users proceed in parallel.
pub struct Dispatcher {
    history: HistoryStore,
    context: ContextBuilder,
    llm: Arc<dyn LLMClient>,
    options: GenerationOptions,
    max_response_length: usize,
    locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        system_prompt: impl Into<String>,
        retention_window: usize,
        max_response_length: usize,
        options: GenerationOptions,
    ) -> Self {
        Self {
            history: HistoryStore::new(retention_window),
            context: ContextBuilder::new(system_prompt, retention_window),
            llm,
            options,
            max_response_length,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The conversation store owned by this dispatcher.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Handle one inbound message and produce the reply to send, if any.
    /// Unknown commands are ignored.
    pub async fn dispatch(&self, user: UserId, sender_name: &str, text: &str) -> Option<Reply> {
        if let Some(command) = text.strip_prefix('/') {
            return self.handle_command(user, sender_name, command);
        }
        Some(self.relay(user, text).await)
    }

    fn handle_command(&self, user: UserId, sender_name: &str, command: &str) -> Option<Reply> {
        match command.split_whitespace().next().unwrap_or("") {
            "start" => {
                tracing::info!(user, "user started the bot");
                Some(Reply::plain(welcome(sender_name)))
            }
            "help" => Some(Reply::plain(HELP_TEXT)),
            "code" => Some(Reply::plain(CODE_PROMPT_TEXT)),
            "cancel" => Some(Reply::plain(CANCEL_TEXT)),
            other => {
                tracing::debug!(user, command = other, "ignoring unknown command");
                None
            }
        }
    }

    async fn relay(&self, user: UserId, text: &str) -> Reply {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        self.history.append(user, Role::User, text);
        let prompt = self.context.build(&self.history, user);

        match self.llm.complete(&prompt, &self.options).await {
            Ok(completion) => {
                self.history.append(user, Role::Assistant, completion.clone());
                tracing::info!(user, chars = completion.len(), "relayed completion");
                Reply {
                    text: format_response(&completion, self.max_response_length),
                    markdown: true,
                }
            }
            Err(error) => {
                // The user's turn stays; no assistant turn is recorded.
                tracing::error!(user, %error, "completion failed");
                Reply::plain(FAILURE_NOTICE)
            }
        }
    }

    fn user_lock(&self, user: UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(user).or_default().clone()
    }
}

fn welcome(sender_name: &str) -> String {
    let name = if sender_name.is_empty() {
        "there"
    } else {
        sender_name
    };
    format!(
        "Hi, {name}!\n\n\
         I'm an AI bot for writing code.\n\n\
         Send me:\n\
         - /code to start writing code\n\
         - /help for a command overview\n\
         - or any message describing the code you need\n\n\
         I'll generate it for you."
    )
}
