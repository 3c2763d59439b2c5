use crate::dispatcher::Dispatcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Long-poll wait passed to `getUpdates`.
const POLL_TIMEOUT: Duration = Duration::from_secs(50);
/// Pause before re-polling after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Ways a Bot API call can fail.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with `ok: false`.
    #[error("telegram api error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

impl<T> ApiReply<T> {
    fn into_result(self) -> Result<T, TelegramError> {
        if self.ok {
            self.result
                .ok_or_else(|| TelegramError::Api("ok reply without result".into()))
        } else {
            Err(TelegramError::Api(
                self.description.unwrap_or_else(|| "unknown error".into()),
            ))
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Serialize)]
struct SendChatAction {
    chat_id: i64,
    action: &'static str,
}

/// Minimal Telegram Bot API client: long polling in, messages out.
pub struct TelegramBot {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl TelegramBot {
    /// Create a client against `base_url` (normally `https://api.telegram.org`).
    pub fn new(client: reqwest::Client, base_url: Url, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.token,
            method
        )
    }

    /// Identify the bot account. Useful as a startup credential check.
    pub async fn get_me(&self) -> Result<TgUser, TelegramError> {
        let reply: ApiReply<TgUser> = self
            .client
            .get(self.endpoint("getMe"))
            .send()
            .await?
            .json()
            .await?;
        reply.into_result()
    }

    /// Fetch updates past `offset`, long-polling up to `timeout`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let reply: ApiReply<Vec<Update>> = self
            .client
            .get(self.endpoint("getUpdates"))
            .query(&[("offset", offset), ("timeout", timeout.as_secs() as i64)])
            // The request must outlive the server-side long poll.
            .timeout(timeout + Duration::from_secs(10))
            .send()
            .await?
            .json()
            .await?;
        reply.into_result()
    }

    /// Send `text` to a chat. With `markdown` set, Telegram renders
    /// embedded markup.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
    ) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: markdown.then_some("Markdown"),
        };
        let reply: ApiReply<serde_json::Value> = self
            .client
            .post(self.endpoint("sendMessage"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        reply.into_result().map(|_| ())
    }

    /// Show the typing indicator in a chat.
    pub async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError> {
        let body = SendChatAction {
            chat_id,
            action: "typing",
        };
        let reply: ApiReply<serde_json::Value> = self
            .client
            .post(self.endpoint("sendChatAction"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        reply.into_result().map(|_| ())
    }
}

/// Poll for updates forever, dispatching each text message on its own
/// task. Poll failures are logged and retried after a short pause rather
/// than crashing the process.
pub async fn run_polling(bot: Arc<TelegramBot>, dispatcher: Arc<Dispatcher>) {
    tracing::info!("polling for updates");
    let mut offset = 0i64;
    loop {
        let updates = match bot.get_updates(offset, POLL_TIMEOUT).await {
            Ok(updates) => updates,
            Err(error) => {
                tracing::warn!(%error, "update poll failed");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            let chat_id = message.chat.id;
            let sender_name = message
                .from
                .as_ref()
                .map(|user| user.first_name.clone())
                .unwrap_or_default();
            let user_id = message.from.as_ref().map_or(chat_id, |user| user.id);

            let bot = Arc::clone(&bot);
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                if !text.starts_with('/') {
                    if let Err(error) = bot.send_typing(chat_id).await {
                        tracing::debug!(%error, chat_id, "typing action failed");
                    }
                }
                if let Some(reply) = dispatcher.dispatch(user_id, &sender_name, &text).await {
                    if let Err(error) = bot.send_message(chat_id, &reply.text, reply.markdown).await
                    {
                        tracing::error!(%error, chat_id, "failed to send reply");
                    }
                }
            });
        }
    }
}
