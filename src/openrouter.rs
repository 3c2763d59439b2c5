use crate::history::Turn;
use crate::llm_client::{CompletionError, GenerationOptions, LLMClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Attribution headers OpenRouter uses to rank client applications.
const REFERER: &str = "https://github.com/coderelay/coderelay";
const TITLE: &str = "coderelay";

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// [`LLMClient`] backed by an OpenAI-compatible chat-completions endpoint
/// such as OpenRouter.
#[derive(Clone)]
pub struct OpenRouterLLM {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl OpenRouterLLM {
    /// Create a client for `base_url` (e.g. `https://openrouter.ai/api/v1`).
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// List the model identifiers the endpoint offers.
    pub async fn list_models(&self) -> Result<Vec<String>, CompletionError> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text().await?;
        let list: ModelList = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl LLMClient for OpenRouterLLM {
    async fn complete(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: turns
                .iter()
                .map(|turn| WireMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            "requesting completion"
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "completion endpoint error");
            if status.as_u16() == 401 || body.to_lowercase().contains("invalid_api_key") {
                tracing::error!("the endpoint rejected the API key; check OPENROUTER_API_KEY");
            }
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Malformed("no choices in response".into()))?;
        tracing::debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}
