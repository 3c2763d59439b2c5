use async_trait::async_trait;
use std::sync::Arc;

use coderelay::{
    CompletionError, Dispatcher, GenerationOptions, LLMClient, Role, Turn,
};

struct StaticLLM {
    reply: String,
}

impl StaticLLM {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl LLMClient for StaticLLM {
    async fn complete(
        &self,
        _turns: &[Turn],
        _options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }
}

struct BrokenLLM;

#[async_trait]
impl LLMClient for BrokenLLM {
    async fn complete(
        &self,
        _turns: &[Turn],
        _options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Api {
            status: 500,
            body: "boom".into(),
        })
    }
}

/// Records the prompt it was called with.
struct RecordingLLM {
    seen: std::sync::Mutex<Vec<Vec<(Role, String)>>>,
}

#[async_trait]
impl LLMClient for RecordingLLM {
    async fn complete(
        &self,
        turns: &[Turn],
        _options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        self.seen.lock().unwrap().push(
            turns
                .iter()
                .map(|t| (t.role, t.content.clone()))
                .collect(),
        );
        Ok("noted".to_string())
    }
}

fn dispatcher(llm: Arc<dyn LLMClient>) -> Dispatcher {
    Dispatcher::new(llm, "be helpful", 10, 4000, GenerationOptions::default())
}

#[tokio::test]
async fn relays_a_completion_and_records_both_turns() {
    let d = dispatcher(Arc::new(StaticLLM::new("sure thing")));
    let reply = d.dispatch(7, "Ada", "write me a loop").await.unwrap();
    assert_eq!(reply.text, "sure thing");
    assert!(reply.markdown);

    let history = d.history().recent(7, 10);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "write me a loop");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "sure thing");
}

#[tokio::test]
async fn failure_leaves_only_the_user_turn() {
    let d = dispatcher(Arc::new(BrokenLLM));
    let reply = d.dispatch(7, "Ada", "write me a loop").await.unwrap();
    assert!(!reply.markdown);
    assert!(reply.text.contains("Something went wrong"));

    let history = d.history().recent(7, 10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::User);
}

#[tokio::test]
async fn prompt_carries_system_turn_and_history() {
    let llm = Arc::new(RecordingLLM {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let d = dispatcher(llm.clone());
    d.dispatch(7, "Ada", "first").await.unwrap();
    d.dispatch(7, "Ada", "second").await.unwrap();

    let seen = llm.seen.lock().unwrap();
    // Second call: system + first exchange + the new user turn.
    let second = &seen[1];
    assert_eq!(second[0], (Role::System, "be helpful".to_string()));
    assert_eq!(second[1], (Role::User, "first".to_string()));
    assert_eq!(second[2], (Role::Assistant, "noted".to_string()));
    assert_eq!(second[3], (Role::User, "second".to_string()));
}

#[tokio::test]
async fn commands_reply_without_touching_history() {
    let d = dispatcher(Arc::new(StaticLLM::new("unused")));

    let start = d.dispatch(7, "Ada", "/start").await.unwrap();
    assert!(start.text.contains("Ada"));
    assert!(!start.markdown);

    let help = d.dispatch(7, "Ada", "/help").await.unwrap();
    assert!(help.text.contains("/code"));

    let code = d.dispatch(7, "Ada", "/code").await.unwrap();
    assert!(code.text.contains("describe the code"));

    let cancel = d.dispatch(7, "Ada", "/cancel").await.unwrap();
    assert!(cancel.text.contains("Cancelled"));

    assert!(d.history().recent(7, 10).is_empty());
}

#[tokio::test]
async fn unknown_commands_are_ignored() {
    let d = dispatcher(Arc::new(StaticLLM::new("unused")));
    assert!(d.dispatch(7, "Ada", "/frobnicate").await.is_none());
    assert!(d.history().recent(7, 10).is_empty());
}

#[tokio::test]
async fn long_replies_are_truncated_for_sending_but_stored_whole() {
    let long = "x".repeat(5000);
    let d = dispatcher(Arc::new(StaticLLM::new(long)));
    let reply = d.dispatch(7, "Ada", "go").await.unwrap();
    assert!(reply.text.ends_with("[...response truncated...]"));
    assert!(reply.text.chars().count() <= 4000);

    // History keeps the unformatted completion.
    let history = d.history().recent(7, 10);
    assert_eq!(history[1].content.len(), 5000);
}

#[tokio::test]
async fn users_get_separate_conversations() {
    let d = dispatcher(Arc::new(StaticLLM::new("ok")));
    d.dispatch(1, "Ada", "one").await.unwrap();
    d.dispatch(2, "Grace", "two").await.unwrap();

    assert_eq!(d.history().recent(1, 10)[0].content, "one");
    assert_eq!(d.history().recent(2, 10)[0].content, "two");
}
