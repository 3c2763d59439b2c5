use crate::history::{HistoryStore, Role, Turn, UserId};

/// Derives the bounded prompt sequence sent to the inference endpoint.
///
/// The built context is always the configured system instruction followed
/// by the user's most recent turns, in chronological order. Downstream
/// code maps the turns one-to-one onto the endpoint's message schema, so
/// ordering and role labels matter here.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
    window: usize,
}

impl ContextBuilder {
    /// Create a builder that prepends `system_prompt` and includes up to
    /// `window` trailing turns of history.
    pub fn new(system_prompt: impl Into<String>, window: usize) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            window,
        }
    }

    /// Build the prompt sequence for `user`. The system turn comes first
    /// even when the history is empty or the window is zero.
    pub fn build(&self, history: &HistoryStore, user: UserId) -> Vec<Turn> {
        let tail = history.recent(user, self.window);
        let mut turns = Vec::with_capacity(tail.len() + 1);
        turns.push(Turn::new(Role::System, self.system_prompt.clone()));
        turns.extend(tail);
        turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_turn_comes_first() {
        let store = HistoryStore::new(10);
        store.append(1, Role::User, "hi there");
        store.append(1, Role::Assistant, "hello");

        let builder = ContextBuilder::new("You are helpful", 10);
        let prompt = builder.build(&store, 1);
        assert_eq!(prompt.len(), 3);
        assert_eq!(prompt[0].role, Role::System);
        assert_eq!(prompt[0].content, "You are helpful");
        assert_eq!(prompt[1].content, "hi there");
        assert_eq!(prompt[2].content, "hello");
    }

    #[test]
    fn empty_history_still_yields_system_turn() {
        let store = HistoryStore::new(10);
        let builder = ContextBuilder::new("sys", 10);
        let prompt = builder.build(&store, 99);
        assert_eq!(prompt.len(), 1);
        assert_eq!(prompt[0].role, Role::System);
    }

    #[test]
    fn zero_window_yields_only_system_turn() {
        let store = HistoryStore::new(10);
        store.append(1, Role::User, "ignored");
        let builder = ContextBuilder::new("sys", 0);
        let prompt = builder.build(&store, 1);
        assert_eq!(prompt.len(), 1);
    }

    #[test]
    fn window_bounds_included_history() {
        let store = HistoryStore::new(10);
        for i in 0..8 {
            store.append(1, Role::User, format!("m{i}"));
        }
        let builder = ContextBuilder::new("sys", 3);
        let prompt = builder.build(&store, 1);
        assert_eq!(prompt.len(), 4);
        assert_eq!(prompt[1].content, "m5");
        assert_eq!(prompt[3].content, "m7");
    }
}
