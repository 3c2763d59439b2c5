use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Stable identifier for a conversation partner, as assigned by the chat
/// platform.
pub type UserId = i64;

/// Speaker of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Wire label understood by chat-completion endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One message exchanged in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-user conversation histories with bounded retention.
///
/// The store is the sole owner of every history. A history grows with each
/// [`append`](HistoryStore::append) until it exceeds twice the retention
/// window, at which point it collapses to the most recent window of turns.
/// Collapsing only on the `2W` threshold keeps the O(n) truncation rare
/// while never holding more than `2W` turns per user.
///
/// # Examples
///
/// ```
/// use coderelay::{HistoryStore, Role};
///
/// let store = HistoryStore::new(2);
/// for text in ["a", "b", "c", "d", "e"] {
///     store.append(7, Role::User, text);
/// }
/// // Five appends against a window of 2 leave only the last two turns.
/// let recent = store.recent(7, 10);
/// assert_eq!(recent.len(), 2);
/// assert_eq!(recent[1].content, "e");
/// ```
#[derive(Debug)]
pub struct HistoryStore {
    conversations: Mutex<HashMap<UserId, Vec<Turn>>>,
    retention_window: usize,
}

impl HistoryStore {
    /// Create a store retaining `retention_window` turns per user.
    /// `retention_window` must be positive.
    pub fn new(retention_window: usize) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            retention_window,
        }
    }

    /// Append a turn to the user's history, creating the history on first
    /// use. When the history exceeds `2 * retention_window` turns it is
    /// truncated in place to the most recent `retention_window`.
    pub fn append(&self, user: UserId, role: Role, content: impl Into<String>) {
        let mut conversations = self.conversations.lock().unwrap();
        let history = conversations.entry(user).or_default();
        history.push(Turn::new(role, content));
        if history.len() > 2 * self.retention_window {
            let excess = history.len() - self.retention_window;
            history.drain(..excess);
        }
    }

    /// The last `min(limit, stored)` turns for the user in chronological
    /// order. Unknown users yield an empty sequence.
    pub fn recent(&self, user: UserId, limit: usize) -> Vec<Turn> {
        let conversations = self.conversations.lock().unwrap();
        match conversations.get(&user) {
            Some(history) => {
                let start = history.len().saturating_sub(limit);
                history[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Number of turns currently stored for the user.
    pub fn len(&self, user: UserId) -> usize {
        self.conversations
            .lock()
            .unwrap()
            .get(&user)
            .map_or(0, Vec::len)
    }
}
