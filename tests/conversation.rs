use coderelay::{ContextBuilder, HistoryStore, Role};

#[test]
fn prompt_includes_system_and_tail() {
    const PROMPT: &str = "You are a code assistant";
    let store = HistoryStore::new(10);
    store.append(1, Role::User, "hi there");
    store.append(1, Role::Assistant, "hello");
    store.append(1, Role::User, "how are you");
    store.append(1, Role::Assistant, "great");

    let builder = ContextBuilder::new(PROMPT, 10);
    let prompt = builder.build(&store, 1);
    assert_eq!(prompt.len(), 5);
    assert_eq!(prompt.first().unwrap().role, Role::System);
    assert_eq!(prompt.first().unwrap().content, PROMPT);
    assert_eq!(prompt[1].role, Role::User);
    assert_eq!(prompt[1].content, "hi there");
    assert_eq!(prompt[2].role, Role::Assistant);
    assert_eq!(prompt[2].content, "hello");
}

#[test]
fn retention_follows_the_sawtooth() {
    let store = HistoryStore::new(2);
    store.append(1, Role::User, "a");
    store.append(1, Role::Assistant, "b");
    store.append(1, Role::User, "c");
    assert_eq!(store.len(1), 3);
    store.append(1, Role::Assistant, "d");
    assert_eq!(store.len(1), 4);

    store.append(1, Role::User, "e");
    let kept: Vec<_> = store
        .recent(1, 10)
        .into_iter()
        .map(|turn| (turn.role, turn.content))
        .collect();
    assert_eq!(
        kept,
        vec![
            (Role::Assistant, "d".to_string()),
            (Role::User, "e".to_string()),
        ]
    );
}

#[test]
fn recent_count_is_min_of_limit_and_stored() {
    let store = HistoryStore::new(5);
    for i in 0..4 {
        store.append(3, Role::User, format!("m{i}"));
    }
    assert_eq!(store.recent(3, 2).len(), 2);
    assert_eq!(store.recent(3, 4).len(), 4);
    assert_eq!(store.recent(3, 9).len(), 4);
    assert!(store.recent(4, 9).is_empty());
}
