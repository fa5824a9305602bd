use std::time::Duration;

use chat_widget_core::ConversationStoreBuilder;
use chat_widget_model::{Message, MessageKind, Role};
use chat_widget_test_transport::{
    PresetExchange, PresetStream, TestTransport,
};
use tokio::time::timeout;

#[tokio::test]
async fn test_hello_conversation() {
    let mut transport = TestTransport::default();
    transport.add_exchange(PresetExchange::Stream(
        PresetStream::with_records([
            ("start", None),
            ("text", Some("Hel")),
            ("text", Some("lo")),
            ("end", None),
        ])
        .with_delay(Duration::from_millis(150)),
    ));
    let store = ConversationStoreBuilder::with_transport(transport).build();
    let mut state_rx = store.subscribe();
    assert!(store.state().conversation.is_empty());
    assert!(!store.is_loading());

    store.submit("Hi");

    // The placeholder shows up before anything is received.
    let state = timeout(
        Duration::from_secs(3),
        state_rx.wait_for(|s| s.conversation.len() == 2),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(state.loading);
    assert_eq!(
        state.conversation.messages(),
        &[Message::user("Hi"), Message::assistant_placeholder()]
    );

    // Snapshots replace the placeholder in place.
    let state = timeout(
        Duration::from_secs(3),
        state_rx.wait_for(|s| {
            s.conversation.get(1).is_some_and(|msg| msg.content == "Hel")
        }),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(state.conversation.len(), 2);
    assert!(!state.conversation[1].complete);
    assert!(state.loading);

    let state =
        timeout(Duration::from_secs(3), state_rx.wait_for(|s| !s.loading))
            .await
            .unwrap()
            .unwrap()
            .clone();
    assert_eq!(
        state.conversation.messages(),
        &[
            Message::user("Hi"),
            Message::assistant(MessageKind::Text, "Hello", true),
        ]
    );
    assert_eq!(state.conversation.pending_index(), None);
    assert_eq!(
        state
            .conversation
            .iter()
            .map(|msg| msg.role)
            .collect::<Vec<_>>(),
        vec![Role::User, Role::Assistant]
    );
}
