use std::time::Duration;

use chat_widget_model::{Message, MessageKind};
use chat_widget_test_transport::{
    PresetExchange, PresetStream, TestTransport,
};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use super::WidgetState;
use crate::ConversationStoreBuilder;
use crate::stream::{FAILURE_MESSAGE, REJECTED_MESSAGE};

const TIMEOUT: Duration = Duration::from_secs(3);

async fn wait_until(
    state_rx: &mut watch::Receiver<WidgetState>,
    f: impl FnMut(&WidgetState) -> bool,
) -> WidgetState {
    timeout(TIMEOUT, state_rx.wait_for(f))
        .await
        .unwrap()
        .unwrap()
        .clone()
}

fn slow_stream() -> PresetExchange {
    PresetExchange::Stream(
        PresetStream::with_records([
            ("text", Some("slow ")),
            ("text", Some("answer")),
        ])
        .with_delay(Duration::from_millis(300)),
    )
}

#[tokio::test]
async fn test_on_idle() {
    let mut transport = TestTransport::default();
    transport.add_exchange(PresetExchange::Stream(
        PresetStream::with_records([
            ("text", Some("Hi, ")),
            ("text", Some("what can I do for you?")),
        ]),
    ));

    let (idle_tx, mut idle_rx) = watch::channel::<bool>(false);

    let store = ConversationStoreBuilder::with_transport(transport)
        .on_idle(move || {
            idle_tx.send(true).unwrap();
        })
        .build();
    store.submit("Hello");

    timeout(TIMEOUT, idle_rx.wait_for(|v| *v))
        .await
        .unwrap()
        .unwrap();
    let state = store.state();
    assert!(!state.loading);
    assert_eq!(state.conversation[1].content, "Hi, what can I do for you?");
}

#[tokio::test]
async fn test_rejected() {
    let mut transport = TestTransport::default();
    transport.add_exchange(PresetExchange::Rejected);
    let store = ConversationStoreBuilder::with_transport(transport).build();
    let mut state_rx = store.subscribe();

    store.submit("Hi");
    let state =
        wait_until(&mut state_rx, |s| s.conversation.len() == 2 && !s.loading)
            .await;
    assert_eq!(
        state.conversation.messages(),
        &[
            Message::user("Hi"),
            Message::assistant(MessageKind::Text, REJECTED_MESSAGE, true),
        ]
    );
}

#[tokio::test]
async fn test_failures() {
    let mut transport = TestTransport::default();
    transport.add_exchange(PresetExchange::Stream(
        PresetStream::with_records([
            ("tool_calls", Some("par")),
            ("text", Some("tial")),
        ])
        .with_failure_after(1),
    ));
    transport.add_exchange(PresetExchange::Unreachable);
    let store = ConversationStoreBuilder::with_transport(transport).build();
    let mut state_rx = store.subscribe();

    store.submit("Hi");
    let state =
        wait_until(&mut state_rx, |s| s.conversation.len() == 2 && !s.loading)
            .await;
    assert_eq!(
        state.conversation[1],
        Message::assistant(MessageKind::Text, FAILURE_MESSAGE, true)
    );

    store.submit("Hello?");
    let state =
        wait_until(&mut state_rx, |s| s.conversation.len() == 4 && !s.loading)
            .await;
    assert_eq!(
        state.conversation[3],
        Message::assistant(MessageKind::Text, FAILURE_MESSAGE, true)
    );
}

#[tokio::test]
async fn test_sequential_submits_send_history() {
    let mut transport = TestTransport::default();
    transport.add_exchange(PresetExchange::Stream(
        PresetStream::with_records([("text", Some("One"))]),
    ));
    transport.add_exchange(PresetExchange::Stream(
        PresetStream::with_records([
            ("tool_calls", Some("lookup")),
            ("text", Some(" done")),
        ]),
    ));
    let store =
        ConversationStoreBuilder::with_transport(transport.clone()).build();
    let mut state_rx = store.subscribe();

    store.submit("first");
    wait_until(&mut state_rx, |s| s.conversation.len() == 2 && !s.loading)
        .await;
    store.submit("second");
    let state =
        wait_until(&mut state_rx, |s| s.conversation.len() == 4 && !s.loading)
            .await;
    assert_eq!(
        state.conversation[3],
        Message::assistant(MessageKind::ToolCalls, "lookup done", true)
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages, vec![Message::user("first")]);
    assert_eq!(
        requests[1].messages,
        vec![
            Message::user("first"),
            Message::assistant(MessageKind::Text, "One", true),
            Message::user("second"),
        ]
    );
}

#[tokio::test]
async fn test_submit_supersedes_in_flight_exchange() {
    let mut transport = TestTransport::default();
    transport.add_exchange(slow_stream());
    transport.add_exchange(PresetExchange::Stream(
        PresetStream::with_records([("text", Some("fast"))]),
    ));
    let store =
        ConversationStoreBuilder::with_transport(transport.clone()).build();
    let mut state_rx = store.subscribe();

    store.submit("first");
    wait_until(&mut state_rx, |s| s.conversation.len() == 2).await;
    store.submit("second");

    let state =
        wait_until(&mut state_rx, |s| s.conversation.len() == 4 && !s.loading)
            .await;
    let expected = [
        Message::user("first"),
        Message::assistant(MessageKind::Text, "", true),
        Message::user("second"),
        Message::assistant(MessageKind::Text, "fast", true),
    ];
    assert_eq!(state.conversation.messages(), &expected);

    // The abandoned exchange never writes again.
    sleep(Duration::from_millis(800)).await;
    assert_eq!(store.state().conversation.messages(), &expected);

    let requests = transport.requests();
    assert_eq!(requests[1].messages, expected[..3].to_vec());
}

#[tokio::test]
async fn test_cancel() {
    let mut transport = TestTransport::default();
    transport.add_exchange(slow_stream());
    let store = ConversationStoreBuilder::with_transport(transport).build();
    let mut state_rx = store.subscribe();

    // Nothing to cancel yet.
    store.cancel();
    store.submit("Hi");
    let state = wait_until(&mut state_rx, |s| s.conversation.len() == 2).await;
    assert!(state.loading);

    store.cancel();
    let state = wait_until(&mut state_rx, |s| !s.loading).await;
    let expected = [
        Message::user("Hi"),
        Message::assistant(MessageKind::Text, "", true),
    ];
    assert_eq!(state.conversation.messages(), &expected);

    sleep(Duration::from_millis(800)).await;
    assert_eq!(store.state().conversation.messages(), &expected);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_drop_stops_store() {
    let mut transport = TestTransport::default();
    transport.add_exchange(slow_stream());
    let store = ConversationStoreBuilder::with_transport(transport).build();
    let mut state_rx = store.subscribe();

    store.submit("Hi");
    wait_until(&mut state_rx, |s| s.conversation.len() == 2).await;
    drop(store);

    // The sender side goes away once the store task terminates.
    timeout(TIMEOUT, async {
        while state_rx.changed().await.is_ok() {}
    })
    .await
    .unwrap();
    assert!(state_rx.borrow().loading);
}
