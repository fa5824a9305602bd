use std::fmt::{self, Debug};

use chat_widget_model::{ChatRequest, Message};
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::WidgetState;
use crate::conversation::Conversation;
use crate::stream::Outcome;
use crate::transport_client::TransportClient;

pub enum Command {
    Submit(String),
    Cancel,
    Snapshot { exchange_id: u64, message: Message },
    ExchangeEnded { exchange_id: u64, outcome: Outcome },
}

impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Submit(content) => {
                f.debug_tuple("Submit").field(&content.len()).finish()
            }
            Command::Cancel => f.write_str("Cancel"),
            Command::Snapshot {
                exchange_id,
                message,
            } => f
                .debug_struct("Snapshot")
                .field("exchange_id", exchange_id)
                .field("complete", &message.complete)
                .finish_non_exhaustive(),
            Command::ExchangeEnded { exchange_id, .. } => f
                .debug_struct("ExchangeEnded")
                .field("exchange_id", exchange_id)
                .finish_non_exhaustive(),
        }
    }
}

/// The exchange currently bound to a placeholder.
struct InFlight {
    id: u64,
    index: usize,
    task: JoinHandle<()>,
}

pub struct StoreState {
    client: TransportClient,
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_tx: watch::Sender<WidgetState>,
    on_idle: Option<Box<dyn Fn() + Send + Sync>>,

    conversation: Conversation,
    in_flight: Option<InFlight>,
    next_exchange_id: u64,
}

impl StoreState {
    pub fn new(
        client: TransportClient,
        cmd_tx: mpsc::UnboundedSender<Command>,
        state_tx: watch::Sender<WidgetState>,
        on_idle: Option<Box<dyn Fn() + Send + Sync>>,
    ) -> Self {
        Self {
            client,
            cmd_tx,
            state_tx,
            on_idle,
            conversation: Default::default(),
            in_flight: None,
            next_exchange_id: 1,
        }
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Submit(content) => self.submit(content),
            Command::Cancel => {
                if self.abandon_in_flight() {
                    self.publish();
                    self.notify_idle();
                }
            }
            Command::Snapshot {
                exchange_id,
                message,
            } => self.apply_snapshot(exchange_id, message),
            Command::ExchangeEnded {
                exchange_id,
                outcome,
            } => self.end_exchange(exchange_id, outcome),
        }
    }

    fn submit(&mut self, content: String) {
        if self.abandon_in_flight() {
            debug!("superseded the previous exchange");
        }

        self.conversation.push(Message::user(content));
        let request = ChatRequest {
            messages: self.conversation.history(),
        };
        let index = self.conversation.push(Message::assistant_placeholder());

        let exchange_id = self.next_exchange_id;
        self.next_exchange_id += 1;

        let exchange_fut = self.client.exchange(request, {
            let cmd_tx = self.cmd_tx.clone();
            move |message| {
                cmd_tx
                    .send(Command::Snapshot {
                        exchange_id,
                        message,
                    })
                    .ok();
            }
        });
        let cmd_tx = self.cmd_tx.clone();
        let task = tokio::spawn(
            async move {
                let outcome = exchange_fut.await;
                cmd_tx
                    .send(Command::ExchangeEnded {
                        exchange_id,
                        outcome,
                    })
                    .ok();
            }
            .instrument(debug_span!("exchange", id = exchange_id)),
        );
        debug!("started exchange {exchange_id} bound to message {index}");

        self.in_flight = Some(InFlight {
            id: exchange_id,
            index,
            task,
        });
        self.publish();
    }

    /// Stops the in-flight exchange and freezes its placeholder. Returns
    /// `false` if nothing was in flight.
    fn abandon_in_flight(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        warn!("abandoning exchange {}", in_flight.id);
        in_flight.task.abort();
        self.conversation.freeze(in_flight.index);
        true
    }

    fn apply_snapshot(&mut self, exchange_id: u64, message: Message) {
        let Some(in_flight) = &self.in_flight else {
            trace!("dropping a snapshot of finished exchange {exchange_id}");
            return;
        };
        if in_flight.id != exchange_id {
            trace!("dropping a stale snapshot of exchange {exchange_id}");
            return;
        }

        let complete = message.complete;
        self.conversation.replace(in_flight.index, message);
        if complete {
            debug!("exchange {exchange_id} reached its terminal snapshot");
            // The task is about to end by itself.
            self.in_flight = None;
        }
        self.publish();
        if complete {
            self.notify_idle();
        }
    }

    fn end_exchange(&mut self, exchange_id: u64, outcome: Outcome) {
        debug!("exchange {exchange_id} ended: {outcome:?}");
        let Some(in_flight) = &self.in_flight else {
            return;
        };
        if in_flight.id != exchange_id {
            return;
        }

        // The terminal snapshot always precedes the end of the task, so
        // this only happens if it was lost on the way.
        warn!("exchange {exchange_id} ended without a terminal snapshot");
        self.apply_snapshot(exchange_id, outcome.into_message());
    }

    fn publish(&self) {
        self.state_tx.send_replace(WidgetState {
            conversation: self.conversation.clone(),
            loading: self.in_flight.is_some(),
        });
    }

    fn notify_idle(&self) {
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    fn shutdown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!("aborting exchange {} on shutdown", in_flight.id);
            in_flight.task.abort();
        }
    }
}

pub async fn run_store(
    mut state: StoreState,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    mut kill_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let cmd = select! {
            biased;

            _ = kill_rx.changed() => {
                break;
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                cmd
            }
        };
        trace!("received command: {cmd:?}");
        state.handle(cmd);
    }
    state.shutdown();
    debug!("will terminate");
}
