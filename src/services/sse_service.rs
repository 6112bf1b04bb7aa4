use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{dto::sse::ServerEvent, services::sse_events, state::SharedState};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Open the public stream: the current round and rounds history first, live updates after.
pub async fn open_public_stream(
    state: SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading so nothing applied in between is lost.
    let receiver = state.public_sse().subscribe();

    let mut replay = vec![sse_events::info_event("public stream connected")];
    replay.extend(sse_events::round_snapshot_event(&state.snapshot().await));
    replay.extend(sse_events::rounds_updated_event(
        state.rounds().load_rounds().await,
    ));

    info!(
        subscribers = state.public_sse().subscriber_count(),
        "New public SSE connection"
    );
    to_sse_stream(receiver, replay)
}

/// Convert a broadcast receiver into an SSE response: `replay` goes out first, then
/// every broadcast event until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    replay: Vec<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8 + replay.len());

    tokio::spawn(async move {
        for payload in replay {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // Snapshots are full state; a later one supersedes what was skipped.
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "public SSE subscriber lagged");
                        }
                    }
                }
            }
        }

        info!("Public SSE stream disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}
