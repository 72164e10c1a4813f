//! Per-connection session loop.
//!
//! Split read/write halves: an outbound forwarder task drains the frame
//! channel and sends periodic Ping frames; the inbound loop turns text
//! frames into pipeline runs. A new command aborts the in-flight run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use folio_core::debug::DebugEntry;
use folio_core::SourceError;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use folio_sources::{book, rss, search};

use super::protocol::{self, Command};
use crate::routes::DebugRoute;
use crate::server::AppState;

/// Handle to the session's bounded outbound queue. A full queue sheds the
/// frame with a warning instead of stalling the pipeline that produced it.
#[derive(Clone)]
struct Outbound {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
}

impl Outbound {
    fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue a frame without waiting. Returns false once the forwarder side
    /// is gone; a dropped frame still counts as a live session.
    fn push(&self, frame: String) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(total, "outbound queue full, dropping frame");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    #[cfg(test)]
    fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Run one debug session from upgrade to disconnect.
#[instrument(skip_all, fields(route = %route))]
pub async fn run_session(socket: WebSocket, route: DebugRoute, state: AppState) {
    let session_id = state.sessions.register(route);
    info!(session = %session_id, "session opened");

    let (mut ws_tx, mut ws_rx) = socket.split();

    if ws_tx
        .send(Message::Text(
            protocol::established_frame(&session_id, route).into(),
        ))
        .await
        .is_err()
    {
        state.sessions.unregister(&session_id);
        return;
    }

    let (out_tx, mut out_rx) = mpsc::channel::<String>(state.config.send_queue);
    let outbound_queue = Outbound::new(out_tx);
    let last_activity = Arc::new(parking_lot::Mutex::new(Instant::now()));

    let ping_interval = Duration::from_secs(state.config.heartbeat_interval_secs);
    let idle_timeout = Duration::from_secs(state.config.heartbeat_timeout_secs);
    let token = state.shutdown.token();
    let activity = last_activity.clone();

    // Outbound forwarder: frames, heartbeat, shutdown close.
    let outbound = tokio::spawn(async move {
        let mut tick = tokio::time::interval(ping_interval);
        let _ = tick.tick().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                frame = out_rx.recv() => {
                    match frame {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = tick.tick() => {
                    if activity.lock().elapsed() > idle_timeout {
                        debug!("idle timeout, closing session");
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Inbound loop: each text frame starts (or restarts) a run.
    let inbound_token = state.shutdown.token();
    let mut current_run: Option<JoinHandle<()>> = None;
    loop {
        let msg = tokio::select! {
            _ = inbound_token.cancelled() => break,
            msg = ws_rx.next() => match msg {
                Some(Ok(msg)) => msg,
                _ => break,
            },
        };
        *last_activity.lock() = Instant::now();
        match msg {
            Message::Text(text) => {
                if let Some(run) = current_run.take() {
                    run.abort();
                }
                current_run = Some(spawn_run(
                    route,
                    text.to_string(),
                    state.clone(),
                    outbound_queue.clone(),
                ));
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Binary(_) => {
                warn!("ignoring binary frame");
            }
        }
    }

    if let Some(run) = current_run.take() {
        run.abort();
    }
    drop(outbound_queue);
    let _ = outbound.await;
    state.sessions.unregister(&session_id);
    info!(session = %session_id, "session closed");
}

/// Parse the command and drive the matching pipeline, forwarding frames
/// into the session's outbound channel.
fn spawn_run(
    route: DebugRoute,
    text: String,
    state: AppState,
    out: Outbound,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let cmd = match protocol::parse_command(route, &text) {
            Ok(cmd) => cmd,
            Err(e) => {
                out.push(protocol::entry_frame(&DebugEntry::error(e.to_string())));
                return;
            }
        };

        match cmd {
            Command::BookDebug { tag, key } => {
                let Some(source) = state.registry.get_book(&tag) else {
                    let entry = DebugEntry::error(SourceError::UnknownSource(tag).to_string());
                    out.push(protocol::entry_frame(&entry));
                    return;
                };
                let (etx, mut erx) = mpsc::channel::<DebugEntry>(64);
                let fetcher = state.fetcher.clone();
                let driver = async move {
                    book::debug_book_source(fetcher.as_ref(), &source, &key, &etx).await;
                };
                let forward = async {
                    while let Some(entry) = erx.recv().await {
                        if !out.push(protocol::entry_frame(&entry)) {
                            break;
                        }
                    }
                };
                tokio::join!(driver, forward);
            }
            Command::RssDebug { tag } => {
                let Some(source) = state.registry.get_rss(&tag) else {
                    let entry = DebugEntry::error(SourceError::UnknownSource(tag).to_string());
                    out.push(protocol::entry_frame(&entry));
                    return;
                };
                let (etx, mut erx) = mpsc::channel::<DebugEntry>(64);
                let fetcher = state.fetcher.clone();
                let driver = async move {
                    rss::debug_rss_source(fetcher.as_ref(), &source, &etx).await;
                };
                let forward = async {
                    while let Some(entry) = erx.recv().await {
                        if !out.push(protocol::entry_frame(&entry)) {
                            break;
                        }
                    }
                };
                tokio::join!(driver, forward);
            }
            Command::Search { key } => {
                let sources = state.registry.enabled_book_sources();
                let (btx, mut brx) = mpsc::channel::<search::SearchBatch>(16);
                let fetcher = state.fetcher.clone();
                let concurrency = state.config.search_concurrency;
                let driver = async move {
                    search::search_all(fetcher.as_ref(), sources, &key, &btx, concurrency).await
                };
                let forward = async {
                    while let Some(batch) = brx.recv().await {
                        if !out.push(protocol::search_result_frame(&batch.hits)) {
                            return false;
                        }
                    }
                    true
                };
                let (total, client_alive) = tokio::join!(driver, forward);
                if client_alive {
                    out.push(protocol::search_finish_frame(total));
                }
            }
        }
    })
}
