use crate::keys::{map_key_event, map_mouse_event};
use core_events::{
    ASYNC_INPUT_STARTS, ASYNC_INPUT_STOP_CHANNEL, ASYNC_INPUT_STOP_ERROR, ASYNC_INPUT_STOP_SIGNAL,
    ASYNC_INPUT_STOP_STREAM, CHANNEL_SEND_FAILURES, Event, InputEvent, KEYPRESS_REPEAT,
    KEYPRESS_TOTAL, KeyCode, KeyEvent, KeyModifiers, MOUSE_EVENTS,
};
use crossterm::event::{Event as CEvent, EventStream};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn a Tokio task forwarding `EventStream` output into the event channel.
pub(crate) fn spawn_async_event_task(
    sender: Sender<Event>,
) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    let (shutdown, listener) = ShutdownListener::new_pair();
    let handle = task::spawn(async move {
        let span = tracing::debug_span!(target: "input.thread", "input_async_task");
        let _enter = span.enter();
        let stream = EventStream::new();
        AsyncEventStreamTask::new(sender, stream, listener)
            .run()
            .await;
    });

    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Running,
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Running => "running",
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }

    /// Telemetry counter for a finished task; a task still running has none.
    fn stop_counter(self) -> Option<&'static AtomicU64> {
        match self {
            ExitReason::ShutdownSignal => Some(&ASYNC_INPUT_STOP_SIGNAL),
            ExitReason::ChannelClosed => Some(&ASYNC_INPUT_STOP_CHANNEL),
            ExitReason::StreamEnded => Some(&ASYNC_INPUT_STOP_STREAM),
            ExitReason::StreamError => Some(&ASYNC_INPUT_STOP_ERROR),
            ExitReason::Running => None,
        }
    }
}

struct AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    sender: Sender<Event>,
    stream: S,
    shutdown: ShutdownListener,
    exit_reason: ExitReason,
    stream_error: Option<io::ErrorKind>,
}

impl<S> AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    fn new(sender: Sender<Event>, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            stream,
            shutdown,
            exit_reason: ExitReason::Running,
            stream_error: None,
        }
    }

    async fn run(mut self) {
        info!(target: "input.thread", "async_input_task_started");
        ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
        self.exit_reason = ExitReason::StreamEnded;
        loop {
            let maybe_result = tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    self.exit_reason = ExitReason::ShutdownSignal;
                    break;
                }
                result = self.stream.next() => result,
            };

            let Some(result) = maybe_result else {
                break;
            };

            let keep_going = match result {
                Ok(event) => self.forward(event).await,
                Err(err) => {
                    self.exit_reason = ExitReason::StreamError;
                    self.stream_error = Some(err.kind());
                    false
                }
            };
            if !keep_going {
                break;
            }
        }

        let reason = match self.exit_reason {
            ExitReason::Running => ExitReason::StreamEnded,
            other => other,
        };

        if let Some(counter) = reason.stop_counter() {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        if matches!(reason, ExitReason::StreamError) {
            warn!(target: "input.thread", error_kind = ?self.stream_error, "async_input_task_stream_error");
        }

        info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    }

    /// Returns false once the consumer has gone away.
    async fn forward(&mut self, event: CEvent) -> bool {
        match event {
            CEvent::Key(key) => {
                let Some(key) = map_key_event(&key) else {
                    return true;
                };
                if key.code == KeyCode::Char('c') && key.mods.contains(KeyModifiers::CTRL) {
                    return self.send_event(Event::Input(InputEvent::CtrlC)).await;
                }
                self.emit_keypress(key).await
            }
            CEvent::Mouse(mouse) => {
                let Some(mouse) = map_mouse_event(&mouse) else {
                    return true;
                };
                // Motion without a button is noise for a list view.
                if matches!(mouse.kind, core_events::MouseEventKind::Moved) {
                    return true;
                }
                trace!(target: "input.event", kind = "mouse", row = mouse.row, column = mouse.column);
                let sent = self.send_event(Event::Input(InputEvent::Mouse(mouse))).await;
                if sent {
                    MOUSE_EVENTS.fetch_add(1, Ordering::Relaxed);
                }
                sent
            }
            CEvent::Resize(w, h) => {
                trace!(target: "input.event", w, h, "resize");
                self.send_event(Event::Input(InputEvent::Resize(w, h))).await
            }
            CEvent::FocusGained => self.send_event(Event::Input(InputEvent::FocusGained)).await,
            CEvent::FocusLost => self.send_event(Event::Input(InputEvent::FocusLost)).await,
            CEvent::Paste(data) => {
                trace!(target: "input.event", len = data.len(), "paste_ignored");
                true
            }
        }
    }

    async fn emit_keypress(&mut self, key: KeyEvent) -> bool {
        // The key itself is not logged; quick-search input may be sensitive.
        trace!(
            target: "input.event",
            kind = "keypress",
            repeat = key.repeat,
            mods = ?key.mods,
            key_kind = key_kind_label(&key.code)
        );
        let repeat = key.repeat;
        let sent = self.send_event(Event::Input(InputEvent::Key(key))).await;
        if sent {
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
            if repeat {
                KEYPRESS_REPEAT.fetch_add(1, Ordering::Relaxed);
            }
        }
        sent
    }

    async fn send_event(&mut self, event: Event) -> bool {
        match self.sender.send(event).await {
            Ok(_) => true,
            Err(_) => {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                if !matches!(self.exit_reason, ExitReason::ShutdownSignal) {
                    self.exit_reason = ExitReason::ChannelClosed;
                }
                false
            }
        }
    }
}

fn key_kind_label(code: &KeyCode) -> &'static str {
    match code {
        KeyCode::Char(_) => "char",
        _ => "named",
    }
}
