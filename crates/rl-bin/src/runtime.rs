//! Event loop: selects over terminal/tick events and engine messages,
//! renders after every handled item, and tears down event sources in order
//! on exit.

use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use core_events::{Event, InputEvent};
use core_render::RenderEngine;
use core_revisions::Msg;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use crate::app::{App, LoopControl, ShutdownReason};

pub struct Runtime<'a> {
    app: App,
    engine: RenderEngine,
    rx: mpsc::Receiver<Event>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<JoinHandle<()>>,
    input_task: Option<JoinHandle<()>>,
    input_shutdown: Option<core_input::AsyncInputShutdown>,
    _terminal_guard: core_terminal::TerminalGuard<'a>,
}

pub struct Channels {
    pub tx: mpsc::Sender<Event>,
    pub rx: mpsc::Receiver<Event>,
    pub msg_rx: mpsc::UnboundedReceiver<Msg>,
}

pub struct InputHandles {
    pub input_task: JoinHandle<()>,
    pub input_shutdown: core_input::AsyncInputShutdown,
    pub source_handles: Vec<JoinHandle<()>>,
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

impl<'a> Runtime<'a> {
    pub fn new(
        app: App,
        channels: Channels,
        handles: InputHandles,
        terminal_guard: core_terminal::TerminalGuard<'a>,
    ) -> Self {
        Self {
            app,
            engine: RenderEngine::new(),
            rx: channels.rx,
            msg_rx: channels.msg_rx,
            tx: Some(channels.tx),
            source_handles: handles.source_handles,
            input_task: Some(handles.input_task),
            input_shutdown: Some(handles.input_shutdown),
            _terminal_guard: terminal_guard,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        if let LoopControl::Break { reason } = self.app.start() {
            shutdown_reason = reason;
        } else {
            self.render();
            loop {
                let control = tokio::select! {
                    event = self.rx.recv() => match event {
                        Some(event) => self.handle_event(&event),
                        None => break,
                    },
                    Some(msg) = self.msg_rx.recv() => self.app.handle_msg(msg),
                };
                match control {
                    LoopControl::Break { reason } => {
                        shutdown_reason = reason;
                        break;
                    }
                    LoopControl::Continue => self.render(),
                }
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) -> LoopControl {
        if let Event::Input(InputEvent::Resize(..)) = event {
            self.engine.invalidate_for_resize();
        }
        self.app.handle_event(event)
    }

    fn render(&mut self) {
        let frame = self.app.compose();
        let mut out = stdout().lock();
        if let Err(e) = self.engine.render(frame, &mut out) {
            error!(target: "render.engine", ?e, "render_error");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");
        if let Some(tx) = self.tx.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "dropping_runtime_sender"
            );
            drop(tx);
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_stopped"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "event_source_task_error"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_timeout"
                ),
            }
        }

        if let Some(shutdown) = self.input_shutdown.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "input_task_shutdown_signal"
            );
            shutdown.signal();
        }

        if let Some(handle) = self.input_task.take() {
            match handle.await {
                Ok(_) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_joined"
                ),
                Err(err) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Err(err) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
            }
        }

        log_shutdown_stage(reason, "complete");
    }
}
