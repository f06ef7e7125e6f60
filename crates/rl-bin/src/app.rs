//! Terminal-independent half of the runtime: routes loop events and engine
//! messages into the engine, executes the tasks it returns, and owns the
//! status chrome (flash, quick-search prompt) and the mouse line map.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use core_events::{Event, InputEvent, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use core_keymap::KeyAction;
use core_render::list::Chrome;
use core_render::{Frame, LineMap, compose_frame};
use core_revisions::{Msg, Notice, RevisionsModel, Task};
use tracing::{debug, info, trace};

use crate::chrome::{FlashSlot, Prompt, PromptOutcome};
use crate::executor::Executor;

/// Rows moved per wheel notch.
const WHEEL_STEP: isize = 3;

pub enum LoopControl {
    Continue,
    Break { reason: ShutdownReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    CtrlC,
    Quit,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CtrlC => "ctrl_c",
            ShutdownReason::Quit => "quit",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppSettings {
    pub flash_ttl: Duration,
    pub auto_refresh: Option<Duration>,
}

pub struct App {
    model: RevisionsModel,
    executor: Executor,
    flash: FlashSlot,
    prompt: Prompt,
    line_map: LineMap,
    size: (u16, u16),
    settings: AppSettings,
    last_auto_refresh: Instant,
}

impl App {
    pub fn new(model: RevisionsModel, executor: Executor, settings: AppSettings, size: (u16, u16)) -> Self {
        let mut app = Self {
            model,
            executor,
            flash: FlashSlot::default(),
            prompt: Prompt::default(),
            line_map: LineMap::default(),
            size: (0, 0),
            settings,
            last_auto_refresh: Instant::now(),
        };
        app.resize(size.0, size.1);
        app
    }

    pub fn start(&mut self) -> LoopControl {
        let tasks = self.model.init();
        self.run_tasks(tasks)
    }

    pub fn model(&self) -> &RevisionsModel {
        &self.model
    }

    pub fn flash(&self) -> Option<(&str, bool)> {
        self.flash.get()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.text()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.model.set_viewport_height(height.saturating_sub(1) as usize);
    }

    /// Lay out the current state; remembers the line map for mouse hits.
    pub fn compose(&mut self) -> Frame {
        let chrome = Chrome {
            prompt: self.prompt.text(),
            flash: self.flash.get(),
        };
        let (frame, map) = compose_frame(&self.model, chrome, self.size.0, self.size.1);
        self.line_map = map;
        frame
    }

    pub fn handle_event(&mut self, event: &Event) -> LoopControl {
        match event {
            Event::Input(InputEvent::Key(key)) => self.handle_key(key),
            Event::Input(InputEvent::CtrlC) => {
                info!(target: "runtime", "shutdown");
                LoopControl::Break {
                    reason: ShutdownReason::CtrlC,
                }
            }
            Event::Input(InputEvent::Resize(w, h)) => {
                self.resize(*w, *h);
                LoopControl::Continue
            }
            Event::Input(InputEvent::Mouse(mouse)) => self.handle_mouse(mouse),
            Event::Input(InputEvent::FocusGained | InputEvent::FocusLost) => LoopControl::Continue,
            Event::RenderRequested => LoopControl::Continue,
            Event::Tick => self.handle_tick(Instant::now()),
            Event::Shutdown => LoopControl::Break {
                reason: ShutdownReason::ShutdownEvent,
            },
        }
    }

    pub fn handle_msg(&mut self, msg: Msg) -> LoopControl {
        let tasks = self.model.update(msg);
        self.run_tasks(tasks)
    }

    fn handle_key(&mut self, key: &KeyEvent) -> LoopControl {
        if self.prompt.is_open() {
            return match self.prompt.handle_key(key) {
                PromptOutcome::Submit(term) => {
                    debug!(target: "runtime", term_len = term.len(), "quick_search_submitted");
                    self.handle_msg(Msg::QuickSearch(term))
                }
                PromptOutcome::Pending | PromptOutcome::Cancel => LoopControl::Continue,
            };
        }
        let op = self.model.operation();
        if !op.is_editing() && !op.is_overlay() && self.model.keymap().matches(key, KeyAction::QuickSearch) {
            self.prompt.open();
            return LoopControl::Continue;
        }
        self.handle_msg(Msg::Key(*key))
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> LoopControl {
        let msg = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match self.line_map.row_at(mouse.row) {
                Some(index) => Msg::ItemClicked(index),
                None => return LoopControl::Continue,
            },
            MouseEventKind::ScrollUp => Msg::ViewportScroll(-WHEEL_STEP),
            MouseEventKind::ScrollDown => Msg::ViewportScroll(WHEEL_STEP),
            _ => return LoopControl::Continue,
        };
        self.handle_msg(msg)
    }

    fn handle_tick(&mut self, now: Instant) -> LoopControl {
        if self.flash.tick(now) {
            trace!(target: "runtime", "flash_expired");
        }
        match self.settings.auto_refresh {
            Some(interval) if now.duration_since(self.last_auto_refresh) >= interval => {
                self.last_auto_refresh = now;
                self.handle_msg(Msg::AutoRefresh)
            }
            _ => LoopControl::Continue,
        }
    }

    /// Hand tasks to the executor and act on the notices that come back.
    /// Revset updates are fed straight back into the engine.
    fn run_tasks(&mut self, tasks: Vec<Task>) -> LoopControl {
        let mut pending: VecDeque<Notice> = self.executor.spawn_all(tasks).into();
        while let Some(notice) = pending.pop_front() {
            match notice {
                Notice::Flash { text, error } => {
                    debug!(target: "runtime", error, "flash");
                    self.flash.set(text, error, self.settings.flash_ttl);
                }
                Notice::UpdateRevset(revset) => {
                    info!(target: "runtime", %revset, "revset_updated");
                    let tasks = self.model.update(Msg::UpdateRevset(revset));
                    pending.extend(self.executor.spawn_all(tasks));
                }
                Notice::RevisionsUpdated => {
                    trace!(target: "runtime", rows = self.model.rows().len(), "revisions_updated");
                }
                Notice::Quit => {
                    return LoopControl::Break {
                        reason: ShutdownReason::Quit,
                    };
                }
            }
        }
        LoopControl::Continue
    }
}
