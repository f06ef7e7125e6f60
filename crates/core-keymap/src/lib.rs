//! core-keymap: named actions and their key bindings.
//!
//! Design principles:
//! - Pure and deterministic: `resolve` depends only on the key and the map.
//! - One action may carry several bindings and one key may serve several
//!   actions; callers decide precedence by the order they query actions in.
//! - Bindings use the same notation as `KeyEvent`'s `Display` (`ctrl+d`,
//!   `alt+n`, `pgdown`, `space`, single characters).

use std::collections::BTreeMap;
use std::fmt;

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace, warn};

macro_rules! key_actions {
    ($($variant:ident => $name:literal,)*) => {
        /// Every bindable action.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum KeyAction {
            $($variant,)*
        }

        impl KeyAction {
            pub const ALL: &'static [KeyAction] = &[$(KeyAction::$variant,)*];

            /// Config name, e.g. `jump_to_parent`.
            pub fn name(self) -> &'static str {
                match self {
                    $(KeyAction::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(KeyAction::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

key_actions! {
    Up => "up",
    Down => "down",
    ScrollUp => "scroll_up",
    ScrollDown => "scroll_down",
    JumpToParent => "jump_to_parent",
    JumpToChildren => "jump_to_children",
    JumpToWorkingCopy => "jump_to_working_copy",
    Top => "top",
    Bottom => "bottom",
    ToggleSelect => "toggle_select",
    Cancel => "cancel",
    Apply => "apply",
    QuickSearch => "quick_search",
    QuickSearchNext => "quick_search_next",
    QuickSearchPrev => "quick_search_prev",
    CopyCommitSha => "copy_commit_sha",
    CopyChangeId => "copy_change_id",
    Details => "details",
    CloseDetails => "close_details",
    InlineDescribe => "inline_describe",
    New => "new",
    NewNoEdit => "new_no_edit",
    Edit => "edit",
    ForceEdit => "force_edit",
    Absorb => "absorb",
    Abandon => "abandon",
    Rebase => "rebase",
    Squash => "squash",
    Refresh => "refresh",
    Quit => "quit",
    RebaseRevision => "rebase_revision",
    RebaseDescendants => "rebase_descendants",
    RebaseBranch => "rebase_branch",
    RebaseOnto => "rebase_onto",
    RebaseAfter => "rebase_after",
    RebaseBefore => "rebase_before",
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("empty key binding")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// A single key with required modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyBinding {
    pub fn parse(text: &str) -> Result<Self, BindingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BindingError::Empty);
        }
        // A lone "+" is the plus key, not a separator.
        let (mod_part, key_part) = match text.rsplit_once('+') {
            Some((mods, key)) if !key.is_empty() => (Some(mods), key),
            _ => (None, text),
        };
        let mut mods = KeyModifiers::empty();
        if let Some(mod_part) = mod_part {
            for m in mod_part.split('+') {
                mods |= match m.to_ascii_lowercase().as_str() {
                    "ctrl" | "control" | "c" => KeyModifiers::CTRL,
                    "alt" | "meta" | "m" => KeyModifiers::ALT,
                    "shift" | "s" => KeyModifiers::SHIFT,
                    other => return Err(BindingError::UnknownModifier(other.to_string())),
                };
            }
        }
        let code = parse_key_name(key_part)?;
        Ok(Self { code, mods })
    }

    /// Printable characters already encode shift, so it is ignored for them.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if self.code != key.code {
            return false;
        }
        let relevant = if matches!(key.code, KeyCode::Char(_)) {
            KeyModifiers::CTRL | KeyModifiers::ALT
        } else {
            KeyModifiers::all()
        };
        (key.mods & relevant) == (self.mods & relevant)
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&KeyEvent::new(self.code, self.mods), f)
    }
}

fn parse_key_name(name: &str) -> Result<KeyCode, BindingError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" | "pageup" => KeyCode::PageUp,
        "pgdown" | "pagedown" => KeyCode::PageDown,
        "delete" | "del" => KeyCode::Delete,
        other => {
            if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                KeyCode::F(n)
            } else {
                return Err(BindingError::UnknownKey(name.to_string()));
            }
        }
    };
    Ok(code)
}

type Bindings = SmallVec<[KeyBinding; 2]>;

/// Action → bindings table.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: BTreeMap<KeyAction, Bindings>,
}

const DEFAULTS: &[(KeyAction, &[&str])] = &[
    (KeyAction::Up, &["k", "up"]),
    (KeyAction::Down, &["j", "down"]),
    (KeyAction::ScrollUp, &["pgup", "ctrl+u"]),
    (KeyAction::ScrollDown, &["pgdown", "ctrl+d"]),
    (KeyAction::JumpToParent, &["J"]),
    (KeyAction::JumpToChildren, &["K"]),
    (KeyAction::JumpToWorkingCopy, &["@"]),
    (KeyAction::Top, &["g", "home"]),
    (KeyAction::Bottom, &["G", "end"]),
    (KeyAction::ToggleSelect, &["space"]),
    (KeyAction::Cancel, &["esc"]),
    (KeyAction::Apply, &["enter"]),
    (KeyAction::QuickSearch, &["/"]),
    (KeyAction::QuickSearchNext, &["n"]),
    (KeyAction::QuickSearchPrev, &["N"]),
    (KeyAction::CopyCommitSha, &["y"]),
    (KeyAction::CopyChangeId, &["C"]),
    (KeyAction::Details, &["l"]),
    (KeyAction::CloseDetails, &["h", "left"]),
    (KeyAction::InlineDescribe, &["enter"]),
    (KeyAction::New, &["n"]),
    (KeyAction::NewNoEdit, &["alt+n"]),
    (KeyAction::Edit, &["e"]),
    (KeyAction::ForceEdit, &["alt+e"]),
    (KeyAction::Absorb, &["A"]),
    (KeyAction::Abandon, &["a"]),
    (KeyAction::Rebase, &["r"]),
    (KeyAction::Squash, &["s"]),
    (KeyAction::Refresh, &["ctrl+r"]),
    (KeyAction::Quit, &["q"]),
    (KeyAction::RebaseRevision, &["r"]),
    (KeyAction::RebaseDescendants, &["s"]),
    (KeyAction::RebaseBranch, &["b"]),
    (KeyAction::RebaseOnto, &["d"]),
    (KeyAction::RebaseAfter, &["a"]),
    (KeyAction::RebaseBefore, &["B"]),
];

impl Default for KeyMap {
    fn default() -> Self {
        let mut bindings = BTreeMap::new();
        for (action, keys) in DEFAULTS {
            let parsed: Bindings = keys.iter().filter_map(|k| KeyBinding::parse(k).ok()).collect();
            bindings.insert(*action, parsed);
        }
        Self { bindings }
    }
}

impl KeyMap {
    /// Replace the bindings of named actions. Unknown action names and
    /// unparsable bindings are logged and skipped.
    pub fn with_overrides<'a, I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a K)>,
        K: AsRef<[String]> + 'a,
    {
        for (name, keys) in overrides {
            let Some(action) = KeyAction::from_name(name) else {
                warn!(target: "config.keys", action = %name, "unknown_key_action");
                continue;
            };
            let mut parsed = Bindings::new();
            for key in keys.as_ref() {
                match KeyBinding::parse(key) {
                    Ok(binding) => parsed.push(binding),
                    Err(err) => {
                        warn!(target: "config.keys", action = %name, binding = %key, %err, "invalid_key_binding")
                    }
                }
            }
            debug!(target: "config.keys", action = %name, count = parsed.len(), "override");
            self.bindings.insert(action, parsed);
        }
        self
    }

    pub fn bindings(&self, action: KeyAction) -> &[KeyBinding] {
        self.bindings.get(&action).map(|b| b.as_slice()).unwrap_or(&[])
    }

    pub fn matches(&self, key: &KeyEvent, action: KeyAction) -> bool {
        self.bindings(action).iter().any(|b| b.matches(key))
    }

    /// First of `candidates` bound to `key`.
    pub fn resolve(&self, key: &KeyEvent, candidates: &[KeyAction]) -> Option<KeyAction> {
        let found = candidates.iter().copied().find(|a| self.matches(key, *a));
        trace!(target: "input.keymap", key = %key, action = ?found, "resolve");
        found
    }

    /// Human-readable bindings for help text, e.g. `j/down`.
    pub fn describe(&self, action: KeyAction) -> String {
        self.bindings(action)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}
