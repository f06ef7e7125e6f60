//! Key → intent translation for the revision list.
//!
//! Navigation keys are translated separately because an active operation may
//! claim keys before the default table but after movement.

use core_events::KeyEvent;
use core_keymap::{KeyAction, KeyMap};
use core_model::SelectedRevisions;

use crate::intent::{Intent, Navigate, NavigateTarget};

const NAVIGATION: &[KeyAction] = &[
    KeyAction::Up,
    KeyAction::Down,
    KeyAction::ScrollUp,
    KeyAction::ScrollDown,
    KeyAction::JumpToParent,
    KeyAction::JumpToChildren,
    KeyAction::JumpToWorkingCopy,
    KeyAction::Top,
    KeyAction::Bottom,
];

pub fn translate_navigation_key(keymap: &KeyMap, key: &KeyEvent) -> Option<Intent> {
    let nav = match keymap.resolve(key, NAVIGATION)? {
        KeyAction::Up => Navigate::by(-1),
        KeyAction::Down => Navigate::by(1),
        KeyAction::ScrollUp => Navigate::page(-1),
        KeyAction::ScrollDown => Navigate::page(1),
        KeyAction::JumpToParent => Navigate::to(NavigateTarget::Parent),
        KeyAction::JumpToChildren => Navigate::to(NavigateTarget::Child),
        KeyAction::JumpToWorkingCopy => Navigate::to(NavigateTarget::WorkingCopy),
        KeyAction::Top => Navigate::to(NavigateTarget::Top),
        KeyAction::Bottom => Navigate::to(NavigateTarget::Bottom),
        _ => return None,
    };
    Some(Intent::Navigate(nav))
}

/// Keys available when no operation claims them. Quick-search bindings only
/// apply while a search term is active, and shadow same-key actions such as
/// `new` on `n`.
pub fn translate_default_key(
    keymap: &KeyMap,
    key: &KeyEvent,
    quick_search_active: bool,
) -> Option<Intent> {
    if quick_search_active && keymap.resolve(key, &[KeyAction::Cancel, KeyAction::Apply]).is_some() {
        return Some(Intent::QuickSearchClear);
    }
    if keymap.matches(key, KeyAction::ToggleSelect) {
        return Some(Intent::ToggleSelect);
    }
    if keymap.matches(key, KeyAction::Cancel) {
        return Some(Intent::Cancel);
    }
    if quick_search_active {
        if keymap.matches(key, KeyAction::QuickSearchNext) {
            return Some(Intent::QuickSearchCycle { reverse: false });
        }
        if keymap.matches(key, KeyAction::QuickSearchPrev) {
            return Some(Intent::QuickSearchCycle { reverse: true });
        }
    }

    let intent = match keymap.resolve(key, DEFAULT_ACTIONS)? {
        KeyAction::CopyCommitSha => Intent::CopyCommitSha,
        KeyAction::CopyChangeId => Intent::CopyChangeId,
        KeyAction::Details => Intent::OpenDetails,
        KeyAction::InlineDescribe => Intent::StartInlineDescribe { selected: None },
        KeyAction::New => Intent::StartNew {
            selected: SelectedRevisions::new(),
            no_edit: false,
        },
        KeyAction::NewNoEdit => Intent::StartNew {
            selected: SelectedRevisions::new(),
            no_edit: true,
        },
        KeyAction::Edit => Intent::StartEdit {
            selected: None,
            ignore_immutable: false,
        },
        KeyAction::ForceEdit => Intent::StartEdit {
            selected: None,
            ignore_immutable: true,
        },
        KeyAction::Absorb => Intent::StartAbsorb { selected: None },
        KeyAction::Abandon => Intent::StartAbandon {
            selected: SelectedRevisions::new(),
        },
        KeyAction::Refresh => Intent::refresh(),
        KeyAction::Squash => Intent::StartSquash {
            selected: SelectedRevisions::new(),
        },
        KeyAction::Rebase => Intent::StartRebase {
            selected: SelectedRevisions::new(),
            source: Default::default(),
            target: Default::default(),
        },
        KeyAction::Quit => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}

const DEFAULT_ACTIONS: &[KeyAction] = &[
    KeyAction::CopyCommitSha,
    KeyAction::CopyChangeId,
    KeyAction::Details,
    KeyAction::InlineDescribe,
    KeyAction::New,
    KeyAction::NewNoEdit,
    KeyAction::Edit,
    KeyAction::ForceEdit,
    KeyAction::Absorb,
    KeyAction::Abandon,
    KeyAction::Refresh,
    KeyAction::Squash,
    KeyAction::Rebase,
    KeyAction::Quit,
];

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn nav(key: KeyEvent) -> Option<Navigate> {
        match translate_navigation_key(&KeyMap::default(), &key)? {
            Intent::Navigate(nav) => Some(nav),
            _ => None,
        }
    }

    #[test]
    fn movement_keys() {
        assert_eq!(nav(KeyEvent::char('j')), Some(Navigate::by(1)));
        assert_eq!(nav(KeyEvent::plain(KeyCode::Up)), Some(Navigate::by(-1)));
        assert_eq!(nav(KeyEvent::ctrl('d')), Some(Navigate::page(1)));
        assert_eq!(
            nav(KeyEvent::char('@')),
            Some(Navigate::to(NavigateTarget::WorkingCopy))
        );
        assert_eq!(nav(KeyEvent::char('G')), Some(Navigate::to(NavigateTarget::Bottom)));
        assert_eq!(nav(KeyEvent::char('x')), None);
    }

    #[test]
    fn search_keys_shadow_new_only_while_active() {
        let keymap = KeyMap::default();
        let n = KeyEvent::char('n');
        assert_eq!(
            translate_default_key(&keymap, &n, true),
            Some(Intent::QuickSearchCycle { reverse: false })
        );
        assert!(matches!(
            translate_default_key(&keymap, &n, false),
            Some(Intent::StartNew { no_edit: false, .. })
        ));
        assert_eq!(
            translate_default_key(&keymap, &KeyEvent::char('N'), true),
            Some(Intent::QuickSearchCycle { reverse: true })
        );
    }

    #[test]
    fn esc_and_enter_clear_active_search() {
        let keymap = KeyMap::default();
        for key in [KeyEvent::plain(KeyCode::Esc), KeyEvent::plain(KeyCode::Enter)] {
            assert_eq!(
                translate_default_key(&keymap, &key, true),
                Some(Intent::QuickSearchClear)
            );
        }
        assert_eq!(
            translate_default_key(&keymap, &KeyEvent::plain(KeyCode::Esc), false),
            Some(Intent::Cancel)
        );
        assert!(matches!(
            translate_default_key(&keymap, &KeyEvent::plain(KeyCode::Enter), false),
            Some(Intent::StartInlineDescribe { selected: None })
        ));
    }

    #[test]
    fn modifier_variants() {
        let keymap = KeyMap::default();
        let alt_e = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::ALT);
        assert_eq!(
            translate_default_key(&keymap, &alt_e, false),
            Some(Intent::StartEdit {
                selected: None,
                ignore_immutable: true
            })
        );
        assert_eq!(
            translate_default_key(&keymap, &KeyEvent::ctrl('r'), false),
            Some(Intent::refresh())
        );
        assert_eq!(
            translate_default_key(&keymap, &KeyEvent::char(' '), false),
            Some(Intent::ToggleSelect)
        );
        assert_eq!(
            translate_default_key(&keymap, &KeyEvent::char('q'), false),
            Some(Intent::Quit)
        );
    }
}
