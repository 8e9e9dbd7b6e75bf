use crate::api::types::{Block, TextRange, TextStyle};

use super::selection::Selection;
use super::tree::Direction;

/// Keys the engine reacts to, independent of any terminal or windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// What a key press asks the editor to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Merge,
    Remove,
    Create { style: TextStyle },
    Split { at: usize },
    Move(Direction),
    StartSelection,
    SelectAll,
}

/// Maps a key press to an editor action, given the focused block (if any)
/// with its caret range and the current selection.
pub fn decide(input: KeyInput, focused: Option<(&Block, TextRange)>, selection: &Selection) -> KeyAction {
    let Some((block, range)) = focused else {
        return decide_unfocused(input, selection);
    };
    let len = block.text_len();
    let mods = input.modifiers;

    match input.key {
        Key::Char('a') | Key::Char('A') if mods.command() => {
            if range.from == 0 && range.to == len {
                KeyAction::SelectAll
            } else {
                KeyAction::None
            }
        }
        Key::Backspace if range.from == 0 && range.to == 0 => {
            if len > 0 && selection.is_empty() {
                KeyAction::Merge
            } else {
                KeyAction::Remove
            }
        }
        Key::Enter if !mods.shift => {
            if range.is_caret() && range.to == len {
                let style = block
                    .style()
                    .filter(|s| s.is_list())
                    .unwrap_or(TextStyle::Paragraph);
                KeyAction::Create { style }
            } else {
                KeyAction::Split { at: range.from }
            }
        }
        Key::Up if range.from == 0 => vertical(mods, selection, Direction::Backward),
        Key::Down if range.to == len => vertical(mods, selection, Direction::Forward),
        _ => KeyAction::None,
    }
}

fn vertical(mods: Modifiers, selection: &Selection, direction: Direction) -> KeyAction {
    match (mods.shift, selection.is_empty()) {
        (true, true) => KeyAction::StartSelection,
        (true, false) => KeyAction::None,
        (false, _) => KeyAction::Move(direction),
    }
}

fn decide_unfocused(input: KeyInput, selection: &Selection) -> KeyAction {
    match input.key {
        Key::Char('a') | Key::Char('A') if input.modifiers.command() => KeyAction::SelectAll,
        Key::Backspace | Key::Delete if !selection.is_empty() => KeyAction::Remove,
        _ => KeyAction::None,
    }
}
