use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application-level actions. Everything not bound here goes to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Help,
    ClearSelection,
    Reload,
}

impl Action {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quit" => Some(Self::Quit),
            "help" => Some(Self::Help),
            "clear_selection" => Some(Self::ClearSelection),
            "reload" => Some(Self::Reload),
            _ => None,
        }
    }

    pub fn hint_text(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Help => "help",
            Self::ClearSelection => "deselect",
            Self::Reload => "reload",
        }
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
}

pub fn default_preset() -> HashMap<KeyEvent, Action> {
    let mut m = HashMap::new();
    m.insert(ctrl(KeyCode::Char('q')), Action::Quit);
    m.insert(key(KeyCode::F(1)), Action::Help);
    m.insert(key(KeyCode::Esc), Action::ClearSelection);
    m.insert(ctrl(KeyCode::Char('r')), Action::Reload);
    m
}

pub fn vscode_preset() -> HashMap<KeyEvent, Action> {
    let mut m = HashMap::new();
    m.insert(ctrl(KeyCode::Char('w')), Action::Quit);
    m.insert(
        KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
        Action::Help,
    );
    m.insert(key(KeyCode::Esc), Action::ClearSelection);
    m.insert(key(KeyCode::F(5)), Action::Reload);
    m
}

pub fn get_preset(name: &str) -> Option<HashMap<KeyEvent, Action>> {
    match name.to_lowercase().as_str() {
        "default" => Some(default_preset()),
        "vscode" => Some(vscode_preset()),
        _ => None,
    }
}
