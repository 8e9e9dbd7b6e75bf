use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{BlockpadError, Result};

/// Parses a binding such as `"Ctrl+Shift+k"` or `"F1"`.
pub fn parse_key(input: &str) -> Result<KeyEvent> {
    let (mods, key_str) = match input.rsplit_once('+') {
        // "Ctrl++" binds the plus key itself
        Some((head, "")) if head.ends_with('+') => (head.trim_end_matches('+'), "+"),
        Some((head, tail)) => (head, tail),
        None => ("", input),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in mods.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        modifiers |= parse_modifier(part).ok_or_else(|| {
            BlockpadError::Config(format!("Unknown modifier '{}' in key '{}'", part, input))
        })?;
    }

    let key_str = key_str.trim();
    if key_str.is_empty() {
        return Err(BlockpadError::Config(format!("No key code found in '{}'", input)));
    }

    Ok(KeyEvent::new(parse_key_code(key_str)?, modifiers))
}

fn parse_modifier(s: &str) -> Option<KeyModifiers> {
    match s.to_lowercase().as_str() {
        "ctrl" | "control" => Some(KeyModifiers::CONTROL),
        "shift" => Some(KeyModifiers::SHIFT),
        "alt" | "option" => Some(KeyModifiers::ALT),
        "cmd" | "super" | "meta" => Some(KeyModifiers::SUPER),
        _ => None,
    }
}

fn parse_key_code(s: &str) -> Result<KeyCode> {
    let lower = s.to_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" | "bs" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "up" | "↑" => KeyCode::Up,
        "down" | "↓" => KeyCode::Down,
        "left" | "←" => KeyCode::Left,
        "right" | "→" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        f if f.len() > 1 && f.starts_with('f') => {
            let num: u8 = f[1..]
                .parse()
                .map_err(|_| BlockpadError::Config(format!("Invalid function key: {}", s)))?;
            if !(1..=12).contains(&num) {
                return Err(BlockpadError::Config(format!("Function key out of range: F{}", num)));
            }
            KeyCode::F(num)
        }
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => return Err(BlockpadError::Config(format!("Unknown key: {}", s))),
            }
        }
    };
    Ok(code)
}
