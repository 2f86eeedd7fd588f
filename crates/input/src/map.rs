//! Key mapping from raw keystrokes to game actions.

use crate::types::{GameAction, LobbyAction};

/// Carriage return, sent by telnet clients for Enter
pub const ENTER: u8 = 13;

/// Map a keystroke to a falling-block action.
pub fn map_key(key: u8) -> Option<GameAction> {
    match key.to_ascii_lowercase() {
        b'z' => Some(GameAction::MoveLeft),
        b'x' => Some(GameAction::MoveRight),
        b'a' | b'n' => Some(GameAction::Rotate),
        b's' | b'm' => Some(GameAction::Drop),
        b'c' => Some(GameAction::ToggleColors),
        b'e' => Some(GameAction::Exit),
        _ => None,
    }
}

/// Map a keystroke to a lobby action.
///
/// Digits select a menu entry; whether the entry exists is the lobby's call.
pub fn map_lobby_key(key: u8) -> Option<LobbyAction> {
    match key.to_ascii_lowercase() {
        digit @ b'0'..=b'9' => Some(LobbyAction::Select(digit - b'0')),
        b'c' => Some(LobbyAction::ToggleColors),
        b's' => Some(LobbyAction::ToggleRole),
        b'e' => Some(LobbyAction::Exit),
        _ => None,
    }
}

/// Backspace or delete (terminals disagree on which one the key sends)
pub fn is_backspace(key: u8) -> bool {
    matches!(key, 8 | 127)
}

pub fn is_enter(key: u8) -> bool {
    key == ENTER
}

/// Characters accepted in a scoreboard name
pub fn is_name_char(key: u8) -> bool {
    key.is_ascii_graphic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(b'z'), Some(GameAction::MoveLeft));
        assert_eq!(map_key(b'x'), Some(GameAction::MoveRight));
        assert_eq!(map_key(b'Z'), Some(GameAction::MoveLeft));
        assert_eq!(map_key(b'X'), Some(GameAction::MoveRight));
    }

    #[test]
    fn test_rotation_and_drop_keys() {
        assert_eq!(map_key(b'a'), Some(GameAction::Rotate));
        assert_eq!(map_key(b'n'), Some(GameAction::Rotate));
        assert_eq!(map_key(b's'), Some(GameAction::Drop));
        assert_eq!(map_key(b'M'), Some(GameAction::Drop));
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(map_key(b'c'), Some(GameAction::ToggleColors));
        assert_eq!(map_key(b'e'), Some(GameAction::Exit));
        assert_eq!(map_key(b'q'), None);
        assert_eq!(map_key(0), None);
        assert_eq!(map_key(b' '), None);
    }

    #[test]
    fn test_lobby_keys() {
        assert_eq!(map_lobby_key(b'1'), Some(LobbyAction::Select(1)));
        assert_eq!(map_lobby_key(b'0'), Some(LobbyAction::Select(0)));
        assert_eq!(map_lobby_key(b'C'), Some(LobbyAction::ToggleColors));
        assert_eq!(map_lobby_key(b's'), Some(LobbyAction::ToggleRole));
        assert_eq!(map_lobby_key(b'e'), Some(LobbyAction::Exit));
        assert_eq!(map_lobby_key(b'z'), None);
    }

    #[test]
    fn test_editing_keys() {
        assert!(is_backspace(8));
        assert!(is_backspace(127));
        assert!(!is_backspace(b'h'));
        assert!(is_enter(13));
        assert!(!is_enter(10));
        assert!(is_name_char(b'A'));
        assert!(is_name_char(b'~'));
        assert!(!is_name_char(b' '));
        assert!(!is_name_char(0));
        assert!(!is_name_char(200));
    }
}
