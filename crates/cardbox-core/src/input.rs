//! Input events delivered to a board by its host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    /// Platform "command" modifier: ctrl, or meta on macOS keyboards.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Navigation direction on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Unit step in content coordinates.
    pub fn delta(self) -> (f64, f64) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }
}

/// Keys the board cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Arrow(Direction),
    Delete,
    Escape,
    Character(String),
    Other,
}

impl Key {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Key::Arrow(d) => Some(*d),
            _ => None,
        }
    }

    /// Map a key name as reported by common windowing layers.
    pub fn from_name(name: &str) -> Key {
        match name {
            "ArrowLeft" | "Left" => Key::Arrow(Direction::Left),
            "ArrowRight" | "Right" => Key::Arrow(Direction::Right),
            "ArrowUp" | "Up" => Key::Arrow(Direction::Up),
            "ArrowDown" | "Down" => Key::Arrow(Direction::Down),
            "Delete" | "Backspace" => Key::Delete,
            "Escape" => Key::Escape,
            s if s.chars().count() == 1 => Key::Character(s.to_string()),
            _ => Key::Other,
        }
    }
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Pointer events in client (viewport) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    /// The host lost mouse capture mid-drag. Anything in progress is dropped.
    CaptureLost,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::CaptureLost => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("ArrowUp"), Key::Arrow(Direction::Up));
        assert_eq!(Key::from_name("Backspace"), Key::Delete);
        assert_eq!(Key::from_name("a"), Key::Character("a".to_string()));
        assert_eq!(Key::from_name("F13"), Key::Other);
    }

    #[test]
    fn test_modifier_constants() {
        assert!(Modifiers::SHIFT.shift && !Modifiers::SHIFT.alt);
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(!Modifiers::ALT.command());
    }

    #[test]
    fn test_capture_lost_has_no_position() {
        assert_eq!(PointerEvent::CaptureLost.position(), None);
        let up = PointerEvent::Up {
            position: Point::new(1.0, 2.0),
            button: MouseButton::Left,
        };
        assert_eq!(up.position(), Some(Point::new(1.0, 2.0)));
    }
}
