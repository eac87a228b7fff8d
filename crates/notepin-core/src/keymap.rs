#![forbid(unsafe_code)]

//! Key chord to board command mapping.
//!
//! The text widget forwards the chords it does not consume itself, together
//! with a small [`EditContext`] describing the caret. [`resolve`] turns that
//! into a [`Command`]; anything unmapped is left to the text widget.
//!
//! | Chord                         | Command            |
//! |-------------------------------|--------------------|
//! | `Enter`                       | `AddAfter`         |
//! | `Shift+Enter`                 | none (soft break)  |
//! | `Ctrl+Enter`                  | `ToggleCompletion` |
//! | `Ctrl+D`, `Backspace` (blank) | `DeleteItem`       |
//! | `Up` (first line)             | `FocusPrevious`    |
//! | `Down` (last line)            | `FocusNext`        |
//! | `Ctrl+Up` / `Ctrl+Down`       | `MoveUp` / `MoveDown` |
//! | `Ctrl+Z`                      | `Undo`             |
//! | `Ctrl+Y`, `Ctrl+Shift+Z`      | `Redo`             |
//! | `Ctrl+S`                      | `Save`             |

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

/// Keys the board cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Up,
    Down,
}

/// A key plus its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    #[must_use]
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    #[must_use]
    pub const fn ctrl(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    #[must_use]
    pub fn has_ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub fn has_shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Caret facts supplied by the focused text widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditContext {
    pub caret_on_first_line: bool,
    pub caret_on_last_line: bool,
    pub text_is_blank: bool,
}

/// Board-level command resolved from a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    AddAfter,
    ToggleCompletion,
    DeleteItem,
    FocusPrevious,
    FocusNext,
    MoveUp,
    MoveDown,
    Undo,
    Redo,
    Save,
}

impl Command {
    /// Commands that act on the focused item and need one to exist.
    #[must_use]
    pub const fn needs_focus(self) -> bool {
        !matches!(self, Self::Undo | Self::Redo | Self::Save | Self::AddAfter)
    }
}

/// Resolve a chord. `edit` is `None` when no text widget has focus.
#[must_use]
pub fn resolve(chord: KeyChord, edit: Option<&EditContext>) -> Option<Command> {
    let ctrl = chord.has_ctrl();
    let shift = chord.has_shift();
    match chord.key {
        Key::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'z' if shift => Some(Command::Redo),
            'z' => Some(Command::Undo),
            'y' => Some(Command::Redo),
            's' => Some(Command::Save),
            'd' => Some(Command::DeleteItem),
            _ => None,
        },
        Key::Char(_) => None,
        Key::Enter if ctrl => Some(Command::ToggleCompletion),
        Key::Enter if shift => None,
        Key::Enter => Some(Command::AddAfter),
        Key::Up if ctrl => Some(Command::MoveUp),
        Key::Down if ctrl => Some(Command::MoveDown),
        Key::Up => edit
            .filter(|ctx| ctx.caret_on_first_line)
            .map(|_| Command::FocusPrevious),
        Key::Down => edit
            .filter(|ctx| ctx.caret_on_last_line)
            .map(|_| Command::FocusNext),
        Key::Backspace => edit
            .filter(|ctx| ctx.text_is_blank)
            .map(|_| Command::DeleteItem),
    }
}
