//! Terminal key events → operator controls or captured keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

use crate::event::RawKey;

/// Operator controls bound to keys that are never captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Arm,
    Disarm,
    ChooseFile,
    SavePreview,
    ClearPreview,
    Quit,
}

impl Action {
    pub fn hint(self) -> (&'static str, &'static str) {
        match self {
            Action::Arm => ("F2", "start"),
            Action::Disarm => ("F3", "stop"),
            Action::ChooseFile => ("F4", "choose file"),
            Action::SavePreview => ("F5", "save preview"),
            Action::ClearPreview => ("F6", "clear preview"),
            Action::Quit => ("F10", "quit"),
        }
    }

    pub const ALL: [Action; 6] = [
        Action::Arm,
        Action::Disarm,
        Action::ChooseFile,
        Action::SavePreview,
        Action::ClearPreview,
        Action::Quit,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Control(Action),
    Key(RawKey),
    Ignored,
}

pub fn classify(key: &KeyEvent) -> Input {
    // Repeats are fine; releases (reported on some platforms) are not presses.
    if key.kind == KeyEventKind::Release {
        return Input::Ignored;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Input::Control(Action::Quit);
    }
    match key.code {
        KeyCode::F(2) => Input::Control(Action::Arm),
        KeyCode::F(3) => Input::Control(Action::Disarm),
        KeyCode::F(4) => Input::Control(Action::ChooseFile),
        KeyCode::F(5) => Input::Control(Action::SavePreview),
        KeyCode::F(6) => Input::Control(Action::ClearPreview),
        KeyCode::F(10) => Input::Control(Action::Quit),
        KeyCode::Null => Input::Ignored,
        _ => Input::Key(raw_key(key)),
    }
}

/// Map a key press to the character it typed (if any) and an X11-style keysym.
pub fn raw_key(key: &KeyEvent) -> RawKey {
    match key.code {
        KeyCode::Char(ch) => {
            let keysym = char_keysym(ch);
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                // Control chords type no printable character.
                RawKey::named(keysym)
            } else {
                RawKey::char(ch, keysym)
            }
        }
        KeyCode::Enter => RawKey::char('\r', "Return"),
        KeyCode::Tab => RawKey::char('\t', "Tab"),
        KeyCode::BackTab => RawKey::named("ISO_Left_Tab"),
        KeyCode::Backspace => RawKey::char('\u{8}', "BackSpace"),
        KeyCode::Esc => RawKey::char('\u{1b}', "Escape"),
        KeyCode::Delete => RawKey::char('\u{7f}', "Delete"),
        KeyCode::Left => RawKey::named("Left"),
        KeyCode::Right => RawKey::named("Right"),
        KeyCode::Up => RawKey::named("Up"),
        KeyCode::Down => RawKey::named("Down"),
        KeyCode::Home => RawKey::named("Home"),
        KeyCode::End => RawKey::named("End"),
        KeyCode::PageUp => RawKey::named("Prior"),
        KeyCode::PageDown => RawKey::named("Next"),
        KeyCode::Insert => RawKey::named("Insert"),
        KeyCode::F(n) => RawKey::named(format!("F{n}")),
        KeyCode::CapsLock => RawKey::named("Caps_Lock"),
        KeyCode::ScrollLock => RawKey::named("Scroll_Lock"),
        KeyCode::NumLock => RawKey::named("Num_Lock"),
        KeyCode::PrintScreen => RawKey::named("Print"),
        KeyCode::Pause => RawKey::named("Pause"),
        KeyCode::Menu => RawKey::named("Menu"),
        KeyCode::KeypadBegin => RawKey::named("KP_Begin"),
        KeyCode::Modifier(modifier) => RawKey::named(modifier_keysym(modifier)),
        other => RawKey::named(format!("{other:?}")),
    }
}

fn modifier_keysym(modifier: ModifierKeyCode) -> &'static str {
    match modifier {
        ModifierKeyCode::LeftShift => "Shift_L",
        ModifierKeyCode::RightShift => "Shift_R",
        ModifierKeyCode::LeftControl => "Control_L",
        ModifierKeyCode::RightControl => "Control_R",
        ModifierKeyCode::LeftAlt => "Alt_L",
        ModifierKeyCode::RightAlt => "Alt_R",
        ModifierKeyCode::LeftSuper => "Super_L",
        ModifierKeyCode::RightSuper => "Super_R",
        ModifierKeyCode::LeftHyper => "Hyper_L",
        ModifierKeyCode::RightHyper => "Hyper_R",
        ModifierKeyCode::LeftMeta => "Meta_L",
        ModifierKeyCode::RightMeta => "Meta_R",
        ModifierKeyCode::IsoLevel3Shift => "ISO_Level3_Shift",
        ModifierKeyCode::IsoLevel5Shift => "ISO_Level5_Shift",
    }
}

pub fn char_keysym(ch: char) -> String {
    let name = match ch {
        ' ' => "space",
        '!' => "exclam",
        '"' => "quotedbl",
        '#' => "numbersign",
        '$' => "dollar",
        '%' => "percent",
        '&' => "ampersand",
        '\'' => "apostrophe",
        '(' => "parenleft",
        ')' => "parenright",
        '*' => "asterisk",
        '+' => "plus",
        ',' => "comma",
        '-' => "minus",
        '.' => "period",
        '/' => "slash",
        ':' => "colon",
        ';' => "semicolon",
        '<' => "less",
        '=' => "equal",
        '>' => "greater",
        '?' => "question",
        '@' => "at",
        '[' => "bracketleft",
        '\\' => "backslash",
        ']' => "bracketright",
        '^' => "asciicircum",
        '_' => "underscore",
        '`' => "grave",
        '{' => "braceleft",
        '|' => "bar",
        '}' => "braceright",
        '~' => "asciitilde",
        other => return other.to_string(),
    };
    name.to_string()
}
