//! Canonical key events and the wall clock they are stamped with.

use std::fmt;

use chrono::{Local, NaiveDateTime, SubsecRound};
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Timestamp layout used in log rows and transcript lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Wall-clock source. Readings are truncated to whole seconds by the callers.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local time of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}

/// Whole-second reading of `clock`.
pub fn now_seconds(clock: &dyn Clock) -> NaiveDateTime {
    clock.now().trunc_subsecs(0)
}

/// Key notification as delivered by the focus-gated source: the typed
/// character (if any) plus the symbolic key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKey {
    pub ch: Option<char>,
    pub keysym: String,
}

impl RawKey {
    pub fn char(ch: char, keysym: impl Into<String>) -> Self {
        Self {
            ch: Some(ch),
            keysym: keysym.into(),
        }
    }

    pub fn named(keysym: impl Into<String>) -> Self {
        Self {
            ch: None,
            keysym: keysym.into(),
        }
    }
}

/// How a key press is written out: a quoted character or a symbolic key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRepr {
    Char { ch: char, keysym: String },
    Key { name: String },
}

impl KeyRepr {
    /// Printable characters keep their glyph; everything else (including
    /// Return and Tab, which are control characters) is named.
    pub fn from_raw(raw: &RawKey) -> Self {
        match raw.ch {
            Some(ch) if is_printable(ch) => KeyRepr::Char {
                ch,
                keysym: raw.keysym.clone(),
            },
            _ => KeyRepr::Key {
                name: raw.keysym.clone(),
            },
        }
    }
}

impl fmt::Display for KeyRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRepr::Char { ch, keysym } => {
                write!(f, "CHAR('{}') keysym={keysym}", escape_char(*ch))
            }
            KeyRepr::Key { name } => write!(f, "KEY({name})"),
        }
    }
}

/// ASCII space, or anything outside the separator (Z*) and other (C*)
/// category groups.
fn is_printable(ch: char) -> bool {
    ch == ' '
        || !matches!(
            ch.general_category_group(),
            GeneralCategoryGroup::Separator | GeneralCategoryGroup::Other
        )
}

fn escape_char(ch: char) -> String {
    match ch {
        '\r' | '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

/// Immutable record of one observed key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub timestamp: NaiveDateTime,
    pub repr: KeyRepr,
}

impl KeyEvent {
    pub fn new(timestamp: NaiveDateTime, repr: KeyRepr) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            repr,
        }
    }

    pub fn timestamp_text(&self) -> String {
        format_timestamp(self.timestamp)
    }

    pub fn representation(&self) -> String {
        self.repr.to_string()
    }

    /// Line shown in the transcript for this event.
    pub fn transcript_line(&self) -> String {
        format!("{}\t{}", self.timestamp_text(), self.repr)
    }
}
