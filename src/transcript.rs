//! In-memory mirror of everything the operator typed, armed or not.

/// Intro shown before anything has been typed.
pub const INTRO_LINE: &str = "Preview of keystrokes will appear here. Press F2 to start logging \
                              keys while this window is focused.";
/// The single line left behind by [`TranscriptMirror::clear`].
pub const CLEARED_LINE: &str = "Preview cleared. Press F2 to start logging keys while this \
                                window is focused.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Intro or post-clear placeholder.
    Sentinel,
    /// Session start/stop note. Never written as a data row.
    Marker,
    /// One observed key press.
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub kind: LineKind,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptMirror {
    lines: Vec<TranscriptLine>,
}

impl Default for TranscriptMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptMirror {
    pub fn new() -> Self {
        Self {
            lines: vec![TranscriptLine {
                kind: LineKind::Sentinel,
                text: INTRO_LINE.to_string(),
            }],
        }
    }

    pub fn append(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.push(TranscriptLine {
            kind,
            text: text.into(),
        });
    }

    pub fn append_event(&mut self, text: impl Into<String>) {
        self.append(LineKind::Event, text);
    }

    pub fn append_marker(&mut self, text: impl Into<String>) {
        self.append(LineKind::Marker, text);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.append(LineKind::Sentinel, CLEARED_LINE);
    }

    pub fn snapshot(&self) -> Vec<TranscriptLine> {
        self.lines.clone()
    }

    /// Non-blank line texts, in order, as saved by a manual block save.
    pub fn saveable_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|line| !line.text.trim().is_empty())
            .map(|line| line.text.clone())
            .collect()
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_intro_sentinel() {
        let mirror = TranscriptMirror::new();
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror.lines()[0].kind, LineKind::Sentinel);
        assert_eq!(mirror.lines()[0].text, INTRO_LINE);
    }

    #[test]
    fn clear_leaves_exactly_one_sentinel_then_appends_after_it() {
        let mut mirror = TranscriptMirror::new();
        mirror.append_event("one");
        mirror.append_marker("--- m ---");
        mirror.clear();
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror.lines()[0].text, CLEARED_LINE);

        mirror.append_event("two");
        let texts: Vec<_> = mirror.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec![CLEARED_LINE, "two"]);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut mirror = TranscriptMirror::new();
        mirror.append_event("a");
        let snap = mirror.snapshot();
        mirror.append_event("b");
        assert_eq!(snap.len(), 2);
        assert_eq!(mirror.len(), 3);
    }

    #[test]
    fn saveable_lines_skip_blank_entries() {
        let mut mirror = TranscriptMirror::new();
        mirror.append_event("  ");
        mirror.append_event("x");
        assert_eq!(mirror.saveable_lines(), vec![INTRO_LINE.to_string(), "x".to_string()]);
    }
}
