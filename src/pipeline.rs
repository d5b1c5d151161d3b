//! Render pipeline: turns the engine's callback stream into the structured
//! word and definition collections, mirroring every mutation to the UI
//! surface.
//!
//! Also home to the [`Debouncer`] that coalesces rapid input edits into a
//! single submission per quiescent burst.

use serde::{Deserialize, Serialize};

use crate::surface::UiSurface;

/// Sentinel the engine emits between lines of the source text.
pub const LINE_BREAK: &str = "<br>";

/// One unit of segmented output. `is_word == false` marks passthrough text;
/// passthrough equal to [`LINE_BREAK`] renders as a hard break, not as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSegment {
    pub text: String,
    pub pinyin: String,
    pub is_word: bool,
}

impl WordSegment {
    pub fn word(text: impl Into<String>, pinyin: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pinyin: pinyin.into(),
            is_word: true,
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pinyin: String::new(),
            is_word: false,
        }
    }

    pub fn is_line_break(&self) -> bool {
        !self.is_word && self.text == LINE_BREAK
    }
}

/// One dictionary entry for a looked-up word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    pub simplified: String,
    pub traditional: String,
    pub pinyin: String,
    pub gloss: String,
}

/// Incrementally built render state. Both collections are append-only within
/// one engine burst and are cleared *before* the next submission or lookup
/// begins, never after, so a late clear can never wipe fresh results.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    words: Vec<WordSegment>,
    definitions: Vec<DefinitionEntry>,
    output: String,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> &[WordSegment] {
        &self.words
    }

    pub fn definitions(&self) -> &[DefinitionEntry] {
        &self.definitions
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn append_output(&mut self, text: &str, surface: &mut dyn UiSurface) {
        self.output.push_str(text);
        surface.append_output(text);
    }

    pub fn clear_output(&mut self, surface: &mut dyn UiSurface) {
        self.output.clear();
        surface.clear_output();
    }

    pub fn push_word(&mut self, simplified: &str, pinyin: &str, surface: &mut dyn UiSurface) {
        let segment = WordSegment::word(simplified, pinyin);
        surface.push_segment(&segment);
        self.words.push(segment);
    }

    pub fn push_literal(&mut self, text: &str, surface: &mut dyn UiSurface) {
        let segment = WordSegment::literal(text);
        surface.push_segment(&segment);
        self.words.push(segment);
    }

    pub fn clear_words(&mut self, surface: &mut dyn UiSurface) {
        self.words.clear();
        surface.clear_segments();
    }

    pub fn push_definition(&mut self, entry: DefinitionEntry, surface: &mut dyn UiSurface) {
        surface.push_definition(&entry);
        self.definitions.push(entry);
    }

    pub fn clear_definitions(&mut self, surface: &mut dyn UiSurface) {
        self.definitions.clear();
        surface.clear_definitions();
    }
}

/// Trailing debounce over an integer pending count.
///
/// Every edit increments the count and arms one fixed-delay timer; each
/// firing timer decrements it, and only the timer that brings the count to
/// zero performs the submission. That guarantees at most one submission per
/// quiescent period, reflecting the last edit's content, with nothing firing
/// while edits are still arriving. Since submissions only happen here, this
/// is also what serializes calls into the non-reentrant engine.
#[derive(Debug)]
pub struct Debouncer {
    pending: u32,
    delay_ms: u32,
}

impl Debouncer {
    pub const DEFAULT_DELAY_MS: u32 = 1000;

    pub fn new(delay_ms: u32) -> Self {
        Self {
            pending: 0,
            delay_ms,
        }
    }

    /// The delay an edit timer runs for. Reading it records nothing.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Record an edit. The caller arms a one-shot timer for the returned
    /// number of milliseconds; every recorded edit must be matched by one
    /// [`timer_fired`](Self::timer_fired) call, or the count never reaches
    /// zero again.
    pub fn note_edit(&mut self) -> u32 {
        self.pending += 1;
        self.delay_ms
    }

    /// A timer armed by [`note_edit`](Self::note_edit) fired. True when the
    /// burst has gone quiescent and the caller should submit now.
    pub fn timer_fired(&mut self) -> bool {
        debug_assert!(self.pending > 0, "timer fired with no pending edits");
        self.pending = self.pending.saturating_sub(1);
        self.pending == 0
    }

    pub fn is_quiescent(&self) -> bool {
        self.pending == 0
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY_MS)
    }
}
