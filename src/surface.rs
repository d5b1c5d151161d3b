//! Abstract UI surface.
//!
//! The core never touches the DOM; it drives these capability-style sinks and
//! reads the input source through them. The browser implementation lives in
//! [`crate::web`], tests use in-memory recorders.

use crate::panels::PanelId;
use crate::pipeline::{DefinitionEntry, WordSegment};

pub trait UiSurface {
    /// Current contents of the input text source, already encoded for the
    /// engine (UTF-8 bytes; the web layer encodes from raw UTF-16 units).
    fn input_bytes(&mut self) -> Vec<u8>;

    fn append_output(&mut self, text: &str);
    fn clear_output(&mut self);

    fn push_segment(&mut self, segment: &WordSegment);
    fn clear_segments(&mut self);

    fn push_definition(&mut self, entry: &DefinitionEntry);
    fn clear_definitions(&mut self);

    fn set_panel_visible(&mut self, panel: PanelId, visible: bool);
    fn set_pinyin_visible(&mut self, visible: bool);
}
