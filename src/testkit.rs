//! Shared fakes for unit tests: a scriptable engine with a bump-allocated
//! linear memory, plus recording implementations of the host and surface
//! traits.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::bridge::{BridgeError, EngineAbi, Result};
use crate::codec;
use crate::panels::PanelId;
use crate::pipeline::{DefinitionEntry, WordSegment};
use crate::session::EngineHost;
use crate::surface::UiSurface;

/// One scripted segmentation callback.
#[derive(Debug, Clone)]
pub enum SegmentEvent {
    Word(String, String),
    Literal(String),
}

impl SegmentEvent {
    pub fn word(simplified: &str, pinyin: &str) -> Self {
        SegmentEvent::Word(simplified.to_owned(), pinyin.to_owned())
    }

    pub fn literal(text: &str) -> Self {
        SegmentEvent::Literal(text.to_owned())
    }
}

/// Bump-allocated stand-in for the engine's linear memory. Tracks allocation
/// discipline: a release of an unknown span panics the test.
#[derive(Debug, Default)]
pub struct FakeMemory {
    data: Vec<u8>,
    next: u32,
    pub live: HashMap<u32, u32>,
    pub allocs: u32,
    pub releases: u32,
    pub writes: u32,
    pub exhausted: bool,
}

impl FakeMemory {
    fn allocate(&mut self, len: u32) -> u32 {
        if self.exhausted {
            return 0;
        }
        if self.next == 0 {
            self.next = 8; // keep offset 0 free as the failure sentinel
        }
        let ptr = self.next;
        self.next += len.max(1);
        let end = (ptr + len) as usize;
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.live.insert(ptr, len);
        self.allocs += 1;
        ptr
    }

    fn release(&mut self, ptr: u32, len: u32) {
        let live_len = self.live.remove(&ptr);
        assert_eq!(live_len, Some(len), "release of unknown span {ptr}+{len}");
        self.releases += 1;
    }

    fn read(&self, ptr: u32, len: u32) -> Vec<u8> {
        self.data[ptr as usize..(ptr + len) as usize].to_vec()
    }

    fn write(&mut self, ptr: u32, bytes: &[u8]) {
        self.writes += 1;
        self.data[ptr as usize..ptr as usize + bytes.len()].copy_from_slice(bytes);
    }
}

/// Scriptable engine: each submission replays `submit_burst`, each lookup
/// replays the matching `dictionary` entries, exactly like the real engine's
/// synchronous callback bursts.
pub struct FakeEngine<H: EngineHost> {
    host: Rc<RefCell<H>>,
    pub memory: RefCell<FakeMemory>,
    pub refuse_launch: Cell<bool>,
    pub submit_burst: RefCell<Vec<SegmentEvent>>,
    pub dictionary: RefCell<Vec<(String, (String, String, String, String))>>,
    pub last_submitted: RefCell<Option<String>>,
    pub submissions: RefCell<u32>,
}

impl<H: EngineHost> FakeEngine<H> {
    pub fn new(host: Rc<RefCell<H>>) -> Self {
        Self {
            host,
            memory: RefCell::new(FakeMemory::default()),
            refuse_launch: Cell::new(false),
            submit_burst: RefCell::new(Vec::new()),
            dictionary: RefCell::new(Vec::new()),
            last_submitted: RefCell::new(None),
            submissions: RefCell::new(0),
        }
    }

    fn decode(&self, ptr: u32, len: u32) -> Result<String> {
        let bytes = self.memory.borrow().read(ptr, len);
        Ok(codec::decode_utf8(&bytes)?)
    }
}

impl<H: EngineHost> EngineAbi for FakeEngine<H> {
    fn launch(&self) -> Result<bool> {
        Ok(!self.refuse_launch.get())
    }

    fn allocate(&self, len: u32) -> Result<u32> {
        Ok(self.memory.borrow_mut().allocate(len))
    }

    fn release(&self, ptr: u32, len: u32) -> Result<()> {
        self.memory.borrow_mut().release(ptr, len);
        Ok(())
    }

    fn submit_document(&self, ptr: u32, len: u32) -> Result<()> {
        let text = self.decode(ptr, len)?;
        *self.last_submitted.borrow_mut() = Some(text);
        *self.submissions.borrow_mut() += 1;
        let burst = self.submit_burst.borrow().clone();
        let mut host = self.host.borrow_mut();
        for event in burst {
            match event {
                SegmentEvent::Word(simplified, pinyin) => {
                    host.on_word_segment(&simplified, &pinyin)
                }
                SegmentEvent::Literal(text) => host.on_literal_span(&text),
            }
        }
        host.on_output_text("segmentation complete\n");
        Ok(())
    }

    fn lookup_definitions(&self, ptr: u32, len: u32) -> Result<()> {
        let word = self.decode(ptr, len)?;
        let entries: Vec<_> = self
            .dictionary
            .borrow()
            .iter()
            .filter(|(key, _)| *key == word)
            .map(|(_, entry)| entry.clone())
            .collect();
        let mut host = self.host.borrow_mut();
        for (simplified, traditional, pinyin, gloss) in entries {
            host.on_definition(&simplified, &traditional, &pinyin, &gloss);
        }
        Ok(())
    }

    fn read_memory(&self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        Ok(self.memory.borrow().read(ptr, len))
    }

    fn write_memory(&self, ptr: u32, bytes: &[u8]) -> Result<()> {
        if ptr == 0 {
            return Err(BridgeError::Engine("write through null offset".into()));
        }
        self.memory.borrow_mut().write(ptr, bytes);
        Ok(())
    }
}

/// Plain recording implementation of the engine import contract.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub segments: Vec<(String, String, bool)>,
    pub definitions: Vec<(String, String, String, String)>,
    pub output: String,
    pub files: HashMap<String, String>,
}

impl EngineHost for RecordingHost {
    fn on_output_text(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn on_output_clear(&mut self) {
        self.output.clear();
    }

    fn on_word_segment(&mut self, simplified: &str, pinyin: &str) {
        self.segments
            .push((simplified.to_owned(), pinyin.to_owned(), true));
    }

    fn on_literal_span(&mut self, text: &str) {
        self.segments.push((text.to_owned(), String::new(), false));
    }

    fn on_definition(&mut self, simplified: &str, traditional: &str, pinyin: &str, gloss: &str) {
        self.definitions.push((
            simplified.to_owned(),
            traditional.to_owned(),
            pinyin.to_owned(),
            gloss.to_owned(),
        ));
    }

    fn on_definition_clear(&mut self) {
        self.definitions.clear();
    }

    fn on_file_request(&mut self, name: &str) -> Option<String> {
        self.files.get(name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    AppendOutput(String),
    ClearOutput,
    PushSegment(WordSegment),
    ClearSegments,
    PushDefinition(DefinitionEntry),
    ClearDefinitions,
    PanelVisible(PanelId, bool),
    PinyinVisible(bool),
}

/// Surface that records every sink call and serves a settable input source.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    input: String,
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_owned();
    }
}

impl UiSurface for RecordingSurface {
    fn input_bytes(&mut self) -> Vec<u8> {
        codec::encode_utf8(&self.input)
    }

    fn append_output(&mut self, text: &str) {
        self.events.push(SurfaceEvent::AppendOutput(text.to_owned()));
    }

    fn clear_output(&mut self) {
        self.events.push(SurfaceEvent::ClearOutput);
    }

    fn push_segment(&mut self, segment: &WordSegment) {
        self.events.push(SurfaceEvent::PushSegment(segment.clone()));
    }

    fn clear_segments(&mut self) {
        self.events.push(SurfaceEvent::ClearSegments);
    }

    fn push_definition(&mut self, entry: &DefinitionEntry) {
        self.events.push(SurfaceEvent::PushDefinition(entry.clone()));
    }

    fn clear_definitions(&mut self) {
        self.events.push(SurfaceEvent::ClearDefinitions);
    }

    fn set_panel_visible(&mut self, panel: PanelId, visible: bool) {
        self.events.push(SurfaceEvent::PanelVisible(panel, visible));
    }

    fn set_pinyin_visible(&mut self, visible: bool) {
        self.events.push(SurfaceEvent::PinyinVisible(visible));
    }
}
