//! Reader orchestration: one explicit instance wiring the engine session,
//! render pipeline, panel controller, and document store together.
//!
//! Everything is constructor-injected (there is no ambient global session),
//! so several independent readers can coexist and the whole flow runs
//! natively under test with fake collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::EngineAbi;
use crate::panels::{PanelController, PanelId};
use crate::pipeline::{Debouncer, DefinitionEntry, RenderPipeline};
use crate::session::{self, EngineHost, EngineSession, SessionState};
use crate::store::{self, DocumentStore, KvStore};
use crate::surface::UiSurface;

/// Host-side state the engine's callbacks mutate: the render pipeline, the
/// panel controller, the document store, and the UI surface they drive.
///
/// Kept separate from [`Reader`] so the engine import glue can borrow it
/// during an export call while the reader itself drives that call.
pub struct HostState<K: KvStore, S: UiSurface> {
    pipeline: RenderPipeline,
    panels: PanelController,
    store: DocumentStore<K>,
    surface: S,
}

impl<K: KvStore, S: UiSurface> HostState<K, S> {
    pub fn new(store: DocumentStore<K>, surface: S) -> Self {
        let mut state = Self {
            pipeline: RenderPipeline::new(),
            panels: PanelController::new(),
            store,
            surface,
        };
        // push the initial state (license panel, pinyin hidden)
        state.panels.sync(&mut state.surface);
        state
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn panels(&self) -> &PanelController {
        &self.panels
    }

    pub fn select_panel(&mut self, panel: PanelId) {
        self.panels.select(panel, &mut self.surface);
    }

    pub fn toggle_pinyin(&mut self) -> bool {
        self.panels.toggle_pinyin(&mut self.surface)
    }

    pub fn save_document(&mut self, name: &str, content: &str) -> store::Result<()> {
        self.store.save(name, content)
    }

    /// Load a named document. A hit additionally reveals the input panel
    /// (the caller is expected to place the content into the input source
    /// and schedule a fresh submission); a miss is a normal `None`.
    pub fn load_document(&mut self, name: &str) -> store::Result<Option<String>> {
        let content = self.store.load(name)?;
        if content.is_some() {
            self.panels.select(PanelId::Input, &mut self.surface);
        }
        Ok(content)
    }

    pub fn delete_document(&mut self, name: &str) -> store::Result<()> {
        self.store.delete(name)
    }

    pub fn list_documents(&self) -> store::Result<Vec<String>> {
        self.store.list()
    }
}

impl<K: KvStore, S: UiSurface> EngineHost for HostState<K, S> {
    fn on_output_text(&mut self, text: &str) {
        self.pipeline.append_output(text, &mut self.surface);
    }

    fn on_output_clear(&mut self) {
        self.pipeline.clear_output(&mut self.surface);
    }

    fn on_word_segment(&mut self, simplified: &str, pinyin: &str) {
        self.pipeline.push_word(simplified, pinyin, &mut self.surface);
    }

    fn on_literal_span(&mut self, text: &str) {
        self.pipeline.push_literal(text, &mut self.surface);
    }

    fn on_definition(&mut self, simplified: &str, traditional: &str, pinyin: &str, gloss: &str) {
        self.pipeline.push_definition(
            DefinitionEntry {
                simplified: simplified.to_owned(),
                traditional: traditional.to_owned(),
                pinyin: pinyin.to_owned(),
                gloss: gloss.to_owned(),
            },
            &mut self.surface,
        );
    }

    fn on_definition_clear(&mut self) {
        self.pipeline.clear_definitions(&mut self.surface);
    }

    fn on_file_request(&mut self, name: &str) -> Option<String> {
        match self.store.load(name) {
            Ok(content) => content,
            Err(err) => {
                // storage trouble looks like a miss to the engine, but is
                // never silent on the host side
                log::warn!("file request for {name:?} failed: {err}");
                None
            }
        }
    }
}

/// Drives engine calls against the shared [`HostState`].
///
/// Host-state borrows are always dropped before an engine export call starts,
/// because the callback burst inside the call re-borrows the state.
pub struct Reader<A: EngineAbi, K: KvStore, S: UiSurface> {
    session: EngineSession<A>,
    debounce: Debouncer,
    host: Rc<RefCell<HostState<K, S>>>,
}

impl<A: EngineAbi, K: KvStore, S: UiSurface> Reader<A, K, S> {
    pub fn new(abi: A, host: Rc<RefCell<HostState<K, S>>>) -> Self {
        Self {
            session: EngineSession::new(abi),
            debounce: Debouncer::default(),
            host,
        }
    }

    pub fn with_debounce(mut self, debounce: Debouncer) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn launch(&mut self) -> session::Result<()> {
        self.session.launch()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn host(&self) -> &Rc<RefCell<HostState<K, S>>> {
        &self.host
    }

    /// Delay a newly armed edit timer should run for. Reading it records no
    /// edit; callers that arm fallible timers read this first and call
    /// [`note_edit`](Self::note_edit) only once the timer actually exists.
    pub fn edit_delay_ms(&self) -> u32 {
        self.debounce.delay_ms()
    }

    /// The input changed. Returns the delay in milliseconds after which the
    /// caller must invoke [`timer_fired`](Self::timer_fired).
    pub fn note_edit(&mut self) -> u32 {
        self.debounce.note_edit()
    }

    /// A debounce timer elapsed. Submits the current input (cleared word
    /// stream first, then the engine call) only when no newer edits are
    /// pending. Returns whether a submission happened.
    pub fn timer_fired(&mut self) -> session::Result<bool> {
        if !self.debounce.timer_fired() {
            return Ok(false);
        }
        let bytes = {
            let mut host = self.host.borrow_mut();
            let host = &mut *host;
            host.pipeline.clear_words(&mut host.surface);
            host.surface.input_bytes()
        };
        self.session.submit_document_bytes(&bytes)?;
        Ok(true)
    }

    /// Look up a clicked word: clear the definition list, run the lookup
    /// burst, and only then reveal the definition panel.
    pub fn show_definition(&mut self, word: &str) -> session::Result<()> {
        {
            let mut host = self.host.borrow_mut();
            let host = &mut *host;
            host.pipeline.clear_definitions(&mut host.surface);
        }
        self.session.lookup_definitions(word)?;
        let mut host = self.host.borrow_mut();
        let host = &mut *host;
        host.panels.select(PanelId::Definition, &mut host.surface);
        Ok(())
    }
}
