//! Browser entry points: the `ReaderBridge` exported to JS and the web
//! implementations of the core's collaborator traits.

mod engine;
mod imports;
mod storage;
mod surface;

pub use engine::WebEngine;
pub use storage::LocalStorage;
pub use surface::JsSurface;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::app::{HostState, Reader};
use crate::panels::PanelId;
use crate::session::{EngineHost, SessionState};
use crate::store::DocumentStore;

type WebHost = HostState<LocalStorage, JsSurface>;
type WebReader = Reader<WebEngine, LocalStorage, JsSurface>;

fn err_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))
}

/// The page-facing bridge: one engine session, one host state, one store.
///
/// Construct it with the UI hooks object, then `load` the engine module
/// bytes; everything else is event wiring.
#[wasm_bindgen]
pub struct ReaderBridge {
    host: Rc<RefCell<WebHost>>,
    slot: imports::EngineSlot,
    reader: Rc<RefCell<Option<WebReader>>>,
}

#[wasm_bindgen]
impl ReaderBridge {
    #[wasm_bindgen(constructor)]
    pub fn new(hooks: Object) -> Result<ReaderBridge, JsValue> {
        let store = DocumentStore::new(LocalStorage::open().map_err(err_js)?);
        let host = Rc::new(RefCell::new(HostState::new(store, JsSurface::new(hooks))));
        Ok(Self {
            host,
            slot: Rc::new(RefCell::new(None)),
            reader: Rc::new(RefCell::new(None)),
        })
    }

    /// Instantiate the engine module from its binary and run the launch
    /// handshake. Resolves once the engine is usable; rejects on
    /// instantiation or launch failure, after which the session stays
    /// `Failed` until the page reloads.
    pub fn load(&self, module_bytes: Uint8Array) -> js_sys::Promise {
        let host = self.host.clone();
        let slot = self.slot.clone();
        let reader = self.reader.clone();
        future_to_promise(async move {
            let dyn_host: Rc<RefCell<dyn EngineHost>> = host.clone();
            let import_object = imports::build_import_object(dyn_host, slot.clone())?;
            let bytes = module_bytes.to_vec();
            let result =
                JsFuture::from(WebAssembly::instantiate_buffer(&bytes, &import_object)).await?;
            let instance: WebAssembly::Instance =
                Reflect::get(&result, &JsValue::from_str("instance"))?.dyn_into()?;
            let engine = WebEngine::from_instance(&instance)?;
            *slot.borrow_mut() = Some(engine.clone());

            let mut new_reader = Reader::new(engine, host);
            let launched = new_reader.launch();
            *reader.borrow_mut() = Some(new_reader);
            launched.map_err(err_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// The input text changed. Arms the debounce timer; the submission
    /// happens once the edit burst goes quiescent, reading the input source
    /// at that moment.
    #[wasm_bindgen(js_name = updateInput)]
    pub fn update_input(&self) -> Result<(), JsValue> {
        let delay = {
            let reader = self.reader.borrow();
            reader
                .as_ref()
                .ok_or_else(|| JsValue::from_str("engine not loaded"))?
                .edit_delay_ms()
        };
        let slot = self.reader.clone();
        let timer = Closure::once_into_js(move || {
            let mut slot = slot.borrow_mut();
            let Some(reader) = slot.as_mut() else {
                return;
            };
            match reader.timer_fired() {
                Ok(true) => log::debug!("debounced submission dispatched"),
                Ok(false) => {}
                Err(err) => log::error!("debounced submission failed: {err}"),
            }
        });
        window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            timer.unchecked_ref(),
            delay as i32,
        )?;
        // the edit is recorded only once its timer exists; an arming failure
        // above therefore cannot leave the pending count unmatched
        if let Some(reader) = self.reader.borrow_mut().as_mut() {
            reader.note_edit();
        }
        Ok(())
    }

    /// Look up a clicked word and reveal the definition panel.
    #[wasm_bindgen(js_name = showDefinition)]
    pub fn show_definition(&self, word: &str) -> Result<(), JsValue> {
        let mut slot = self.reader.borrow_mut();
        let reader = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("engine not loaded"))?;
        reader.show_definition(word).map_err(err_js)
    }

    #[wasm_bindgen(js_name = selectPanel)]
    pub fn select_panel(&self, name: &str) -> Result<(), JsValue> {
        let panel = PanelId::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown panel `{name}`")))?;
        self.host.borrow_mut().select_panel(panel);
        Ok(())
    }

    #[wasm_bindgen(js_name = togglePinyin)]
    pub fn toggle_pinyin(&self) -> bool {
        self.host.borrow_mut().toggle_pinyin()
    }

    #[wasm_bindgen(js_name = engineState)]
    pub fn engine_state(&self) -> String {
        let state = self
            .reader
            .borrow()
            .as_ref()
            .map(|reader| reader.state())
            .unwrap_or(SessionState::Unloaded);
        format!("{state:?}").to_lowercase()
    }

    #[wasm_bindgen(js_name = saveDocument)]
    pub fn save_document(&self, name: &str, content: &str) -> Result<(), JsValue> {
        self.host
            .borrow_mut()
            .save_document(name, content)
            .map_err(err_js)
    }

    /// Returns the document content, or `null` when no such document exists
    /// (a normal outcome). A hit also reveals the input panel; the page puts
    /// the content into the input source and calls `updateInput`.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&self, name: &str) -> Result<Option<String>, JsValue> {
        self.host.borrow_mut().load_document(name).map_err(err_js)
    }

    #[wasm_bindgen(js_name = deleteDocument)]
    pub fn delete_document(&self, name: &str) -> Result<(), JsValue> {
        self.host.borrow_mut().delete_document(name).map_err(err_js)
    }

    /// Known document names in first-insertion order, as a JS array.
    #[wasm_bindgen(js_name = listDocuments)]
    pub fn list_documents(&self) -> Result<JsValue, JsValue> {
        let names = self.host.borrow().list_documents().map_err(err_js)?;
        serde_wasm_bindgen::to_value(&names).map_err(err_js)
    }

    /// Snapshot of the current word stream (for the debug panel).
    #[wasm_bindgen(js_name = wordStream)]
    pub fn word_stream(&self) -> Result<JsValue, JsValue> {
        let host = self.host.borrow();
        serde_wasm_bindgen::to_value(host.pipeline().words()).map_err(err_js)
    }

    /// Snapshot of the current definition list.
    pub fn definitions(&self) -> Result<JsValue, JsValue> {
        let host = self.host.borrow();
        serde_wasm_bindgen::to_value(host.pipeline().definitions()).map_err(err_js)
    }
}
