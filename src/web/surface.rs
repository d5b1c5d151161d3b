//! `UiSurface` over a JS hooks object supplied by the page.
//!
//! The hooks object carries one method per sink:
//! `inputText() -> string`, `appendOutput(text)`, `clearOutput()`,
//! `pushWord(text, pinyin, isWord)`, `clearWords()`,
//! `pushDefinition(simplified, traditional, pinyin, gloss)`,
//! `clearDefinitions()`, `setPanelVisible(name, visible)`,
//! `setPinyinVisible(visible)`.
//!
//! How each sink mutates the DOM is the page's business; a missing or
//! throwing hook is logged and skipped so one broken sink cannot take the
//! pipeline down with it.

use js_sys::{Array, Function, JsString, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::codec;
use crate::panels::PanelId;
use crate::pipeline::{DefinitionEntry, WordSegment};
use crate::surface::UiSurface;

pub struct JsSurface {
    hooks: Object,
}

impl JsSurface {
    pub fn new(hooks: Object) -> Self {
        Self { hooks }
    }

    fn hook(&self, name: &str) -> Option<Function> {
        match Reflect::get(&self.hooks, &JsValue::from_str(name)) {
            Ok(value) => match value.dyn_into::<Function>() {
                Ok(function) => Some(function),
                Err(_) => {
                    log::warn!("ui hook `{name}` is missing or not a function");
                    None
                }
            },
            Err(err) => {
                log::warn!("ui hook `{name}` unreadable: {err:?}");
                None
            }
        }
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
        let function = self.hook(name)?;
        let list = Array::new();
        for arg in args {
            list.push(arg);
        }
        match function.apply(&self.hooks, &list) {
            Ok(ret) => Some(ret),
            Err(err) => {
                log::error!("ui hook `{name}` threw: {err:?}");
                None
            }
        }
    }
}

impl UiSurface for JsSurface {
    fn input_bytes(&mut self) -> Vec<u8> {
        // encode from raw UTF-16 code units so a lone surrogate in the
        // textarea cannot be mangled by a lossy JsValue -> String hop
        let Some(value) = self.call("inputText", &[]) else {
            return Vec::new();
        };
        let Some(text) = value.dyn_ref::<JsString>() else {
            log::warn!("ui hook `inputText` did not return a string");
            return Vec::new();
        };
        let units: Vec<u16> = text.iter().collect();
        codec::encode_utf16_units(&units)
    }

    fn append_output(&mut self, text: &str) {
        self.call("appendOutput", &[JsValue::from_str(text)]);
    }

    fn clear_output(&mut self) {
        self.call("clearOutput", &[]);
    }

    fn push_segment(&mut self, segment: &WordSegment) {
        self.call(
            "pushWord",
            &[
                JsValue::from_str(&segment.text),
                JsValue::from_str(&segment.pinyin),
                JsValue::from_bool(segment.is_word),
            ],
        );
    }

    fn clear_segments(&mut self) {
        self.call("clearWords", &[]);
    }

    fn push_definition(&mut self, entry: &DefinitionEntry) {
        self.call(
            "pushDefinition",
            &[
                JsValue::from_str(&entry.simplified),
                JsValue::from_str(&entry.traditional),
                JsValue::from_str(&entry.pinyin),
                JsValue::from_str(&entry.gloss),
            ],
        );
    }

    fn clear_definitions(&mut self) {
        self.call("clearDefinitions", &[]);
    }

    fn set_panel_visible(&mut self, panel: PanelId, visible: bool) {
        self.call(
            "setPanelVisible",
            &[
                JsValue::from_str(panel.name()),
                JsValue::from_bool(visible),
            ],
        );
    }

    fn set_pinyin_visible(&mut self, visible: bool) {
        self.call("setPinyinVisible", &[JsValue::from_bool(visible)]);
    }
}
