//! `EngineAbi` over a live `WebAssembly.Instance`.

use js_sys::{Function, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::{JsCast, JsValue};

use crate::bridge::{BridgeError, EngineAbi, Result};

/// Handle to the launched engine module's exports.
///
/// Cheap to clone (every field is a JS handle). The linear memory view is
/// re-derived from `memory.buffer` on every access: the engine may grow, and
/// thereby move, its memory during any export call, which detaches older
/// views.
#[derive(Clone)]
pub struct WebEngine {
    launch: Function,
    allocate: Function,
    release: Function,
    submit_document: Function,
    lookup_definitions: Function,
    memory: WebAssembly::Memory,
}

impl WebEngine {
    pub fn from_instance(instance: &WebAssembly::Instance) -> std::result::Result<Self, JsValue> {
        let exports = instance.exports();
        let function = |name: &str| -> std::result::Result<Function, JsValue> {
            Reflect::get(&exports, &JsValue::from_str(name))?
                .dyn_into::<Function>()
                .map_err(|_| JsValue::from_str(&format!("engine export `{name}` is not a function")))
        };
        let memory = Reflect::get(&exports, &JsValue::from_str("memory"))?
            .dyn_into::<WebAssembly::Memory>()
            .map_err(|_| JsValue::from_str("engine does not export linear memory"))?;
        Ok(Self {
            launch: function("launch")?,
            allocate: function("allocate")?,
            release: function("release")?,
            submit_document: function("submitDocument")?,
            lookup_definitions: function("lookupDefinitions")?,
            memory,
        })
    }
}

fn trap(context: &str, err: JsValue) -> BridgeError {
    BridgeError::Engine(format!("{context}: {err:?}"))
}

/// A wasm `u32` return crosses the JS boundary as a signed i32: offsets in
/// the upper 2 GiB of linear memory arrive negative and must wrap back, not
/// saturate to 0 (the allocation-failure sentinel).
fn offset_from_js(value: f64) -> u32 {
    value as i64 as u32
}

impl EngineAbi for WebEngine {
    fn launch(&self) -> Result<bool> {
        let ret = self
            .launch
            .call0(&JsValue::NULL)
            .map_err(|err| trap("launch", err))?;
        Ok(ret.is_truthy())
    }

    fn allocate(&self, len: u32) -> Result<u32> {
        let ret = self
            .allocate
            .call1(&JsValue::NULL, &JsValue::from(len))
            .map_err(|err| trap("allocate", err))?;
        Ok(offset_from_js(ret.as_f64().unwrap_or(0.0)))
    }

    fn release(&self, ptr: u32, len: u32) -> Result<()> {
        self.release
            .call2(&JsValue::NULL, &JsValue::from(ptr), &JsValue::from(len))
            .map_err(|err| trap("release", err))?;
        Ok(())
    }

    fn submit_document(&self, ptr: u32, len: u32) -> Result<()> {
        self.submit_document
            .call2(&JsValue::NULL, &JsValue::from(ptr), &JsValue::from(len))
            .map_err(|err| trap("submitDocument", err))?;
        Ok(())
    }

    fn lookup_definitions(&self, ptr: u32, len: u32) -> Result<()> {
        self.lookup_definitions
            .call2(&JsValue::NULL, &JsValue::from(ptr), &JsValue::from(len))
            .map_err(|err| trap("lookupDefinitions", err))?;
        Ok(())
    }

    fn read_memory(&self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        let view = Uint8Array::new_with_byte_offset_and_length(&self.memory.buffer(), ptr, len);
        Ok(view.to_vec())
    }

    fn write_memory(&self, ptr: u32, bytes: &[u8]) -> Result<()> {
        let view =
            Uint8Array::new_with_byte_offset_and_length(&self.memory.buffer(), ptr, bytes.len() as u32);
        view.copy_from(bytes);
        Ok(())
    }
}
