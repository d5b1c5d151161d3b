//! The engine import table: raw `(ptr, len)` imports adapted onto the typed
//! [`EngineHost`] contract.
//!
//! Decode failures are thrown back into the engine as JS exceptions, which
//! trap the in-flight export call and propagate to its caller instead of
//! being swallowed into empty strings.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Object;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use super::engine::WebEngine;
use crate::bridge::{self, BridgeError};
use crate::codec;
use crate::session::EngineHost;

/// Slot the instantiated engine is dropped into once `load` completes. The
/// import closures read linear memory through it; it is empty only before
/// the first export call, and the engine cannot invoke an import before the
/// host calls an export.
pub type EngineSlot = Rc<RefCell<Option<WebEngine>>>;

fn throw(err: BridgeError) -> ! {
    wasm_bindgen::throw_val(JsValue::from_str(&err.to_string()))
}

fn engine(slot: &EngineSlot) -> WebEngine {
    match slot.borrow().clone() {
        Some(engine) => engine,
        None => wasm_bindgen::throw_str("engine import invoked before instantiation"),
    }
}

/// Decode a span out of live engine memory, trapping the call on bad bytes.
fn read(slot: &EngineSlot, ptr: u32, len: u32) -> String {
    let engine = engine(slot);
    bridge::read_string(&engine, ptr, len).unwrap_or_else(|err| throw(err))
}

fn set(table: &Object, name: &str, value: &JsValue) -> Result<(), JsValue> {
    js_sys::Reflect::set(table, &JsValue::from_str(name), value)?;
    Ok(())
}

/// Build the `{ host: { ... } }` import object for instantiation.
///
/// The closures are forgotten: they must stay callable for as long as the
/// engine instance lives, which is the rest of the page.
pub fn build_import_object(
    host: Rc<RefCell<dyn EngineHost>>,
    slot: EngineSlot,
) -> Result<Object, JsValue> {
    let table = Object::new();

    {
        let host = host.clone();
        let slot = slot.clone();
        let cb = Closure::<dyn FnMut(u32, u32)>::new(move |ptr: u32, len: u32| {
            let text = read(&slot, ptr, len);
            host.borrow_mut().on_output_text(&text);
        });
        set(&table, "onOutputText", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    {
        let host = host.clone();
        let cb = Closure::<dyn FnMut()>::new(move || {
            host.borrow_mut().on_output_clear();
        });
        set(&table, "onOutputClear", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    {
        let host = host.clone();
        let slot = slot.clone();
        let cb = Closure::<dyn FnMut(u32, u32, u32, u32)>::new(
            move |s_ptr: u32, s_len: u32, p_ptr: u32, p_len: u32| {
                let simplified = read(&slot, s_ptr, s_len);
                let pinyin = read(&slot, p_ptr, p_len);
                host.borrow_mut().on_word_segment(&simplified, &pinyin);
            },
        );
        set(&table, "onWordSegment", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    {
        let host = host.clone();
        let slot = slot.clone();
        let cb = Closure::<dyn FnMut(u32, u32)>::new(move |ptr: u32, len: u32| {
            let text = read(&slot, ptr, len);
            host.borrow_mut().on_literal_span(&text);
        });
        set(&table, "onLiteralSpan", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    {
        // onDefinition carries four spans = eight i32 parameters, beyond the
        // arity wasm-bindgen closures accept, so a JS shim packs the span
        // list into one array argument first.
        let host = host.clone();
        let slot = slot.clone();
        let cb = Closure::<dyn FnMut(js_sys::Array)>::new(move |spans: js_sys::Array| {
            let arg = |i: u32| spans.get(i).as_f64().unwrap_or(0.0) as u32;
            let simplified = read(&slot, arg(0), arg(1));
            let traditional = read(&slot, arg(2), arg(3));
            let pinyin = read(&slot, arg(4), arg(5));
            let gloss = read(&slot, arg(6), arg(7));
            host.borrow_mut()
                .on_definition(&simplified, &traditional, &pinyin, &gloss);
        });
        let packer = js_sys::Function::new_with_args(
            "f",
            "return function (s, sl, t, tl, p, pl, g, gl) { \
                 return f([s, sl, t, tl, p, pl, g, gl]); \
             };",
        );
        let shim = packer.call1(&JsValue::NULL, cb.as_ref())?;
        set(&table, "onDefinition", &shim)?;
        cb.forget();
    }

    {
        let host = host.clone();
        let cb = Closure::<dyn FnMut()>::new(move || {
            host.borrow_mut().on_definition_clear();
        });
        set(&table, "onDefinitionClear", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    {
        let host = host.clone();
        let slot = slot.clone();
        let cb = Closure::<dyn FnMut(u32, u32) -> u32>::new(move |ptr: u32, len: u32| -> u32 {
            let name = read(&slot, ptr, len);
            let Some(content) = host.borrow_mut().on_file_request(&name) else {
                log::debug!("file request miss for {name:?}");
                return 0; // not found; the engine treats it as empty
            };
            let engine = engine(&slot);
            let bytes = codec::encode_utf8(&content);
            let span = bridge::allocate(&engine, bytes.len()).unwrap_or_else(|err| throw(err));
            bridge::write(&engine, span, &bytes).unwrap_or_else(|err| throw(err));
            // ownership of the span passes to the engine; it frees it
            span.offset
        });
        set(&table, "onFileRequest", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    let imports = Object::new();
    set(&imports, "host", &table)?;
    Ok(imports)
}
