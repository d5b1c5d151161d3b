//! Chinese Reader WASM Host Bridge
//!
//! Host-side glue between the browser UI and the sandboxed segmentation +
//! dictionary engine: the linear-memory transfer protocol, the
//! callback-driven render pipeline, and the named-document store.

pub mod app;
pub mod bridge;
pub mod codec;
pub mod panels;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod surface;
pub mod web;

#[cfg(test)]
pub(crate) mod testkit;

// Re-export commonly used types
pub use app::{HostState, Reader};
pub use bridge::{BridgeError, ByteSpan, EngineAbi};
pub use panels::{PanelController, PanelId};
pub use pipeline::{Debouncer, DefinitionEntry, RenderPipeline, WordSegment};
pub use session::{EngineHost, EngineSession, SessionError, SessionState};
pub use store::{DocumentStore, KvStore, MemoryStore};
pub use surface::UiSurface;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Chinese reader bridge initialized");
}
