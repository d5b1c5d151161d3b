//! Buffer bridge: every byte that crosses the host/engine boundary goes
//! through here.
//!
//! The engine owns a resizable linear memory; the host borrows scratch ranges
//! from it to pass parameters in, and slices result spans back out. Ownership
//! of a range belongs to whichever side allocated it until it is explicitly
//! released, and a live memory view is re-derived for every access because
//! the buffer may move whenever the engine grows it.

use std::fmt;

use thiserror::Error;

use crate::codec::{self, DecodeError};

/// A byte range inside the engine's linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub offset: u32,
    pub len: u32,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("engine allocation failed for {0} bytes")]
    OutOfMemory(usize),
    #[error("write of {len} bytes exceeds allocated span of {capacity} bytes")]
    WriteOverflow { len: usize, capacity: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("engine call failed: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Export contract of the engine module, plus live access to its memory.
///
/// Implementations must re-derive the current memory view on every
/// `read_memory`/`write_memory` call; caching a view across an engine call is
/// a use-after-move bug waiting to happen.
pub trait EngineAbi {
    /// One-shot readiness handshake. False means the engine refused to start.
    fn launch(&self) -> Result<bool>;
    /// Ask the engine for `len` bytes of scratch memory. Returns the offset,
    /// with 0 signalling allocation failure.
    fn allocate(&self, len: u32) -> Result<u32>;
    /// Return a previously allocated range to the engine.
    fn release(&self, ptr: u32, len: u32) -> Result<()>;
    fn submit_document(&self, ptr: u32, len: u32) -> Result<()>;
    fn lookup_definitions(&self, ptr: u32, len: u32) -> Result<()>;
    fn read_memory(&self, ptr: u32, len: u32) -> Result<Vec<u8>>;
    fn write_memory(&self, ptr: u32, bytes: &[u8]) -> Result<()>;
}

/// Allocate a scratch range, mapping the engine's null offset to
/// [`BridgeError::OutOfMemory`]. Callers must not write on failure.
pub fn allocate<A: EngineAbi + ?Sized>(abi: &A, len: usize) -> Result<ByteSpan> {
    let offset = abi.allocate(len as u32)?;
    if offset == 0 {
        return Err(BridgeError::OutOfMemory(len));
    }
    Ok(ByteSpan {
        offset,
        len: len as u32,
    })
}

/// Copy `bytes` into engine memory at the start of `span`.
pub fn write<A: EngineAbi + ?Sized>(abi: &A, span: ByteSpan, bytes: &[u8]) -> Result<()> {
    if bytes.len() > span.len as usize {
        return Err(BridgeError::WriteOverflow {
            len: bytes.len(),
            capacity: span.len as usize,
        });
    }
    abi.write_memory(span.offset, bytes)
}

/// Slice the engine's current memory and decode the span as UTF-8.
pub fn read_string<A: EngineAbi + ?Sized>(abi: &A, ptr: u32, len: u32) -> Result<String> {
    let bytes = abi.read_memory(ptr, len)?;
    Ok(codec::decode_utf8(&bytes)?)
}

/// A scratch allocation returned to the engine when dropped.
///
/// This is the single-release discipline: the span is released exactly once
/// on every exit path (success, early return, error), and releasing twice is
/// structurally impossible because `Drop` runs once.
pub struct ScratchSpan<'a, A: EngineAbi + ?Sized> {
    abi: &'a A,
    span: ByteSpan,
}

impl<'a, A: EngineAbi + ?Sized> ScratchSpan<'a, A> {
    /// Allocate a span sized for `bytes` and copy them in. On a write
    /// failure the allocation is still released before the error returns.
    pub fn with_bytes(abi: &'a A, bytes: &[u8]) -> Result<Self> {
        let span = allocate(abi, bytes.len())?;
        let scratch = ScratchSpan { abi, span };
        write(abi, span, bytes)?;
        Ok(scratch)
    }

    pub fn offset(&self) -> u32 {
        self.span.offset
    }

    pub fn len(&self) -> u32 {
        self.span.len
    }

    pub fn is_empty(&self) -> bool {
        self.span.len == 0
    }
}

impl<A: EngineAbi + ?Sized> fmt::Debug for ScratchSpan<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchSpan").field("span", &self.span).finish()
    }
}

impl<A: EngineAbi + ?Sized> Drop for ScratchSpan<'_, A> {
    fn drop(&mut self) {
        if let Err(err) = self.abi.release(self.span.offset, self.span.len) {
            // Drop cannot propagate; the leak is logged, never hidden.
            log::error!(
                "failed to release engine scratch span at {}+{}: {err}",
                self.span.offset,
                self.span.len
            );
        }
    }
}
