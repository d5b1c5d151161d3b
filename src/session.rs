//! Engine session: load/launch lifecycle and typed wrappers over the raw
//! export contract.

use thiserror::Error;

use crate::bridge::{BridgeError, EngineAbi, ScratchSpan};
use crate::codec;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("engine launch handshake failed")]
    Launch,
    #[error("engine is not launched (state: {0:?})")]
    NotLaunched(SessionState),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Lifecycle of the engine instance. `Failed` is terminal: a failed launch
/// leaves the session unusable until the page is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Loading,
    Launched,
    Failed,
}

/// The import contract: callbacks the engine may invoke synchronously during
/// any export call.
///
/// One method per callback kind, so the contract is statically checkable.
/// All calls happen inside the span of a single export call and must not
/// re-enter the session.
pub trait EngineHost {
    /// Append text to the raw output sink (the debug panel).
    fn on_output_text(&mut self, text: &str);
    fn on_output_clear(&mut self);
    /// A segmented word with its pinyin reading.
    fn on_word_segment(&mut self, simplified: &str, pinyin: &str);
    /// Passthrough text between words; `"<br>"` is the line-break sentinel.
    fn on_literal_span(&mut self, text: &str);
    fn on_definition(&mut self, simplified: &str, traditional: &str, pinyin: &str, gloss: &str);
    fn on_definition_clear(&mut self);
    /// The engine pulls a named document through the host. `None` means
    /// "not found" and the engine treats it as empty input, not as an error.
    fn on_file_request(&mut self, name: &str) -> Option<String>;
}

/// Owns the launched engine instance and serializes typed calls into it.
pub struct EngineSession<A: EngineAbi> {
    abi: A,
    state: SessionState,
}

impl<A: EngineAbi> EngineSession<A> {
    pub fn new(abi: A) -> Self {
        Self {
            abi,
            state: SessionState::Unloaded,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn abi(&self) -> &A {
        &self.abi
    }

    /// One-shot launch handshake. The engine signals readiness with a
    /// boolean export; false or a trap is fatal, with no retry.
    pub fn launch(&mut self) -> Result<()> {
        self.state = SessionState::Loading;
        match self.abi.launch() {
            Ok(true) => {
                self.state = SessionState::Launched;
                log::info!("engine launched");
                Ok(())
            }
            Ok(false) => {
                self.state = SessionState::Failed;
                log::error!("engine refused launch handshake");
                Err(SessionError::Launch)
            }
            Err(err) => {
                self.state = SessionState::Failed;
                log::error!("engine launch trapped: {err}");
                Err(SessionError::Launch)
            }
        }
    }

    /// Submit a document for segmentation. The engine runs to completion
    /// inside this call, invoking a burst of word-segment callbacks.
    pub fn submit_document(&self, text: &str) -> Result<()> {
        self.submit_document_bytes(&codec::encode_utf8(text))
    }

    /// Byte-level variant for input that was already encoded (the web layer
    /// encodes straight from UTF-16 code units).
    pub fn submit_document_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_launched()?;
        log::debug!("submitting {} bytes to engine", bytes.len());
        let span = ScratchSpan::with_bytes(&self.abi, bytes)?;
        self.abi.submit_document(span.offset(), span.len())?;
        Ok(())
    }

    /// Look up dictionary definitions for one word. Triggers a synchronous
    /// burst of definition callbacks.
    pub fn lookup_definitions(&self, word: &str) -> Result<()> {
        self.ensure_launched()?;
        log::debug!("looking up definitions for {word:?}");
        let bytes = codec::encode_utf8(word);
        let span = ScratchSpan::with_bytes(&self.abi, &bytes)?;
        self.abi.lookup_definitions(span.offset(), span.len())?;
        Ok(())
    }

    fn ensure_launched(&self) -> Result<()> {
        if self.state == SessionState::Launched {
            Ok(())
        } else {
            Err(SessionError::NotLaunched(self.state))
        }
    }
}
