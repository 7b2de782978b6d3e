//! Typed errors for the parts of the engine that are allowed to fail loudly.
//!
//! Per spec.md §7, parse errors (malformed segments, bad option grammar,
//! unknown behaviors) never become an `Err` — they resolve to `false`/no-op
//! inside the grammar and dispatch layers. `EngineError` only covers the
//! failure modes that must actually propagate to the caller of
//! [`crate::facade::RlvEngine::process_message`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("host inventory snapshot unavailable")]
    InventorySnapshotUnavailable,

    #[error("host callback failed: {0}")]
    HostCallback(#[from] anyhow::Error),

    #[error("operation cancelled")]
    Cancelled,
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
