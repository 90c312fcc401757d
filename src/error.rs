//! Error types for the JIT pipeline.
//!
//! Using thiserror for more idiomatic error handling. Every error is
//! reported synchronously to the immediate caller; nothing is retried,
//! since compilation and mapping are deterministic for a given input.

use std::io;

use thiserror::Error;

/// Bracket-balance failure detected while lowering source text.
///
/// Surfaced by [`crate::frontend::compile`] before any code generation or
/// memory allocation happens; no partial [`crate::Program`] is returned.
/// Positions are byte offsets into the original source text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unmatched '[' at byte {position}: loop is never closed")]
    UnmatchedOpen { position: usize },

    #[error("unmatched ']' at byte {position}: no loop is open")]
    UnmatchedClose { position: usize },
}

/// The executable-memory request was denied by the operating system.
#[derive(Error, Debug)]
#[error("failed to map {size} bytes of executable memory")]
pub struct AllocationError {
    /// Size of the rejected mapping request in bytes.
    pub size: usize,
    #[source]
    pub source: io::Error,
}

/// Any failure of the end-to-end [`crate::run`] facade.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Result type alias for the run facade.
pub type RunResult<T> = Result<T, RunError>;
