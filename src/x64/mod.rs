//! x86-64 architecture-specific components.
//!
//! This module contains all x86-64 specific code:
//! - Byte-exact instruction encoding ([`emitter`])
//! - Per-block code generation and loop backpatching ([`codegen`])

pub mod codegen;
pub mod emitter;

pub use codegen::generate;
pub use emitter::{Emitter, Reg32, Reg64, Reg8};
