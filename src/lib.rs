//! bfjit - Just-in-time compilation for the eight-symbol cell machine.
//!
//! bfjit translates cell-machine source text (`+ - > < . , [ ]`) directly
//! into x86-64 machine code, maps it into an executable region, and invokes
//! it as a native function over a 50,000-byte tape. There is no interpreter
//! and no intermediate assembler: every instruction byte is encoded by hand.
//!
//! # Primary Usage
//!
//! ```no_run
//! let status = bfjit::run("++++++++[>++++++++<-]>+.")?;
//! assert_eq!(status, 0);
//! # Ok::<(), bfjit::RunError>(())
//! ```
//!
//! # Architecture
//!
//! - [`frontend`] - lexing and run-length folding into a block-structured [`Program`]
//! - [`program`] - the `Instruction`/`Block`/`Program` data model
//! - [`x64`] - x86-64 specific code (byte emitter, code generator, backpatcher)
//! - [`exec`] - executable memory mapping and the callable function handle
//! - [`runtime`] - tape ownership and the end-to-end [`run`] facade
//! - [`error`] - error taxonomy

pub mod error;
pub mod exec;
pub mod frontend;
pub mod program;
pub mod runtime;
pub mod x64;

pub use error::{AllocationError, RunError, RunResult, SyntaxError};
pub use exec::CompiledFunction;
pub use program::{Block, Instruction, Program};
pub use runtime::{run, Tape, TAPE_LEN};
