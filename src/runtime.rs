//! Tape ownership and the end-to-end run facade.

use log::debug;

use crate::error::RunResult;
use crate::exec::CompiledFunction;
use crate::frontend;
use crate::x64::codegen;

/// Number of cells available to a compiled program.
pub const TAPE_LEN: usize = 50_000;

/// The zero-initialized working memory handed to a compiled function.
///
/// The tape has no notion of a current position: the data pointer lives in
/// a register inside the running compiled code. The compiled function only
/// ever sees the base pointer.
pub struct Tape {
    cells: Box<[u8]>,
}

impl Tape {
    pub fn new() -> Self {
        Self {
            cells: vec![0; TAPE_LEN].into_boxed_slice(),
        }
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn base_ptr(&mut self) -> *mut u8 {
        self.cells.as_mut_ptr()
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile `source` and run it over a fresh zeroed [`Tape`].
///
/// Drives the whole pipeline (frontend, code generator, executable memory
/// manager), then invokes the compiled function and returns its result
/// (0 on normal completion). The tape and the executable mapping are
/// released on every exit path by ownership; a failure before execution
/// allocates nothing that outlives this call.
///
/// A source program that never terminates turns into native code that never
/// terminates: there is no interrupt point and no timeout.
pub fn run(source: &str) -> RunResult<u64> {
    let program = frontend::compile(source)?;
    let code = codegen::generate(&program);
    let function = CompiledFunction::load(&code)?;

    let mut tape = Tape::new();
    // SAFETY: the code comes from this crate's generator, so it follows the
    // entry ABI; the tape provides TAPE_LEN writable bytes, the extent the
    // language's programs are written against.
    let status = unsafe { function.call(tape.base_ptr()) };
    debug!("compiled function returned {status}");
    Ok(status)
}
