//! Per-block code generation and loop backpatching.
//!
//! Each [`Block`] of the program is emitted into its own [`Emitter`] buffer.
//! Loop boundary blocks get their full `mov al,[rcx]; cmp al,0; jcc`
//! sequence up front with a zero placeholder displacement, so every block's
//! byte length is final before backpatching begins. The backpatcher then
//! walks the blocks with an explicit stack of open loop starts and rewrites
//! the placeholder displacements from the block byte-lengths alone.
//!
//! Register assignment is fixed; the instruction set never needs more than
//! three live values, so there is no allocator:
//! - `rcx` holds the tape pointer for the whole function,
//! - `al` is the accumulator for cell arithmetic and loop tests,
//! - `rbx` preserves the tape pointer across service calls (the `syscall`
//!   instruction clobbers `rcx` with the return address).

use log::{debug, trace};

use super::emitter::{Emitter, Reg64, Reg8};
use crate::program::{Block, Instruction, Program};

/// Tape pointer register for the lifetime of the compiled function.
const TAPE_PTR: Reg64 = Reg64::Rcx;
/// Scratch register preserving the tape pointer across service calls.
const SYSCALL_SAVE: Reg64 = Reg64::Rbx;

/// Linux system call numbers used by the generated code.
const SYS_READ: u64 = 0;
const SYS_WRITE: u64 = 1;
/// Standard stream file descriptors.
const FD_STDIN: u64 = 0;
const FD_STDOUT: u64 = 1;

/// Generate the complete function body for `program`.
///
/// The returned bytes are a self-contained function following the SysV
/// x86-64 calling convention: one pointer argument (the tape base, arriving
/// in `rdi`) and a 64-bit integer return value (always 0).
///
/// Deterministic: the same program always yields the same bytes.
///
/// # Panics
///
/// Panics if `program` violates the frontend's invariants (loop boundary
/// blocks not in matched pairs). [`crate::frontend::compile`] never produces
/// such a program; the panic marks an internal contract breach, not a
/// user-facing error.
pub fn generate(program: &Program) -> Vec<u8> {
    trace!("lowered program:\n{program}");

    let mut prologue = Emitter::new();
    prologue.mov_r64_r64(TAPE_PTR, Reg64::Rdi);

    let mut buffers: Vec<Emitter> = program.blocks().iter().map(emit_block).collect();
    patch_loops(program, &mut buffers);

    let mut epilogue = Emitter::new();
    epilogue.mov_r64_imm64(Reg64::Rax, 0);
    epilogue.ret();

    let block_count = buffers.len();
    let mut code = prologue.into_bytes();
    for buffer in buffers {
        code.extend(buffer.into_bytes());
    }
    code.extend(epilogue.into_bytes());

    debug!("generated {} bytes from {} blocks", code.len(), block_count);
    code
}

/// Encode every instruction of one block into a fresh buffer.
fn emit_block(block: &Block) -> Emitter {
    let mut emitter = Emitter::new();
    for &instruction in block.instructions() {
        match instruction {
            Instruction::Increment(count) => {
                emitter.load_byte(Reg8::Al, TAPE_PTR);
                emitter.add_al_imm8((count % 256) as u8);
                emitter.store_byte(TAPE_PTR, Reg8::Al);
            }
            Instruction::Decrement(count) => {
                emitter.load_byte(Reg8::Al, TAPE_PTR);
                emitter.sub_al_imm8((count % 256) as u8);
                emitter.store_byte(TAPE_PTR, Reg8::Al);
            }
            Instruction::MoveRight(count) => emitter.add_r64_imm32(TAPE_PTR, count),
            Instruction::MoveLeft(count) => emitter.sub_r64_imm32(TAPE_PTR, count),
            Instruction::Write => emit_service_call(&mut emitter, SYS_WRITE, FD_STDOUT),
            Instruction::Read => emit_service_call(&mut emitter, SYS_READ, FD_STDIN),
            Instruction::LoopStart => {
                emitter.load_byte(Reg8::Al, TAPE_PTR);
                emitter.cmp_al_imm8(0);
                emitter.jz_rel32(0);
            }
            Instruction::LoopEnd => {
                emitter.load_byte(Reg8::Al, TAPE_PTR);
                emitter.cmp_al_imm8(0);
                emitter.jnz_rel32(0);
            }
        }
    }
    emitter
}

/// One single-byte read/write system call against the current cell.
///
/// The cell address doubles as the one-byte buffer. `syscall` saves the
/// continuation address in `rcx`, so the tape pointer is stashed in a spare
/// register around the call.
fn emit_service_call(emitter: &mut Emitter, number: u64, fd: u64) {
    emitter.mov_r64_imm64(Reg64::Rax, number);
    emitter.mov_r64_imm64(Reg64::Rdi, fd);
    emitter.mov_r64_r64(Reg64::Rsi, TAPE_PTR);
    emitter.mov_r64_imm64(Reg64::Rdx, 1);
    emitter.mov_r64_r64(SYSCALL_SAVE, TAPE_PTR);
    emitter.syscall();
    emitter.mov_r64_r64(TAPE_PTR, SYSCALL_SAVE);
}

/// Resolve every loop branch displacement from the final block lengths.
///
/// Walks blocks in order keeping a stack of open loop-start block indices.
/// For each matched pair, the body span is the sum of the byte lengths of
/// the blocks strictly between the pair. The loop start's `jz` skips
/// forward over the body (landing on the loop end's test); the loop end's
/// `jnz` jumps backward over body plus both boundary blocks (landing on the
/// loop start's test). Both displacements are end-of-instruction relative,
/// and both jumps sit at the very end of their 10-byte boundary block.
fn patch_loops(program: &Program, buffers: &mut [Emitter]) {
    let mut open_loops: Vec<usize> = Vec::new();

    for (index, block) in program.blocks().iter().enumerate() {
        match block.instructions().first().copied() {
            Some(Instruction::LoopStart) => open_loops.push(index),
            Some(Instruction::LoopEnd) => {
                let start = open_loops
                    .pop()
                    .expect("loop end block without a matching start");
                let body: usize = buffers[start + 1..index]
                    .iter()
                    .map(Emitter::len)
                    .sum();
                let start_len = buffers[start].len();
                let end_len = buffers[index].len();

                buffers[start].patch_imm32(start_len - 4, body as i32);
                buffers[index]
                    .patch_imm32(end_len - 4, -((body + start_len + end_len) as i32));
            }
            _ => {}
        }
    }

    assert!(
        open_loops.is_empty(),
        "loop start block without a matching end"
    );
}
