//! End-to-end execution tests driving the library pipeline against a
//! caller-owned tape.
//!
//! Everything here actually executes generated machine code, so the whole
//! file is limited to the only target the generator emits for. Only
//! terminating programs are used as fixtures: a non-terminating source
//! program becomes a native loop with no interrupt point, which is a
//! documented non-goal, not a testable condition.

#![cfg(all(target_arch = "x86_64", target_os = "linux"))]

use bfjit::{frontend, x64, CompiledFunction, Tape};

fn compile_and_run_on(source: &str, tape: &mut Tape) -> u64 {
    let program = frontend::compile(source).expect("fixture should compile");
    let code = x64::generate(&program);
    let function = CompiledFunction::load(&code).expect("executable mapping should succeed");
    // SAFETY: generator-produced code run on its own target, against a
    // full-size tape.
    unsafe { function.call(tape.base_ptr()) }
}

#[test]
fn empty_program_returns_zero_and_leaves_the_tape_untouched() {
    let mut tape = Tape::new();
    let status = compile_and_run_on("", &mut tape);
    assert_eq!(status, 0);
    assert!(tape.cells().iter().all(|&cell| cell == 0));
}

#[test]
fn run_facade_reports_the_function_result() {
    assert_eq!(bfjit::run("").expect("empty source should run"), 0);
}

#[test]
fn cell_arithmetic_wraps_modulo_256() {
    let mut tape = Tape::new();
    compile_and_run_on(&"+".repeat(256), &mut tape);
    assert_eq!(tape.cells()[0], 0);

    let mut tape = Tape::new();
    compile_and_run_on(&"+".repeat(300), &mut tape);
    assert_eq!(tape.cells()[0], 44);
}

#[test]
fn pointer_moves_address_distinct_cells() {
    let mut tape = Tape::new();
    compile_and_run_on(">+++>++>+", &mut tape);
    assert_eq!(&tape.cells()[..4], &[0, 3, 2, 1]);
}

#[test]
fn clear_copy_loop_transfers_the_counter() {
    let mut tape = Tape::new();
    let status = compile_and_run_on("+++[>+<-]", &mut tape);
    assert_eq!(status, 0);
    assert_eq!(&tape.cells()[..2], &[0, 3]);
}

#[test]
fn nested_loops_multiply() {
    let mut tape = Tape::new();
    compile_and_run_on("++[>++[>+<-]<-]", &mut tape);
    assert_eq!(&tape.cells()[..3], &[0, 0, 4]);
}

#[test]
fn sibling_loops_at_equal_depth_run_independently() {
    let mut tape = Tape::new();
    compile_and_run_on("++[>+<-]>>++[>+<-]", &mut tape);
    assert_eq!(&tape.cells()[..4], &[0, 2, 0, 2]);
}

#[test]
fn execution_is_deterministic() {
    let mut first = Tape::new();
    let mut second = Tape::new();
    let first_status = compile_and_run_on("+++[>+<-]>++", &mut first);
    let second_status = compile_and_run_on("+++[>+<-]>++", &mut second);
    assert_eq!(first_status, second_status);
    assert_eq!(first.cells(), second.cells());
}

#[test]
fn loaded_emitter_output_is_callable() {
    // A minimal hand-built function, independent of the code generator.
    let mut emitter = x64::Emitter::new();
    emitter.mov_r64_imm64(x64::Reg64::Rax, 42);
    emitter.ret();

    let function = CompiledFunction::load(emitter.bytes()).expect("mapping should succeed");
    let mut tape = Tape::new();
    // SAFETY: the function only sets rax and returns.
    let status = unsafe { function.call(tape.base_ptr()) };
    assert_eq!(status, 42);
}
