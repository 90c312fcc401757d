//! Source text to [`Program`] lowering.
//!
//! A single left-to-right scan folds runs of `+`/`-` and `>`/`<` into one
//! net-count instruction each, appends `.`/`,` as singleton instructions,
//! and splits blocks at loop boundaries. Bracket balance is validated during
//! the same scan by tracking the source positions of open loops; an
//! unbalanced program never produces a [`Program`].
//!
//! Characters outside the eight-symbol alphabet are ignored, and they are
//! transparent inside a fold run: pre-filtered and unfiltered input lower to
//! the same program.

use std::iter::Peekable;

use log::debug;

use crate::error::SyntaxError;
use crate::program::{Instruction, Program};

/// Whether `symbol` carries language meaning.
pub fn is_meaningful(symbol: char) -> bool {
    matches!(symbol, '+' | '-' | '<' | '>' | '.' | ',' | '[' | ']')
}

/// Lower `source` into a block-structured [`Program`].
///
/// Fails with [`SyntaxError`] on an unmatched `[` or `]`; the reported
/// position is the byte offset of the offending bracket in `source`.
pub fn compile(source: &str) -> Result<Program, SyntaxError> {
    let mut program = Program::new();
    let mut open_loops: Vec<usize> = Vec::new();

    let mut tokens = source
        .char_indices()
        .filter(|&(_, symbol)| is_meaningful(symbol))
        .peekable();

    while let Some((position, symbol)) = tokens.next() {
        match symbol {
            '+' | '-' => {
                let delta = fold_run(symbol, '+', '-', &mut tokens);
                if delta > 0 {
                    program.push(Instruction::Increment(delta as u32));
                } else if delta < 0 {
                    program.push(Instruction::Decrement(-delta as u32));
                }
            }
            '>' | '<' => {
                let delta = fold_run(symbol, '>', '<', &mut tokens);
                if delta > 0 {
                    program.push(Instruction::MoveRight(delta as u32));
                } else if delta < 0 {
                    program.push(Instruction::MoveLeft(-delta as u32));
                }
            }
            '.' => program.push(Instruction::Write),
            ',' => program.push(Instruction::Read),
            '[' => {
                open_loops.push(position);
                program.open_loop();
            }
            ']' => {
                if open_loops.pop().is_none() {
                    return Err(SyntaxError::UnmatchedClose { position });
                }
                program.close_loop();
            }
            _ => unreachable!("token stream is pre-filtered"),
        }
    }

    if let Some(&position) = open_loops.last() {
        return Err(SyntaxError::UnmatchedOpen { position });
    }

    debug!(
        "lowered {} source bytes into {} blocks",
        source.len(),
        program.blocks().len()
    );
    Ok(program)
}

/// Consume the remainder of a `plus`/`minus` run that began with `first`,
/// returning the net signed count.
fn fold_run<I>(first: char, plus: char, minus: char, tokens: &mut Peekable<I>) -> i64
where
    I: Iterator<Item = (usize, char)>,
{
    let mut delta: i64 = if first == plus { 1 } else { -1 };
    while let Some(&(_, next)) = tokens.peek() {
        if next == plus {
            delta += 1;
        } else if next == minus {
            delta -= 1;
        } else {
            break;
        }
        tokens.next();
    }
    delta
}
