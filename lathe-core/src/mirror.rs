//! Y-axis mirroring of instruction sequences.

use crate::parser::{Instruction, Word};
use crate::program::{Line, Program};

/// Flips the sign of a numeric literal without reformatting it.
fn negate_literal(literal: &str) -> String {
    if let Some(rest) = literal.strip_prefix('-') {
        rest.to_string()
    } else if let Some(rest) = literal.strip_prefix('+') {
        format!("-{rest}")
    } else {
        format!("-{literal}")
    }
}

fn mirror_word(word: &Word) -> Word {
    match (word.letter, word.value) {
        ('Y', Some(v)) => Word {
            letter: 'Y',
            value: Some(-v),
            text: format!("Y{}", negate_literal(word.literal())),
        },
        _ => word.clone(),
    }
}

pub fn mirror_instruction(ins: &Instruction) -> Instruction {
    Instruction {
        code: ins.code.clone(),
        words: ins.words.iter().map(mirror_word).collect(),
    }
}

/// Negates every Y word, leaving all other tokens and the order untouched.
pub fn mirror(instructions: &[Instruction]) -> Vec<Instruction> {
    instructions.iter().map(mirror_instruction).collect()
}

/// Mirrored copy of the first `upto` lines. Lines that do not parse are
/// carried over verbatim.
pub fn mirror_prefix(program: &Program, upto: usize) -> Program {
    let lines = program
        .lines()
        .iter()
        .take(upto)
        .map(|line| match line.parse() {
            Ok(ins) => Line {
                number: line.number,
                text: mirror_instruction(&ins).to_string(),
            },
            Err(_) => line.clone(),
        })
        .collect();
    Program::from_lines(lines)
}
