//! Line parser for the lathe instruction set.
//!
//! A line is `<CODE>(<LETTER><number>)*` separated by whitespace, for example
//! `G01 X12.5 Y-3.0 F50`. `;` starts a comment running to end of line and
//! `( ... )` comments may appear anywhere.

use std::fmt;

use crate::error::{Result, SimError};

/// Execution class of a command code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// `G00` / `G0`
    Rapid,
    /// `G01` / `G1`
    Linear,
    /// `M30`
    ProgramEnd,
    /// Anything else that is well formed; executes as a no-op.
    Other,
}

/// One parameter word. `value` is set for the letters the executor reads
/// (`X`, `Y`, `Z`, `F`); other words are carried through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub letter: char,
    pub value: Option<f64>,
    pub text: String,
}

impl Word {
    /// The token without its letter, as written in the source.
    pub fn literal(&self) -> &str {
        &self.text[self.letter.len_utf8()..]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub code: String,
    pub words: Vec<Word>,
}

impl Instruction {
    pub fn kind(&self) -> Kind {
        match self.code.as_str() {
            "G00" | "G0" => Kind::Rapid,
            "G01" | "G1" => Kind::Linear,
            "M30" => Kind::ProgramEnd,
            _ => Kind::Other,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self.kind(), Kind::Rapid | Kind::Linear)
    }

    /// Last word carrying `letter`, like a controller reading left to right.
    pub fn word(&self, letter: char) -> Option<&Word> {
        self.words.iter().rev().find(|w| w.letter == letter)
    }

    pub fn value(&self, letter: char) -> Option<f64> {
        self.word(letter).and_then(|w| w.value)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)?;
        for w in &self.words {
            write!(f, " {}", w.text)?;
        }
        Ok(())
    }
}

fn strip_comments(line: &str) -> String {
    let line = match line.find(';') {
        Some(at) => &line[..at],
        None => line,
    };
    let mut out = String::with_capacity(line.len());
    let mut depth = 0usize;
    for c in line.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                out.push(' ');
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn is_blank_or_comment(line: &str) -> bool {
    strip_comments(line).trim().is_empty()
}

fn is_code(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some('G' | 'M'))
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit())
}

fn parse_word(token: &str) -> Result<Word> {
    // Tokens always start with at least one char after split_whitespace.
    let letter = token.chars().next().unwrap_or(' ');
    let value = match letter {
        'X' | 'Y' | 'Z' | 'F' => {
            let number = &token[letter.len_utf8()..];
            match number.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    return Err(SimError::InvalidParameter {
                        token: token.to_string(),
                    });
                }
            }
        }
        _ => None,
    };
    Ok(Word {
        letter,
        value,
        text: token.to_string(),
    })
}

pub fn parse_line(line: &str) -> Result<Instruction> {
    let clean = strip_comments(line).to_uppercase();
    let mut tokens = clean.split_whitespace();

    let code = match tokens.next() {
        Some(tok) if is_code(tok) => tok.to_string(),
        _ => {
            return Err(SimError::MalformedInstruction {
                line: line.trim().to_string(),
            });
        }
    };

    let words = tokens.map(parse_word).collect::<Result<Vec<_>>>()?;
    Ok(Instruction { code, words })
}
