//! Program text loading. Instructions are kept as source lines and parsed
//! when they are dispatched, so one bad line fails only its own step.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::parser::{self, Instruction};

pub const PROGRAM_EXTENSION: &str = "gcode";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Line {
    /// 1-based line number in the source text.
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn parse(&self) -> Result<Instruction> {
        parser::parse_line(&self.text)
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Program {
    lines: Vec<Line>,
}

impl Program {
    pub fn parse(code: &str) -> Self {
        let lines = code
            .lines()
            .enumerate()
            .filter(|(_, l)| !parser::is_blank_or_comment(l))
            .map(|(i, l)| Line {
                number: i + 1,
                text: l.trim().to_string(),
            })
            .collect();
        Self { lines }
    }

    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some(PROGRAM_EXTENSION) {
            return Err(SimError::WrongFileType {
                path: path.to_path_buf(),
            });
        }
        let code = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        let program = Self::parse(&code);
        console_log!("Loaded {} ({} instructions)", path.display(), program.len());
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Lines that parse, in order. Malformed lines are skipped.
    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.lines.iter().filter_map(|l| l.parse().ok())
    }
}

/// Resolves the collaborator's current selection into a program path.
pub fn select_program(selection: Option<&Path>) -> Result<PathBuf> {
    let path = selection.ok_or(SimError::NoProgramSelected)?;
    if path.extension().and_then(|e| e.to_str()) != Some(PROGRAM_EXTENSION) {
        return Err(SimError::WrongFileType {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}
