use std::path::Path;

use tracing::trace;

use crate::command::{ArithOp, Command, CommandKind, Segment};
use crate::error::{ParseError, TranslateError};

const COMMENT: &str = "//";

/// A non-empty source line after comment stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original text
    pub number: usize,
    pub text: String,
}

/// Pull parser over one VM source unit.
///
/// Lines are cleaned eagerly, commands are classified lazily on `advance`. The
/// cursor can be moved back with `seek`/`reset` to re-read commands.
#[derive(Debug, Clone)]
pub struct Parser {
    unit: String,
    lines: Vec<SourceLine>,
    // index of the next line to hand out
    next: usize,
}

impl Parser {
    pub fn new(unit: impl Into<String>, source: &str) -> Self {
        let lines = source
            .lines()
            .enumerate()
            .filter_map(|(i, raw)| {
                let code = raw.split(COMMENT).next().unwrap_or("").trim();
                (!code.is_empty()).then(|| SourceLine { number: i + 1, text: code.to_string() })
            })
            .collect();
        Self { unit: unit.into(), lines, next: 0 }
    }

    /// Read a `.vm` file; the unit is named after the file stem.
    pub fn from_path(path: &Path) -> Result<Self, TranslateError> {
        let text = std::fs::read_to_string(path).map_err(|e| TranslateError::io(path, e))?;
        let unit = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(unit, &text))
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Number of commands (non-empty lines) in the unit.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn position(&self) -> usize {
        self.next
    }

    pub fn has_more_commands(&self) -> bool {
        self.next < self.lines.len()
    }

    pub fn seek(&mut self, index: usize) {
        self.next = index.min(self.lines.len());
    }

    pub fn reset(&mut self) {
        self.seek(0);
    }

    /// The line most recently returned by `advance`.
    pub fn current_line(&self) -> Option<&SourceLine> {
        self.next.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    pub fn advance(&mut self) -> Option<Result<Command, TranslateError>> {
        let line = self.lines.get(self.next)?;
        self.next += 1;
        trace!(unit = %self.unit, line = line.number, text = %line.text, "parse");
        Some(parse_command(&line.text).map_err(|source| TranslateError::Parse {
            unit: self.unit.clone(),
            line: line.number,
            text: line.text.clone(),
            source,
        }))
    }
}

impl Iterator for Parser {
    type Item = Result<Command, TranslateError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

/// Classify one cleaned, non-empty line.
pub fn parse_command(text: &str) -> Result<Command, ParseError> {
    let mut tokens = text.split_whitespace();
    let keyword = tokens.next().unwrap_or("");
    let operands: Vec<&str> = tokens.collect();
    let kind = CommandKind::classify(keyword);

    let op = match kind {
        CommandKind::Arithmetic => Some(
            ArithOp::from_mnemonic(keyword)
                .ok_or_else(|| ParseError::UnknownCommand(keyword.to_string()))?,
        ),
        _ => None,
    };
    let expected = kind.operand_count();
    if operands.len() != expected {
        return Err(ParseError::Arity {
            keyword: op.map_or(kind.keyword(), ArithOp::mnemonic),
            expected,
            found: operands.len(),
        });
    }

    let cmd = match kind {
        CommandKind::Arithmetic => match op {
            Some(op) => Command::Arithmetic(op),
            None => return Err(ParseError::UnknownCommand(keyword.to_string())),
        },
        CommandKind::Push | CommandKind::Pop => {
            let segment = Segment::from_name(operands[0])
                .ok_or_else(|| ParseError::UnknownSegment(operands[0].to_string()))?;
            let index = parse_u16(operands[1])?;
            if kind == CommandKind::Push {
                Command::Push { segment, index }
            } else {
                Command::Pop { segment, index }
            }
        }
        CommandKind::Label => Command::Label(operands[0].to_string()),
        CommandKind::Goto => Command::Goto(operands[0].to_string()),
        CommandKind::IfGoto => Command::IfGoto(operands[0].to_string()),
        CommandKind::Function => Command::Function {
            name: operands[0].to_string(),
            num_locals: parse_u16(operands[1])?,
        },
        CommandKind::Call => Command::Call {
            name: operands[0].to_string(),
            num_args: parse_u16(operands[1])?,
        },
        CommandKind::Return => Command::Return,
    };
    Ok(cmd)
}

fn parse_u16(tok: &str) -> Result<u16, ParseError> {
    if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::BadInteger(tok.to_string()));
    }
    tok.parse::<u16>().map_err(|_| ParseError::BadInteger(tok.to_string()))
}
