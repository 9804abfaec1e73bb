use std::io;
use std::path::PathBuf;

/// Malformed VM source, detected while classifying a single line.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown segment `{0}`")]
    UnknownSegment(String),
    #[error("`{keyword}` takes {expected} operand(s), found {found}")]
    Arity {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is not a non-negative 16-bit integer")]
    BadInteger(String),
}

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("invalid operand `{operand}`: {reason}")]
    InvalidOperand { operand: String, reason: &'static str },
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

impl EmitError {
    pub(crate) fn operand(operand: impl std::fmt::Display, reason: &'static str) -> Self {
        EmitError::InvalidOperand { operand: operand.to_string(), reason }
    }
}

/// Any failure of a translation run. Every variant is fatal for the run.
#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error("{unit}:{line}: {source}: `{text}`")]
    Parse {
        unit: String,
        line: usize,
        text: String,
        #[source]
        source: ParseError,
    },
    #[error("{unit}:{line}: {source}: `{text}`")]
    Emit {
        unit: String,
        line: usize,
        text: String,
        #[source]
        source: EmitError,
    },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}: no .vm files found")]
    EmptyDirectory(PathBuf),
    #[error("{0}: expected a .vm file or a directory")]
    UnsupportedInput(PathBuf),
    #[error("configuration: {0}")]
    Config(String),
}

impl TranslateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TranslateError::Io { path: path.into(), source }
    }
}
