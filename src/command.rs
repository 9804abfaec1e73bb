use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a VM command, mirroring the keyword it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
}

impl CommandKind {
    /// Classify a command by its first token. Anything that is not a keyword is
    /// an arithmetic/logical operator.
    pub fn classify(keyword: &str) -> Self {
        match keyword {
            "push" => CommandKind::Push,
            "pop" => CommandKind::Pop,
            "label" => CommandKind::Label,
            "goto" => CommandKind::Goto,
            "if-goto" => CommandKind::IfGoto,
            "function" => CommandKind::Function,
            "call" => CommandKind::Call,
            "return" => CommandKind::Return,
            _ => CommandKind::Arithmetic,
        }
    }

    /// Number of tokens after the keyword.
    pub fn operand_count(self) -> usize {
        match self {
            CommandKind::Arithmetic | CommandKind::Return => 0,
            CommandKind::Label | CommandKind::Goto | CommandKind::IfGoto => 1,
            CommandKind::Push | CommandKind::Pop | CommandKind::Function | CommandKind::Call => 2,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::Arithmetic => "arithmetic",
            CommandKind::Push => "push",
            CommandKind::Pop => "pop",
            CommandKind::Label => "label",
            CommandKind::Goto => "goto",
            CommandKind::IfGoto => "if-goto",
            CommandKind::Function => "function",
            CommandKind::Call => "call",
            CommandKind::Return => "return",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy)]
pub struct OpDesc {
    pub op: ArithOp,
    pub mnemonic: &'static str,
    pub arity: u8,
}

pub const OPS: &[OpDesc] = &[
    OpDesc { op: ArithOp::Add, mnemonic: "add", arity: 2 },
    OpDesc { op: ArithOp::Sub, mnemonic: "sub", arity: 2 },
    OpDesc { op: ArithOp::Neg, mnemonic: "neg", arity: 1 },
    OpDesc { op: ArithOp::Eq, mnemonic: "eq", arity: 2 },
    OpDesc { op: ArithOp::Gt, mnemonic: "gt", arity: 2 },
    OpDesc { op: ArithOp::Lt, mnemonic: "lt", arity: 2 },
    OpDesc { op: ArithOp::And, mnemonic: "and", arity: 2 },
    OpDesc { op: ArithOp::Or, mnemonic: "or", arity: 2 },
    OpDesc { op: ArithOp::Not, mnemonic: "not", arity: 1 },
];

impl ArithOp {
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        OPS.iter().find(|d| d.mnemonic == s).map(|d| d.op)
    }

    fn desc(self) -> &'static OpDesc {
        // OPS lists every variant
        OPS.iter().find(|d| d.op == self).unwrap_or(&OPS[0])
    }

    pub fn mnemonic(self) -> &'static str {
        self.desc().mnemonic
    }

    pub fn arity(self) -> u8 {
        self.desc().arity
    }

    pub fn is_relational(self) -> bool {
        matches!(self, ArithOp::Eq | ArithOp::Gt | ArithOp::Lt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Static,
    Temp,
    Pointer,
}

impl Segment {
    pub fn from_name(s: &str) -> Option<Self> {
        Some(match s {
            "constant" => Segment::Constant,
            "local" => Segment::Local,
            "argument" => Segment::Argument,
            "this" => Segment::This,
            "that" => Segment::That,
            "static" => Segment::Static,
            "temp" => Segment::Temp,
            "pointer" => Segment::Pointer,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Static => "static",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
        }
    }
}

/// One classified line of VM source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Arithmetic(ArithOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, num_locals: u16 },
    Call { name: String, num_args: u16 },
    Return,
}

/// An argument accessor was used on a command kind that does not carry it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("`{kind}` command has no {arg}")]
pub struct ContractViolation {
    pub kind: &'static str,
    pub arg: &'static str,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Arithmetic(_) => CommandKind::Arithmetic,
            Command::Push { .. } => CommandKind::Push,
            Command::Pop { .. } => CommandKind::Pop,
            Command::Label(_) => CommandKind::Label,
            Command::Goto(_) => CommandKind::Goto,
            Command::IfGoto(_) => CommandKind::IfGoto,
            Command::Function { .. } => CommandKind::Function,
            Command::Call { .. } => CommandKind::Call,
            Command::Return => CommandKind::Return,
        }
    }

    /// Primary argument: operator name, segment name or symbol.
    pub fn arg1(&self) -> Result<&str, ContractViolation> {
        match self {
            Command::Arithmetic(op) => Ok(op.mnemonic()),
            Command::Push { segment, .. } | Command::Pop { segment, .. } => Ok(segment.name()),
            Command::Label(name) | Command::Goto(name) | Command::IfGoto(name) => Ok(name),
            Command::Function { name, .. } | Command::Call { name, .. } => Ok(name),
            Command::Return => Err(ContractViolation { kind: "return", arg: "arg1" }),
        }
    }

    /// Secondary argument: index, local count or argument count.
    pub fn arg2(&self) -> Result<u16, ContractViolation> {
        match self {
            Command::Push { index, .. } | Command::Pop { index, .. } => Ok(*index),
            Command::Function { num_locals, .. } => Ok(*num_locals),
            Command::Call { num_args, .. } => Ok(*num_args),
            other => Err(ContractViolation { kind: other.kind().keyword(), arg: "arg2" }),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => f.write_str(op.mnemonic()),
            Command::Push { segment, index } => write!(f, "push {} {index}", segment.name()),
            Command::Pop { segment, index } => write!(f, "pop {} {index}", segment.name()),
            Command::Label(name) => write!(f, "label {name}"),
            Command::Goto(name) => write!(f, "goto {name}"),
            Command::IfGoto(name) => write!(f, "if-goto {name}"),
            Command::Function { name, num_locals } => write!(f, "function {name} {num_locals}"),
            Command::Call { name, num_args } => write!(f, "call {name} {num_args}"),
            Command::Return => f.write_str("return"),
        }
    }
}
