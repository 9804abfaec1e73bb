pub mod asm;
pub mod codegen;
pub mod command;
pub mod config;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod exec;
pub mod instructions;
pub mod memory;
pub mod parser;
pub mod translator;

pub mod isa {
    pub mod hack; // Hack platform decoder
}

pub use codegen::CodeWriter;
pub use command::{ArithOp, Command, CommandKind, Segment};
pub use config::{Bootstrap, TranslatorConfig};
pub use cpu::{Cpu, CpuConfig, Halt, Trap};
pub use error::{EmitError, ParseError, TranslateError};
pub use memory::{Bus, Ram, Rom};
pub use parser::Parser;
pub use translator::Translator;
