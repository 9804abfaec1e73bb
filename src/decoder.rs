use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::instructions::JUMP_MNEMONICS;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dest: u8 {
const M = 0b001;
const D = 0b010;
const A = 0b100;
}
}

impl Dest {
    /// Parse destination letters in any order, e.g. `AM` or `MA`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut dest = Dest::empty();
        for c in s.chars() {
            let bit = match c {
                'A' => Dest::A,
                'D' => Dest::D,
                'M' => Dest::M,
                _ => return None,
            };
            if dest.contains(bit) {
                return None;
            }
            dest |= bit;
        }
        Some(dest)
    }

    /// Canonical spelling: A, M, D in that order.
    pub fn mnemonic(self) -> String {
        let mut s = String::new();
        if self.contains(Dest::A) {
            s.push('A');
        }
        if self.contains(Dest::M) {
            s.push('M');
        }
        if self.contains(Dest::D) {
            s.push('D');
        }
        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Jump {
    Never = 0,
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl Jump {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Jump::Never,
            1 => Jump::Jgt,
            2 => Jump::Jeq,
            3 => Jump::Jge,
            4 => Jump::Jlt,
            5 => Jump::Jne,
            6 => Jump::Jle,
            _ => Jump::Jmp,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        JUMP_MNEMONICS
            .iter()
            .position(|m| *m == s)
            .map(|i| Jump::from_bits(i as u8))
    }

    pub fn mnemonic(self) -> &'static str {
        JUMP_MNEMONICS[self as usize]
    }

    /// Whether the jump is taken for an ALU result.
    pub fn taken(self, out: i16) -> bool {
        match self {
            Jump::Never => false,
            Jump::Jgt => out > 0,
            Jump::Jeq => out == 0,
            Jump::Jge => out >= 0,
            Jump::Jlt => out < 0,
            Jump::Jne => out != 0,
            Jump::Jle => out <= 0,
            Jump::Jmp => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoded {
    /// `@value`
    A(u16),
    /// `dest=comp;jump`; `comp` holds the `a c1..c6` bits
    C { comp: u8, dest: Dest, jump: Jump },
}

pub trait Decoder {
    fn decode(&self, word: u16) -> Option<Decoded>;
}
