//! Hack platform facts shared by the code emitter, assembler and emulator.

pub const SP: u16 = 0;
pub const LCL: u16 = 1;
pub const ARG: u16 = 2;
pub const THIS: u16 = 3;
pub const THAT: u16 = 4;
pub const TEMP_BASE: u16 = 5;
pub const TEMP_SIZE: u16 = 8;
pub const STATIC_BASE: u16 = 16;
pub const STATIC_SIZE: u16 = 240;
pub const STACK_BASE: u16 = 256;
pub const SCREEN: u16 = 16384;
pub const KBD: u16 = 24576;
pub const RAM_WORDS: usize = 32 * 1024;

/// Largest value an A-instruction can load.
pub const MAX_ADDRESS: u16 = 0x7FFF;

/// One row of the ALU computation table. `bits` is `a c1 c2 c3 c4 c5 c6`.
#[derive(Debug, Clone, Copy)]
pub struct CompDesc {
    pub mnemonic: &'static str,
    pub bits: u8,
}

pub const COMP_TABLE: &[CompDesc] = &[
    CompDesc { mnemonic: "0", bits: 0b0101010 },
    CompDesc { mnemonic: "1", bits: 0b0111111 },
    CompDesc { mnemonic: "-1", bits: 0b0111010 },
    CompDesc { mnemonic: "D", bits: 0b0001100 },
    CompDesc { mnemonic: "A", bits: 0b0110000 },
    CompDesc { mnemonic: "!D", bits: 0b0001101 },
    CompDesc { mnemonic: "!A", bits: 0b0110001 },
    CompDesc { mnemonic: "-D", bits: 0b0001111 },
    CompDesc { mnemonic: "-A", bits: 0b0110011 },
    CompDesc { mnemonic: "D+1", bits: 0b0011111 },
    CompDesc { mnemonic: "A+1", bits: 0b0110111 },
    CompDesc { mnemonic: "D-1", bits: 0b0001110 },
    CompDesc { mnemonic: "A-1", bits: 0b0110010 },
    CompDesc { mnemonic: "D+A", bits: 0b0000010 },
    CompDesc { mnemonic: "D-A", bits: 0b0010011 },
    CompDesc { mnemonic: "A-D", bits: 0b0000111 },
    CompDesc { mnemonic: "D&A", bits: 0b0000000 },
    CompDesc { mnemonic: "D|A", bits: 0b0010101 },
    CompDesc { mnemonic: "M", bits: 0b1110000 },
    CompDesc { mnemonic: "!M", bits: 0b1110001 },
    CompDesc { mnemonic: "-M", bits: 0b1110011 },
    CompDesc { mnemonic: "M+1", bits: 0b1110111 },
    CompDesc { mnemonic: "M-1", bits: 0b1110010 },
    CompDesc { mnemonic: "D+M", bits: 0b1000010 },
    CompDesc { mnemonic: "D-M", bits: 0b1010011 },
    CompDesc { mnemonic: "M-D", bits: 0b1000111 },
    CompDesc { mnemonic: "D&M", bits: 0b1000000 },
    CompDesc { mnemonic: "D|M", bits: 0b1010101 },
];

// Commutative spellings accepted by the assembler.
const COMP_ALIASES: &[(&str, &str)] = &[
    ("A+D", "D+A"),
    ("M+D", "D+M"),
    ("A&D", "D&A"),
    ("M&D", "D&M"),
    ("A|D", "D|A"),
    ("M|D", "D|M"),
    ("1+D", "D+1"),
    ("1+A", "A+1"),
    ("1+M", "M+1"),
];

pub const JUMP_MNEMONICS: [&str; 8] = ["", "JGT", "JEQ", "JGE", "JLT", "JNE", "JLE", "JMP"];

pub fn comp_bits(mnemonic: &str) -> Option<u8> {
    let canonical = COMP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == mnemonic)
        .map_or(mnemonic, |(_, c)| *c);
    COMP_TABLE.iter().find(|d| d.mnemonic == canonical).map(|d| d.bits)
}

pub fn comp_mnemonic(bits: u8) -> Option<&'static str> {
    COMP_TABLE.iter().find(|d| d.bits == bits).map(|d| d.mnemonic)
}

pub const PREDEFINED: &[(&str, u16)] = &[
    ("SP", SP),
    ("LCL", LCL),
    ("ARG", ARG),
    ("THIS", THIS),
    ("THAT", THAT),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", SCREEN),
    ("KBD", KBD),
];

/// Assembler symbol: letters, digits, `_ . $ :`, not starting with a digit.
pub fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if !c.is_ascii_digit() && is_symbol_char(c) => chars.all(is_symbol_char),
        _ => false,
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comp_table_is_injective() {
        for (i, a) in COMP_TABLE.iter().enumerate() {
            for b in &COMP_TABLE[i + 1..] {
                assert_ne!(a.bits, b.bits, "{} / {}", a.mnemonic, b.mnemonic);
            }
        }
        assert_eq!(comp_bits("M+D"), comp_bits("D+M"));
        assert_eq!(comp_mnemonic(0b1000111), Some("M-D"));
        assert_eq!(comp_bits("D*M"), None);
    }

    #[test]
    fn symbols() {
        assert!(is_symbol("Main.fib$LOOP"));
        assert!(is_symbol("_x:1"));
        assert!(!is_symbol("1abc"));
        assert!(!is_symbol(""));
        assert!(!is_symbol("a-b"));
    }
}
