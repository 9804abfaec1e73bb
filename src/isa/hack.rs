use crate::decoder::{Decoded, Decoder, Dest, Jump};
use crate::instructions::comp_mnemonic;

const C_PREFIX: u16 = 0b111 << 13;

/// Decoder for the 16-bit Hack instruction set.
///
/// Strict: C-instructions must carry the `111` prefix and a computation from
/// the canonical table, anything else is rejected.
pub struct HackDecoder;

impl HackDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HackDecoder {
    fn decode(&self, word: u16) -> Option<Decoded> {
        if word & 0x8000 == 0 {
            return Some(Decoded::A(word));
        }
        if word & C_PREFIX != C_PREFIX {
            return None;
        }
        let comp = ((word >> 6) & 0x7F) as u8;
        comp_mnemonic(comp)?;
        let dest = Dest::from_bits_truncate(((word >> 3) & 0b111) as u8);
        let jump = Jump::from_bits((word & 0b111) as u8);
        Some(Decoded::C { comp, dest, jump })
    }
}

pub fn encode(d: &Decoded) -> u16 {
    match *d {
        Decoded::A(v) => v & 0x7FFF,
        Decoded::C { comp, dest, jump } => {
            C_PREFIX | (u16::from(comp & 0x7F) << 6) | (u16::from(dest.bits()) << 3) | jump as u16
        }
    }
}
