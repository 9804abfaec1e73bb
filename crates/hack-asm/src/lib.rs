use std::collections::HashMap;
use std::fmt::Write as _;

use hackvm_rs::asm::SymbolTable;
use hackvm_rs::decoder::Decoder;
use hackvm_rs::disasm::fmt_with_labels;
use hackvm_rs::isa::hack::HackDecoder;
use serde::{Deserialize, Serialize};

/// One entry of a label file: `[{ "addr": 12, "name": "LOOP" }, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelKV {
    pub addr: u16,
    pub name: String,
}

/// Exported symbol file written by `assemble --symbols-out`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolsOut {
    pub labels: Vec<LabelKV>,
    pub variables: Vec<LabelKV>,
}

impl SymbolsOut {
    pub fn from_table(t: &SymbolTable) -> Self {
        let kv = |(name, addr): (&str, u16)| LabelKV { addr, name: name.to_string() };
        Self {
            labels: t.labels().map(kv).collect(),
            variables: t.variables().into_iter().map(kv).collect(),
        }
    }
}

/// Label map for the listing; later entries win on duplicate addresses.
pub fn label_map(labels: &[LabelKV]) -> HashMap<u16, String> {
    labels.iter().map(|kv| (kv.addr, kv.name.clone())).collect()
}

/// One line per word: address, optional raw bits, decoded text.
/// Labels defined at an address get their own `(NAME)` line.
pub fn render_listing(words: &[u16], labels: &HashMap<u16, String>, show_bits: bool) -> String {
    let dec = HackDecoder::new();
    let decoded: Vec<_> = words.iter().map(|w| dec.decode(*w)).collect();
    let mut buf = String::new();
    for (pc, d) in decoded.iter().enumerate() {
        let pc = pc as u16;
        if let Some(name) = labels.get(&pc) {
            let _ = writeln!(buf, "({name})");
        }
        let _ = write!(buf, "{pc:>5}: ");
        if show_bits {
            let _ = write!(buf, "{:016b}  ", words[pc as usize]);
        }
        match d {
            Some(d) => {
                let next = decoded.get(pc as usize + 1).and_then(|n| n.as_ref());
                let _ = writeln!(buf, "{}", fmt_with_labels(d, next, labels));
            }
            None => {
                let _ = writeln!(buf, ".word {:#06x}", words[pc as usize]);
            }
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackvm_rs::asm::assemble;

    #[test]
    fn symbols_export_lists_labels_and_variables() {
        let p = assemble("(LOOP)\n@i\nM=M+1\n@LOOP\n0;JMP\n").unwrap();
        let out = SymbolsOut::from_table(&p.symbols);
        assert_eq!(out.labels, vec![LabelKV { addr: 0, name: "LOOP".into() }]);
        assert_eq!(out.variables, vec![LabelKV { addr: 16, name: "i".into() }]);
    }

    #[test]
    fn listing_names_jump_targets() {
        let p = assemble("(LOOP)\n@i\nM=M+1\n@LOOP\n0;JMP\n").unwrap();
        let labels = label_map(&SymbolsOut::from_table(&p.symbols).labels);
        let text = render_listing(&p.words, &labels, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "(LOOP)");
        assert_eq!(lines[1], "    0: @16");
        assert_eq!(lines[2], "    1: M=M+1");
        assert_eq!(lines[3], "    2: @LOOP");
        assert_eq!(lines[4], "    3: 0;JMP");
    }

    #[test]
    fn listing_marks_undecodable_words() {
        let text = render_listing(&[0b1000_0000_0000_0000], &HashMap::new(), true);
        assert_eq!(text, "    0: 1000000000000000  .word 0x8000\n");
    }
}
