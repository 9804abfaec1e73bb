//! Two-pass Hack assembler.

use std::collections::HashMap;

use tracing::debug;

use crate::decoder::{Decoded, Dest, Jump};
use crate::instructions::{comp_bits, is_symbol, MAX_ADDRESS, PREDEFINED, SCREEN, STATIC_BASE};
use crate::isa::hack::encode;

#[derive(thiserror::Error, Debug)]
pub enum AsmError {
    #[error("line {line}: {msg}: `{text}`")]
    Syntax { line: usize, text: String, msg: &'static str },
    #[error("line {line}: duplicate label `{name}`")]
    DuplicateLabel { line: usize, name: String },
    #[error("line {line}: {value} does not fit an A-instruction")]
    Range { line: usize, value: String },
    #[error("line {line}: no RAM left for variable `{name}`")]
    OutOfVariables { line: usize, name: String },
    #[error("line {line}: program exceeds ROM address space")]
    RomFull { line: usize },
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    map: HashMap<String, u16>,
    labels: Vec<String>,
    next_var: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        let map = PREDEFINED.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        Self { map, labels: Vec::new(), next_var: STATIC_BASE }
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// ROM labels in definition order with their addresses.
    pub fn labels(&self) -> impl Iterator<Item = (&str, u16)> + '_ {
        self.labels.iter().filter_map(|l| Some((l.as_str(), self.get(l)?)))
    }

    /// Variables (RAM symbols allocated on first use), sorted by address.
    pub fn variables(&self) -> Vec<(&str, u16)> {
        let mut vars: Vec<(&str, u16)> = self
            .map
            .iter()
            .filter(|(k, _)| !self.labels.contains(k) && !PREDEFINED.iter().any(|(p, _)| *p == k.as_str()))
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        vars.sort_by_key(|(_, v)| *v);
        vars
    }

    fn add_label(&mut self, name: &str, addr: u16) -> bool {
        if self.map.contains_key(name) {
            return false;
        }
        self.map.insert(name.to_string(), addr);
        self.labels.push(name.to_string());
        true
    }

    fn resolve_or_allocate(&mut self, name: &str) -> Option<u16> {
        if let Some(v) = self.get(name) {
            return Some(v);
        }
        if self.next_var >= SCREEN {
            return None;
        }
        let addr = self.next_var;
        self.next_var += 1;
        self.map.insert(name.to_string(), addr);
        Some(addr)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub words: Vec<u16>,
    pub symbols: SymbolTable,
}

#[derive(Debug, Clone)]
enum Value {
    Num(u16),
    Symbol(String),
}

#[derive(Debug, Clone)]
enum Item {
    Label(String),
    Load(Value),
    Compute(Decoded),
}

struct Line {
    number: usize,
    item: Item,
}

pub fn assemble(source: &str) -> Result<Program, AsmError> {
    let mut lines = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let text: String = raw.split("//").next().unwrap_or("").split_whitespace().collect();
        if text.is_empty() {
            continue;
        }
        let item = parse_item(i + 1, &text)?;
        lines.push(Line { number: i + 1, item });
    }

    // Pass 1: labels
    let mut symbols = SymbolTable::new();
    let mut pc: u32 = 0;
    for l in &lines {
        match &l.item {
            Item::Label(name) => {
                if pc > u32::from(MAX_ADDRESS) {
                    return Err(AsmError::RomFull { line: l.number });
                }
                if !symbols.add_label(name, pc as u16) {
                    return Err(AsmError::DuplicateLabel { line: l.number, name: name.clone() });
                }
            }
            _ => pc += 1,
        }
    }
    if pc > u32::from(MAX_ADDRESS) + 1 {
        return Err(AsmError::RomFull { line: lines.last().map_or(0, |l| l.number) });
    }

    // Pass 2: encode
    let mut words = Vec::with_capacity(pc as usize);
    for l in &lines {
        let d = match &l.item {
            Item::Label(_) => continue,
            Item::Load(Value::Num(v)) => Decoded::A(*v),
            Item::Load(Value::Symbol(name)) => {
                let v = symbols
                    .resolve_or_allocate(name)
                    .ok_or_else(|| AsmError::OutOfVariables { line: l.number, name: name.clone() })?;
                Decoded::A(v)
            }
            Item::Compute(d) => *d,
        };
        words.push(encode(&d));
    }
    debug!(words = words.len(), labels = symbols.labels.len(), "assembled");
    Ok(Program { words, symbols })
}

fn parse_item(line: usize, text: &str) -> Result<Item, AsmError> {
    let syntax = |msg| AsmError::Syntax { line, text: text.to_string(), msg };

    if let Some(inner) = text.strip_prefix('(') {
        let name = inner.strip_suffix(')').ok_or_else(|| syntax("unterminated label"))?;
        if !is_symbol(name) {
            return Err(syntax("bad label name"));
        }
        return Ok(Item::Label(name.to_string()));
    }

    if let Some(v) = text.strip_prefix('@') {
        if v.starts_with(|c: char| c.is_ascii_digit()) {
            let n: u32 = v.parse().map_err(|_| syntax("bad number"))?;
            if n > u32::from(MAX_ADDRESS) {
                return Err(AsmError::Range { line, value: v.to_string() });
            }
            return Ok(Item::Load(Value::Num(n as u16)));
        }
        if !is_symbol(v) {
            return Err(syntax("bad symbol"));
        }
        return Ok(Item::Load(Value::Symbol(v.to_string())));
    }

    // dest=comp;jump
    let (dest, rest) = match text.split_once('=') {
        Some((d, r)) => (Dest::parse(d).ok_or_else(|| syntax("bad destination"))?, r),
        None => (Dest::empty(), text),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((c, j)) => (c, Jump::parse(j).filter(|j| *j != Jump::Never).ok_or_else(|| syntax("bad jump"))?),
        None => (rest, Jump::Never),
    };
    let comp = comp_bits(comp).ok_or_else(|| syntax("bad computation"))?;
    Ok(Item::Compute(Decoded::C { comp, dest, jump }))
}

/// `.hack` text: one 16-character binary word per line.
pub fn to_hack_text(words: &[u16]) -> String {
    let mut s = String::with_capacity(words.len() * 17);
    for w in words {
        s.push_str(&format!("{w:016b}\n"));
    }
    s
}

pub fn parse_hack_text(text: &str) -> Result<Vec<u16>, AsmError> {
    let mut words = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let t = raw.trim();
        if t.is_empty() {
            continue;
        }
        if t.len() != 16 || !t.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(AsmError::Syntax { line: i + 1, text: t.to_string(), msg: "expected 16 binary digits" });
        }
        let w = u16::from_str_radix(t, 2).map_err(|_| AsmError::Syntax {
            line: i + 1,
            text: t.to_string(),
            msg: "expected 16 binary digits",
        })?;
        words.push(w);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_resolve_forward() {
        let p = assemble("@END\n0;JMP\n(END)\n@END\n0;JMP\n").unwrap();
        assert_eq!(p.symbols.get("END"), Some(2));
        assert_eq!(p.words[0], 2);
        assert_eq!(p.words.len(), 4);
    }

    #[test]
    fn variables_start_at_16_in_first_use_order() {
        let p = assemble("@foo\nM=0\n@bar\nM=1\n@foo\nD=M\n").unwrap();
        assert_eq!(p.symbols.get("foo"), Some(16));
        assert_eq!(p.symbols.get("bar"), Some(17));
        assert_eq!(p.words[4], 16);
        assert_eq!(p.symbols.variables(), vec![("foo", 16), ("bar", 17)]);
    }

    #[test]
    fn c_instruction_encodings() {
        let p = assemble("D=M\nAM=M-1\nMD=D+1\n0;JMP\nD;JGT\nM=D|M\n").unwrap();
        assert_eq!(
            p.words,
            vec![
                0b1111_1100_0001_0000,
                0b1111_1100_1010_1000,
                0b1110_0111_1101_1000,
                0b1110_1010_1000_0111,
                0b1110_0011_0000_0001,
                0b1111_0101_0100_1000,
            ]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        assert!(matches!(assemble("D=M\nD=Q"), Err(AsmError::Syntax { line: 2, .. })));
        assert!(matches!(assemble("(X)\n(X)"), Err(AsmError::DuplicateLabel { line: 2, .. })));
        assert!(matches!(assemble("@32768"), Err(AsmError::Range { line: 1, .. })));
        assert!(matches!(assemble("DD=M"), Err(AsmError::Syntax { .. })));
        assert!(matches!(assemble("0;JXX"), Err(AsmError::Syntax { .. })));
    }

    #[test]
    fn hack_text_round_trip() {
        let words = vec![0, 0x7FFF, 0xFC10];
        let text = to_hack_text(&words);
        assert!(text.starts_with("0000000000000000\n0111111111111111\n"));
        assert_eq!(parse_hack_text(&text).unwrap(), words);
        assert!(parse_hack_text("0101").is_err());
    }
}
