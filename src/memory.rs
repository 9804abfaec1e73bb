use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::instructions::RAM_WORDS;

/// Data memory as seen by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> Result<u16>;
    fn write(&mut self, addr: u16, val: u16) -> Result<()>;
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Ram {
    pub words: Vec<u16>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self { words: vec![0; size] }
    }

    /// Read without going through the bus; out-of-range reads as 0.
    pub fn peek(&self, addr: u16) -> u16 {
        self.words.get(addr as usize).copied().unwrap_or(0)
    }

    /// Signed view of a cell.
    pub fn peek_i16(&self, addr: u16) -> i16 {
        self.peek(addr) as i16
    }

    pub fn poke(&mut self, addr: u16, val: u16) {
        if let Some(w) = self.words.get_mut(addr as usize) {
            *w = val;
        }
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(RAM_WORDS)
    }
}

impl Bus for Ram {
    fn read(&mut self, addr: u16) -> Result<u16> {
        match self.words.get(addr as usize) {
            Some(w) => Ok(*w),
            None => bail!("read beyond {} words of RAM", self.words.len()),
        }
    }
    fn write(&mut self, addr: u16, val: u16) -> Result<()> {
        let len = self.words.len();
        match self.words.get_mut(addr as usize) {
            Some(w) => {
                *w = val;
                Ok(())
            }
            None => bail!("write beyond {len} words of RAM"),
        }
    }
}

/// Instruction memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rom {
    pub words: Vec<u16>,
}

impl Rom {
    pub fn new(words: Vec<u16>) -> Self {
        Self { words }
    }

    pub fn fetch(&self, pc: u16) -> Option<u16> {
        self.words.get(pc as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
