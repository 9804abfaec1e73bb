use anyhow::Error;
use serde::{Deserialize, Serialize};

use crate::decoder::{Decoded, Decoder, Jump};
use crate::exec::Executor;
use crate::instructions::RAM_WORDS;
use crate::memory::{Bus, Rom};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub ram_words: usize,
    /// Upper bound for `Cpu::run`
    pub max_steps: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            ram_words: RAM_WORDS,
            max_steps: 10_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u16,
    pub a: u16,
    pub d: u16,
    pub cfg: CpuConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("Invalid instruction {word:#06x} at {pc}")]
    InvalidInstruction { pc: u16, word: u16 },
    #[error("PC {pc} outside ROM")]
    PcOutOfRange { pc: u16 },
    #[error("Bus error at {addr}: {source}")]
    Bus { addr: u16, #[source] source: Error },
}

/// Why `Cpu::run` stopped without a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// PC moved past the last instruction
    EndOfProgram,
    /// `@X` at address X followed by an unconditional jump
    SelfLoop { pc: u16 },
    StepLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub steps: u64,
    pub halt: Halt,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self { pc: 0, a: 0, d: 0, cfg }
    }

    pub fn reset(&mut self, reset_pc: u16) {
        self.pc = reset_pc;
        self.a = 0;
        self.d = 0;
    }

    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        rom: &Rom,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<(), Trap> {
        let pc = self.pc;
        let word = rom.fetch(pc).ok_or(Trap::PcOutOfRange { pc })?;
        let d = dec.decode(word).ok_or(Trap::InvalidInstruction { pc, word })?;
        self.pc = pc.wrapping_add(1);
        exec.exec(self, bus, d)
    }

    /// Step until the program ends, parks in a self loop, or hits `max_steps`.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        rom: &Rom,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<RunStats, Trap> {
        let mut steps = 0u64;
        while steps < self.cfg.max_steps {
            if self.pc as usize >= rom.len() {
                return Ok(RunStats { steps, halt: Halt::EndOfProgram });
            }
            if is_self_loop(rom, dec, self.pc) {
                return Ok(RunStats { steps, halt: Halt::SelfLoop { pc: self.pc } });
            }
            self.step(rom, bus, dec, exec)?;
            steps += 1;
        }
        Ok(RunStats { steps, halt: Halt::StepLimit })
    }
}

fn is_self_loop<D: Decoder>(rom: &Rom, dec: &D, pc: u16) -> bool {
    let load = rom.fetch(pc).and_then(|w| dec.decode(w));
    let jump = rom.fetch(pc.wrapping_add(1)).and_then(|w| dec.decode(w));
    matches!(
        (load, jump),
        (Some(Decoded::A(target)), Some(Decoded::C { dest, jump: Jump::Jmp, .. }))
            if target == pc && dest.is_empty()
    )
}
