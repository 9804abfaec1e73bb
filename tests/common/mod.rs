#![allow(dead_code)]

use hackvm_rs::asm::{assemble, Program};
use hackvm_rs::cpu::RunStats;
use hackvm_rs::exec::AluExecutor;
use hackvm_rs::isa::hack::HackDecoder;
use hackvm_rs::translator::translate_sources;
use hackvm_rs::{Cpu, CpuConfig, Halt, Ram, Rom, TranslatorConfig};

pub const LCL_BASE: u16 = 300;
pub const ARG_BASE: u16 = 400;
pub const THIS_BASE: u16 = 3000;
pub const THAT_BASE: u16 = 3010;

/// Segment pointers for programs run without the bootstrap.
pub const DEFAULT_FRAME: &[(u16, u16)] =
    &[(0, 256), (1, LCL_BASE), (2, ARG_BASE), (3, THIS_BASE), (4, THAT_BASE)];

pub struct Machine {
    pub asm: String,
    pub program: Program,
    pub ram: Ram,
    pub cpu: Cpu,
    pub stats: RunStats,
}

impl Machine {
    pub fn word(&self, addr: u16) -> i16 {
        self.ram.peek_i16(addr)
    }

    pub fn sp(&self) -> u16 {
        self.ram.peek(0)
    }

    /// Value on top of the stack.
    pub fn top(&self) -> i16 {
        self.word(self.sp() - 1)
    }
}

pub fn quiet() -> TranslatorConfig {
    TranslatorConfig { annotate: false, ..TranslatorConfig::default() }
}

/// Translate, assemble and run. `ram` presets are applied before the first step.
pub fn run_units(units: &[(&str, &str)], bootstrap: bool, ram: &[(u16, u16)]) -> Machine {
    let asm = translate_sources(units, bootstrap, &TranslatorConfig::default()).unwrap();
    let program = assemble(&asm).unwrap();

    let rom = Rom::new(program.words.clone());
    let mut mem = Ram::default();
    for &(addr, val) in ram {
        mem.poke(addr, val);
    }
    let mut cpu = Cpu::new(CpuConfig { max_steps: 1_000_000, ..CpuConfig::default() });
    cpu.reset(0);
    let stats = cpu.run(&rom, &mut mem, &HackDecoder::new(), &AluExecutor).unwrap();
    assert_ne!(stats.halt, Halt::StepLimit, "program did not terminate");
    Machine { asm, program, ram: mem, cpu, stats }
}

/// One unit named `Main`, no bootstrap, default frame pointers.
pub fn run_vm(source: &str) -> Machine {
    run_units(&[("Main", source)], false, DEFAULT_FRAME)
}

pub fn run_vm_with(source: &str, extra: &[(u16, u16)]) -> Machine {
    let mut ram = DEFAULT_FRAME.to_vec();
    ram.extend_from_slice(extra);
    run_units(&[("Main", source)], false, &ram)
}

/// Every `(LABEL)` definition in assembly text.
pub fn label_defs(asm: &str) -> Vec<&str> {
    asm.lines()
        .filter_map(|l| l.trim().strip_prefix('(')?.strip_suffix(')'))
        .collect()
}
