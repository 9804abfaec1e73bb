use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hackvm_rs::asm::{assemble, parse_hack_text};
use hackvm_rs::cpu::RunStats;
use hackvm_rs::exec::AluExecutor;
use hackvm_rs::isa::hack::HackDecoder;
use hackvm_rs::{Cpu, CpuConfig, Ram, Rom};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a Hack program (.asm or .hack) on the emulator")]
struct Opts {
    #[arg(value_name = "PROGRAM")]
    input: PathBuf,
    /// Step limit
    #[arg(long, default_value_t = 10_000_000u64)]
    max_steps: u64,
    /// Preset RAM cells before running, e.g. `--set 0=256`
    #[arg(long = "set", value_name = "ADDR=VALUE")]
    presets: Vec<String>,
    /// First RAM address to report
    #[arg(long, default_value_t = 0u16)]
    from: u16,
    /// Number of RAM words to report
    #[arg(long, default_value_t = 16usize)]
    count: usize,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    stats: RunStats,
    pc: u16,
    a: u16,
    d: u16,
    ram: Vec<(u16, i16)>,
}

fn parse_preset(s: &str) -> Result<(u16, u16)> {
    let (addr, val) = s.split_once('=').context("expected ADDR=VALUE")?;
    let addr: u16 = addr.trim().parse().with_context(|| format!("bad address in {s}"))?;
    let val: i16 = val.trim().parse().with_context(|| format!("bad value in {s}"))?;
    Ok((addr, val as u16))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let words = if opts.input.extension().is_some_and(|e| e == "hack") {
        parse_hack_text(&text)?
    } else {
        assemble(&text)?.words
    };

    let cfg = CpuConfig { max_steps: opts.max_steps, ..CpuConfig::default() };
    let rom = Rom::new(words);
    let mut ram = Ram::new(cfg.ram_words);
    for p in &opts.presets {
        let (addr, val) = parse_preset(p)?;
        ram.poke(addr, val);
    }

    let mut cpu = Cpu::new(cfg);
    cpu.reset(0);
    let stats = cpu.run(&rom, &mut ram, &HackDecoder::new(), &AluExecutor)?;

    let end = opts.from.saturating_add(opts.count.min(u16::MAX as usize) as u16);
    let report = Report {
        stats,
        pc: cpu.pc,
        a: cpu.a,
        d: cpu.d,
        ram: (opts.from..end).map(|a| (a, ram.peek_i16(a))).collect(),
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:?} after {} steps", report.stats.halt, report.stats.steps);
        println!("PC={} A={} D={}", report.pc, report.a, report.d as i16);
        for (addr, val) in &report.ram {
            println!("RAM[{addr:>5}] = {val}");
        }
    }
    Ok(())
}
