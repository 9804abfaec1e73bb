use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hack_asm::{label_map, render_listing, LabelKV, SymbolsOut};
use hackvm_rs::asm::{assemble, parse_hack_text, to_hack_text};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hack assembler / disassembler CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a .asm file into .hack text
    Assemble {
        #[arg(value_name = "ASMFILE")]
        input: PathBuf,
        /// Output path (default: input with .hack extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export labels and variables to JSON
        #[arg(long, value_name = "FILE")]
        symbols_out: Option<PathBuf>,
    },
    /// Disassemble a .hack file
    Disasm {
        #[arg(value_name = "HACKFILE")]
        input: PathBuf,
        /// Import labels from JSON (Vec<{ addr, name }>)
        #[arg(long, value_name = "FILE")]
        labels_in: Option<PathBuf>,
        /// Show the binary word next to each instruction
        #[arg(long)]
        show_bits: bool,
        /// Write the listing to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().cmd {
        Command::Assemble { input, output, symbols_out } => {
            let program = assemble(&read(&input)?)
                .with_context(|| format!("assembling {}", input.display()))?;
            let output = output.unwrap_or_else(|| input.with_extension("hack"));
            std::fs::write(&output, to_hack_text(&program.words))
                .with_context(|| format!("writing {}", output.display()))?;
            info!(words = program.words.len(), output = %output.display(), "assembled");
            if let Some(path) = symbols_out {
                let json = serde_json::to_string_pretty(&SymbolsOut::from_table(&program.symbols))?;
                std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Command::Disasm { input, labels_in, show_bits, out } => {
            let words = parse_hack_text(&read(&input)?)?;
            let labels = match &labels_in {
                Some(path) => {
                    let kvs: Vec<LabelKV> = serde_json::from_str(&read(path)?)
                        .with_context(|| format!("parsing labels {}", path.display()))?;
                    label_map(&kvs)
                }
                None => Default::default(),
            };
            let listing = render_listing(&words, &labels, show_bits);
            match out {
                Some(path) => std::fs::write(&path, listing)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{listing}"),
            }
        }
    }
    Ok(())
}
