use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use hackvm_rs::translator::Job;
use hackvm_rs::{Bootstrap, TranslatorConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Translate VM code (.vm file or directory) to Hack assembly")]
struct Opts {
    /// A .vm file or a directory of .vm files
    #[arg(value_name = "PATH")]
    input: PathBuf,
    /// Output .asm path (default: derived from the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override when the bootstrap prologue is emitted
    #[arg(long, value_enum)]
    bootstrap: Option<BootstrapArg>,
    /// Override the function called by the bootstrap
    #[arg(long)]
    entry: Option<String>,
    /// Omit the `// command` annotation lines
    #[arg(long)]
    no_comments: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BootstrapArg {
    Auto,
    Always,
    Never,
}

impl From<BootstrapArg> for Bootstrap {
    fn from(b: BootstrapArg) -> Self {
        match b {
            BootstrapArg::Auto => Bootstrap::Auto,
            BootstrapArg::Always => Bootstrap::Always,
            BootstrapArg::Never => Bootstrap::Never,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let mut cfg = match &opts.config {
        Some(path) => TranslatorConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TranslatorConfig::default(),
    };
    if let Some(b) = opts.bootstrap {
        cfg.bootstrap = b.into();
    }
    if let Some(entry) = opts.entry {
        cfg.entry = entry;
    }
    if opts.no_comments {
        cfg.annotate = false;
    }

    let mut job = Job::plan(&opts.input)?;
    if let Some(out) = opts.output {
        job.output = out;
    }
    let written = job.run(&cfg)?;
    println!("Output written to '{}'", written.display());
    Ok(())
}
