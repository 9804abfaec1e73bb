use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codegen::CodeWriter;
use crate::config::TranslatorConfig;
use crate::error::{EmitError, TranslateError};
use crate::parser::Parser;

const VM_EXT: &str = "vm";
const ASM_EXT: &str = "asm";

/// Drives parser and emitter over a batch of units sharing one output stream.
pub struct Translator<W: Write> {
    writer: CodeWriter<W>,
    cfg: TranslatorConfig,
}

impl<W: Write> Translator<W> {
    pub fn new(out: W, cfg: TranslatorConfig) -> Self {
        let writer = CodeWriter::new(out).with_annotations(cfg.annotate);
        Self { writer, cfg }
    }

    pub fn write_bootstrap(&mut self) -> Result<(), TranslateError> {
        debug!(entry = %self.cfg.entry, stack_base = self.cfg.stack_base, "bootstrap");
        self.writer
            .write_bootstrap(self.cfg.stack_base, &self.cfg.entry)
            .map_err(|source| TranslateError::Emit {
                unit: "<bootstrap>".to_string(),
                line: 0,
                text: format!("call {} 0", self.cfg.entry),
                source,
            })
    }

    /// Translate every command of one unit. Returns the number of commands.
    pub fn translate_unit(&mut self, mut parser: Parser) -> Result<usize, TranslateError> {
        self.writer.set_unit(parser.unit());
        let mut count = 0;
        while let Some(cmd) = parser.advance() {
            let cmd = cmd?;
            if let Err(source) = self.writer.write(&cmd) {
                let (line, text) = parser
                    .current_line()
                    .map(|l| (l.number, l.text.clone()))
                    .unwrap_or_default();
                return Err(TranslateError::Emit { unit: parser.unit().to_string(), line, text, source });
            }
            count += 1;
        }
        debug!(unit = parser.unit(), commands = count, "unit done");
        Ok(count)
    }

    pub fn translate_source(&mut self, unit: &str, source: &str) -> Result<usize, TranslateError> {
        self.translate_unit(Parser::new(unit, source))
    }

    pub fn finish(self) -> Result<W, TranslateError> {
        self.writer.finish().map_err(|e| match e {
            EmitError::Io(source) => TranslateError::Io { path: PathBuf::from("<output>"), source },
            other => TranslateError::Emit { unit: String::new(), line: 0, text: String::new(), source: other },
        })
    }
}

/// Inputs and output resolved from a command-line path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub units: Vec<PathBuf>,
    pub output: PathBuf,
    pub multi_unit: bool,
}

impl Job {
    /// `Foo.vm` becomes `Foo.asm` next to it; a directory `Prog/` becomes
    /// `Prog/Prog.asm` over its `.vm` files in file-name order.
    pub fn plan(input: &Path) -> Result<Self, TranslateError> {
        if input.is_dir() {
            let mut units = Vec::new();
            let entries = std::fs::read_dir(input).map_err(|e| TranslateError::io(input, e))?;
            for entry in entries {
                let path = entry.map_err(|e| TranslateError::io(input, e))?.path();
                if path.is_file() && has_ext(&path, VM_EXT) {
                    units.push(path);
                }
            }
            if units.is_empty() {
                warn!(dir = %input.display(), "no .vm files");
                return Err(TranslateError::EmptyDirectory(input.to_path_buf()));
            }
            units.sort();
            let name = input
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "out".to_string());
            let output = input.join(format!("{name}.{ASM_EXT}"));
            return Ok(Self { units, output, multi_unit: true });
        }
        if input.is_file() && has_ext(input, VM_EXT) {
            return Ok(Self {
                units: vec![input.to_path_buf()],
                output: input.with_extension(ASM_EXT),
                multi_unit: false,
            });
        }
        if !input.exists() {
            return Err(TranslateError::io(
                input,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
        Err(TranslateError::UnsupportedInput(input.to_path_buf()))
    }

    /// Translate all units in memory, then write the output in one go so a
    /// failed run leaves no partial file behind.
    pub fn run(&self, cfg: &TranslatorConfig) -> Result<PathBuf, TranslateError> {
        let mut tr = Translator::new(Vec::new(), cfg.clone());
        if cfg.wants_bootstrap(self.multi_unit) {
            tr.write_bootstrap()?;
        }
        for path in &self.units {
            tr.translate_unit(Parser::from_path(path)?)?;
        }
        let bytes = tr.finish()?;
        std::fs::write(&self.output, bytes).map_err(|e| TranslateError::io(&self.output, e))?;
        info!(output = %self.output.display(), units = self.units.len(), "translation written");
        Ok(self.output.clone())
    }
}

/// Translate `(unit name, source)` pairs to assembly text.
pub fn translate_sources(
    units: &[(&str, &str)],
    bootstrap: bool,
    cfg: &TranslatorConfig,
) -> Result<String, TranslateError> {
    let mut tr = Translator::new(Vec::new(), cfg.clone());
    if bootstrap {
        tr.write_bootstrap()?;
    }
    for (unit, source) in units {
        tr.translate_source(unit, source)?;
    }
    let bytes = tr.finish()?;
    // the emitter only writes UTF-8 text
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
