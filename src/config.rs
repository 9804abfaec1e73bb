use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TranslateError;

/// When to emit the bootstrap prologue (`SP = 256; call Sys.init 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bootstrap {
    /// Only for directory (multi-unit) translation
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub bootstrap: Bootstrap,
    /// Function invoked by the bootstrap
    pub entry: String,
    /// Initial stack pointer written by the bootstrap
    pub stack_base: u16,
    /// Emit a `// <command>` line before each translated block
    pub annotate: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            bootstrap: Bootstrap::Auto,
            entry: "Sys.init".to_string(),
            stack_base: 256,
            annotate: true,
        }
    }
}

impl TranslatorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, TranslateError> {
        let text = std::fs::read_to_string(path).map_err(|e| TranslateError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, TranslateError> {
        serde_json::from_str(text).map_err(|e| TranslateError::Config(e.to_string()))
    }

    pub fn wants_bootstrap(&self, multi_unit: bool) -> bool {
        match self.bootstrap {
            Bootstrap::Auto => multi_unit,
            Bootstrap::Always => true,
            Bootstrap::Never => false,
        }
    }
}
