//! Per-session parsing configuration: the line layout plus the date
//! formats, loadable from a TOML file.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assemble::RecordAssembler;
use crate::pattern::{LinePattern, PatternError};
use crate::severity::SeverityClassifier;
use crate::timestamp::{FormatError, TimestampResolver};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid line pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("Invalid date format: {0}")]
    DateFormat(#[from] FormatError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Line layout template, e.g. `<Date> <Time> [<Type>] <Message>`.
    pub pattern: String,
    /// Primary date format, in `yyyy-MM-dd HH:mm:ss` token syntax.
    pub date_format: String,
    /// Tried in order when the primary format rejects the date text.
    pub fallback_date_formats: Vec<String>,
}

impl SessionConfig {
    /// Load session configuration from a TOML file. Missing keys fall
    /// back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: SessionConfig = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), pattern = %config.pattern, "loaded session config");
        Ok(config)
    }

    /// Compile the pattern and date formats into a ready assembler.
    ///
    /// This is also where a config is validated: anything that builds
    /// can parse.
    pub fn build(&self) -> Result<RecordAssembler, ConfigError> {
        let pattern = LinePattern::compile(&self.pattern)?;
        let resolver = TimestampResolver::new(&self.date_format, &self.fallback_date_formats)?;
        Ok(RecordAssembler::new(
            Box::new(pattern),
            resolver,
            Arc::new(SeverityClassifier::new()),
        ))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pattern: "<Date> <Time> <Type> <Message>".to_string(),
            date_format: "yyyy-MM-dd HH:mm:ss".to_string(),
            fallback_date_formats: vec![
                "yyyy-MM-dd HH:mm:ss,fff".to_string(),
                "yyyy-MM-dd HH:mm:ss.fff".to_string(),
            ],
        }
    }
}
