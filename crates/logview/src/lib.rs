//! Parsing engine for pattern-described text logs.
//!
//! Converts raw log lines into typed, queryable records: a layout
//! pattern maps line fragments to semantic fields, an assembler joins
//! continuation lines onto their record, timestamps resolve against
//! configurable formats and severity tokens classify against a
//! memoizing vocabulary.
//!
//! # Architecture
//!
//! - `fragment.rs`: fragment kinds and the apply error taxonomy
//! - `record.rs`: record builder and the finalized record
//! - `severity.rs`: severity enum and the classifying cache
//! - `timestamp.rs`: date format translation and resolution
//! - `matcher.rs`: the line classification interface
//! - `pattern.rs`: layout templates compiled to line matchers
//! - `assemble.rs`: streaming lines-to-records assembly
//! - `detect.rs`: scoring layout candidates against a sample
//! - `columns.rs`: column schema for the presentation layer
//! - `config.rs`: per-session configuration loading
//! - `metrics.rs`: parse session counters

pub mod assemble;
pub mod columns;
pub mod config;
pub mod detect;
pub mod fragment;
pub mod matcher;
pub mod metrics;
pub mod pattern;
pub mod record;
pub mod severity;
pub mod timestamp;

// Re-export commonly used types
pub use assemble::RecordAssembler;
pub use columns::{available_columns, ColumnDescription, ColumnKind};
pub use config::{ConfigError, SessionConfig};
pub use detect::{select_pattern, PatternChoice};
pub use fragment::{ApplyError, Fragment, FragmentKind};
pub use matcher::{LineMatch, LineMatcher};
pub use metrics::{MetricsSnapshot, ParseMetrics};
pub use pattern::{LinePattern, PatternError};
pub use record::{LogRecord, RecordBuilder};
pub use severity::{Severity, SeverityClassifier};
pub use timestamp::{FormatError, TimestampResolver, TIMESTAMP_UNSET};

// Constants
pub const MAX_FRAGMENT_BYTES: usize = 1_048_576; // 1MB
