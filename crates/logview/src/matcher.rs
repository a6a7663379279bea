//! The seam between line classification and record assembly.

use crate::fragment::Fragment;

/// Outcome of matching one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// The line starts a new record; fragments appear in capture order.
    Start(Vec<Fragment>),
    /// The line extends the current record's message.
    Continuation,
}

/// Classifies physical lines into record starts and continuations.
///
/// Implementations must be shareable across session threads.
pub trait LineMatcher: Send + Sync {
    fn match_line(&self, line: &str) -> LineMatch;
}
