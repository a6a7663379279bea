//! Layout patterns: `<Date> <Time> [<Type>] <Message>` style templates
//! compiled into anchored regexes.
//!
//! Placeholders capture lazily, literals match byte-for-byte, and any
//! line the compiled regex rejects is a continuation of the previous
//! record. Placeholder names are matched case-insensitively; a name
//! that is not one of the built-in fields captures into a custom field
//! under that name. `<_>` and `<>` match without capturing.

use regex::Regex;
use thiserror::Error;

use crate::fragment::{Fragment, FragmentKind};
use crate::matcher::{LineMatch, LineMatcher};

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Pattern captures nothing: {0:?}")]
    NoCaptures(String),
    #[error("Placeholder opened at byte {0} is never closed")]
    UnclosedPlaceholder(usize),
    #[error("Pattern regex failed to compile: {0}")]
    Regex(#[from] regex::Error),
}

/// What one capturing placeholder feeds.
#[derive(Debug, Clone)]
enum Slot {
    Field(FragmentKind),
    Custom(String),
}

impl Slot {
    /// `None` means the placeholder matches without capturing.
    fn for_name(name: &str) -> Option<Slot> {
        if name.is_empty() || name == "_" {
            return None;
        }
        let slot = match name.to_ascii_lowercase().as_str() {
            "date" => Slot::Field(FragmentKind::Date),
            "time" => Slot::Field(FragmentKind::Time),
            "thread" => Slot::Field(FragmentKind::Thread),
            "type" => Slot::Field(FragmentKind::Type),
            "class" => Slot::Field(FragmentKind::Class),
            "message" => Slot::Field(FragmentKind::Message),
            _ => Slot::Custom(name.to_string()),
        };
        Some(slot)
    }
}

/// A compiled layout pattern. Capture groups line up with `slots` by
/// position.
#[derive(Debug, Clone)]
pub struct LinePattern {
    source: String,
    regex: Regex,
    slots: Vec<Slot>,
}

impl LinePattern {
    /// Compile a layout template into a whole-line matcher.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if pattern.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        let mut body = String::from("^");
        let mut slots = Vec::new();
        let mut rest = pattern;
        let mut offset = 0;

        while let Some(lt) = rest.find('<') {
            body.push_str(&regex::escape(&rest[..lt]));
            let after = &rest[lt + 1..];
            let gt = match after.find('>') {
                Some(gt) => gt,
                None => return Err(PatternError::UnclosedPlaceholder(offset + lt)),
            };
            match Slot::for_name(&after[..gt]) {
                Some(slot) => {
                    slots.push(slot);
                    body.push_str("(.*?)");
                }
                None => body.push_str("(?:.*?)"),
            }
            offset += lt + 1 + gt + 1;
            rest = &after[gt + 1..];
        }
        body.push_str(&regex::escape(rest));
        body.push('$');

        if slots.is_empty() {
            return Err(PatternError::NoCaptures(pattern.to_string()));
        }

        let regex = Regex::new(&body)?;
        tracing::debug!(pattern = %pattern, regex = %body, slots = slots.len(), "compiled line pattern");

        Ok(Self {
            source: pattern.to_string(),
            regex,
            slots,
        })
    }

    /// The template this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl LineMatcher for LinePattern {
    fn match_line(&self, line: &str) -> LineMatch {
        let caps = match self.regex.captures(line) {
            Some(caps) => caps,
            None => return LineMatch::Continuation,
        };

        let mut fragments = Vec::with_capacity(self.slots.len());
        for (i, slot) in self.slots.iter().enumerate() {
            let text = caps
                .get(i + 1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            match slot {
                Slot::Field(kind) => fragments.push(Fragment::field(*kind, text)),
                Slot::Custom(key) => fragments.push(Fragment::custom(key.clone(), text)),
            }
        }
        LineMatch::Start(fragments)
    }
}
