//! Timestamp resolution for accumulated date/time text.
//!
//! Date formats are written in the viewer's token language (`yyyy`, `MM`,
//! `dd`, `HH`, `mm`, `ss`, `fff`, ...) and translated to strftime once,
//! when the session is built. Parsing is strict: the whole input must
//! match the whole format, independent of locale.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Sentinel for "no timestamp": the minimum representable value.
///
/// A record whose date text never parsed carries this value; callers must
/// branch on the resolve flag, not on comparisons against the sentinel.
pub const TIMESTAMP_UNSET: NaiveDateTime = NaiveDateTime::MIN;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Empty date format")]
    Empty,

    #[error("Unsupported token '{token}' in date format '{format}'")]
    UnsupportedToken { token: String, format: String },

    #[error("Unterminated quoted literal in date format '{format}'")]
    UnterminatedLiteral { format: String },
}

#[derive(Debug, Clone)]
struct CompiledFormat {
    strftime: String,
    /// Formats without time tokens parse as bare dates (midnight assumed)
    has_time: bool,
}

impl CompiledFormat {
    /// Translate one viewer-style format into a strftime string.
    ///
    /// Token runs map per [`map_token`]; single-quoted runs are literal
    /// text; everything else passes through unchanged (with `%` doubled
    /// so strftime keeps it literal).
    fn compile(format: &str) -> Result<Self, FormatError> {
        if format.is_empty() {
            return Err(FormatError::Empty);
        }

        let chars: Vec<char> = format.chars().collect();
        let mut strftime = String::with_capacity(format.len() + 8);
        let mut has_time = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                'a'..='z' | 'A'..='Z' => {
                    let mut run = 1;
                    while i + run < chars.len() && chars[i + run] == c {
                        run += 1;
                    }
                    let token: String = chars[i..i + run].iter().collect();
                    let mapped =
                        map_token(&token).ok_or_else(|| FormatError::UnsupportedToken {
                            token: token.clone(),
                            format: format.to_string(),
                        })?;
                    strftime.push_str(mapped);
                    if matches!(c, 'H' | 'h' | 'm' | 's' | 'f' | 't') {
                        has_time = true;
                    }
                    i += run;
                }
                '\'' => {
                    // Quoted literal, copied verbatim up to the closing quote
                    let mut j = i + 1;
                    while j < chars.len() && chars[j] != '\'' {
                        push_literal(&mut strftime, chars[j]);
                        j += 1;
                    }
                    if j == chars.len() {
                        return Err(FormatError::UnterminatedLiteral {
                            format: format.to_string(),
                        });
                    }
                    i = j + 1;
                }
                other => {
                    push_literal(&mut strftime, other);
                    i += 1;
                }
            }
        }

        Ok(Self { strftime, has_time })
    }
}

fn push_literal(strftime: &mut String, c: char) {
    // '%' opens a specifier in strftime; double it to keep it literal
    if c == '%' {
        strftime.push_str("%%");
    } else {
        strftime.push(c);
    }
}

fn map_token(token: &str) -> Option<&'static str> {
    Some(match token {
        "yyyy" => "%Y",
        "yy" => "%y",
        "MMMM" => "%B",
        "MMM" => "%b",
        "MM" => "%m",
        "M" => "%-m",
        "dddd" => "%A",
        "ddd" => "%a",
        "dd" => "%d",
        "d" => "%-d",
        "HH" => "%H",
        "H" => "%-H",
        "hh" => "%I",
        "h" => "%-I",
        "mm" => "%M",
        "m" => "%-M",
        "ss" => "%S",
        "s" => "%-S",
        "fff" => "%3f",
        "ffffff" => "%6f",
        "tt" => "%p",
        "zzz" => "%:z",
        _ => return None,
    })
}

/// Parses accumulated date text against a primary format plus ordered
/// fallbacks. The first strict match wins.
#[derive(Debug, Clone)]
pub struct TimestampResolver {
    formats: Vec<CompiledFormat>,
}

impl TimestampResolver {
    /// Compile the primary format and the fallbacks, in trial order.
    /// Fails fast on a format the token language cannot express, so bad
    /// configuration surfaces at session build time rather than mid-file.
    pub fn new(primary: &str, fallbacks: &[String]) -> Result<Self, FormatError> {
        let mut formats = Vec::with_capacity(1 + fallbacks.len());
        formats.push(CompiledFormat::compile(primary)?);
        for fallback in fallbacks {
            formats.push(CompiledFormat::compile(fallback)?);
        }
        Ok(Self { formats })
    }

    /// Resolve date text to a timestamp.
    ///
    /// Returns the sentinel and `false` when nothing matches, including
    /// empty input. The flag is the source of truth for success.
    pub fn resolve(&self, date_text: &str) -> (NaiveDateTime, bool) {
        if date_text.is_empty() {
            return (TIMESTAMP_UNSET, false);
        }

        for format in &self.formats {
            if format.has_time {
                if let Ok(parsed) = NaiveDateTime::parse_from_str(date_text, &format.strftime) {
                    return (parsed, true);
                }
            } else if let Ok(date) = NaiveDate::parse_from_str(date_text, &format.strftime) {
                if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                    return (midnight, true);
                }
            }
        }

        tracing::trace!(date_text, "no configured date format matched");
        (TIMESTAMP_UNSET, false)
    }
}
