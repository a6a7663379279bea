//! The record model: a builder that accumulates fragments while a record
//! is parsed, and the finalized record handed to the grid, search and
//! export.
//!
//! Parse-time fields freeze at finalization. The search-result slot and
//! the bookmark stay writable afterwards: they belong to viewer state,
//! not parse state. Severity resolves lazily, on first access, through
//! the session's shared classifier.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::fragment::{ApplyError, FragmentKind};
use crate::severity::{Severity, SeverityClassifier};
use crate::timestamp::TimestampResolver;
use crate::MAX_FRAGMENT_BYTES;

/// A fully parsed log record.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    date_text: String,
    date: NaiveDateTime,
    thread: Option<String>,
    type_text: Option<String>,
    class_name: Option<String>,
    message: String,
    custom_fields: HashMap<String, String>,
    line_in_file: usize,
    item_number: usize,
    found_on_line: Option<usize>,
    /// 0 = not bookmarked, 1..=9 = slot
    bookmark: u8,
    #[serde(skip)]
    severity: OnceLock<Severity>,
}

impl LogRecord {
    /// Raw date/time text exactly as accumulated from the line.
    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    /// Resolved timestamp; [`crate::timestamp::TIMESTAMP_UNSET`] when the
    /// date text never parsed or no date fragment was captured.
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn thread(&self) -> Option<&str> {
        self.thread.as_deref()
    }

    /// Raw severity token text (e.g. `"WARN"`), before classification.
    pub fn type_text(&self) -> Option<&str> {
        self.type_text.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn custom_fields(&self) -> &HashMap<String, String> {
        &self.custom_fields
    }

    pub fn custom_field(&self, key: &str) -> Option<&str> {
        self.custom_fields.get(key).map(String::as_str)
    }

    /// Physical line (1-based) where this record started.
    pub fn line_in_file(&self) -> usize {
        self.line_in_file
    }

    /// 1-based sequence number of this record within the session.
    pub fn item_number(&self) -> usize {
        self.item_number
    }

    /// Line offset stored by the last search hit, if any.
    pub fn found_on_line(&self) -> Option<usize> {
        self.found_on_line
    }

    pub fn set_found_on_line(&mut self, line: Option<usize>) {
        self.found_on_line = line;
    }

    /// Bookmark slot; 0 means not bookmarked.
    pub fn bookmark(&self) -> u8 {
        self.bookmark
    }

    /// Assign a bookmark slot. 0 clears; values above 9 clamp to 9.
    pub fn set_bookmark(&mut self, slot: u8) {
        self.bookmark = slot.min(9);
    }

    /// Resolve this record's severity through the session classifier.
    ///
    /// The first call classifies the severity token and memoizes the
    /// result on the record; later calls return the memoized value
    /// without consulting the classifier. Safe to race: the first
    /// resolution wins.
    pub fn severity(&self, classifier: &SeverityClassifier) -> Severity {
        *self
            .severity
            .get_or_init(|| classifier.classify(self.type_text.as_deref().unwrap_or("")))
    }

    /// Peek at the memoized severity without resolving. `None` means
    /// severity has not been computed for this record yet.
    pub fn severity_cached(&self) -> Option<Severity> {
        self.severity.get().copied()
    }
}

/// Accumulates fragments for one record while its lines are parsed.
///
/// Field rules, independent of layout order:
/// - `Date` replaces the date text; `Time` appends a space plus the
///   fragment, even when no date was captured yet.
/// - `Thread`, `Type` and `Class` replace; the last fragment wins.
/// - `Message` appends verbatim with no separator; callers put newlines
///   in the fragment text when they want them.
#[derive(Debug)]
pub struct RecordBuilder {
    date_text: String,
    thread: Option<String>,
    type_text: Option<String>,
    class_name: Option<String>,
    message: String,
    custom_fields: HashMap<String, String>,
    line_in_file: usize,
    item_number: usize,
}

impl RecordBuilder {
    /// Open a record at its first physical line, with its 1-based
    /// sequence number.
    pub fn new(line_in_file: usize, item_number: usize) -> Self {
        Self {
            date_text: String::new(),
            thread: None,
            type_text: None,
            class_name: None,
            message: String::new(),
            custom_fields: HashMap::new(),
            line_in_file,
            item_number,
        }
    }

    /// Store one captured fragment on its record field.
    ///
    /// `FragmentTooLarge` leaves the field exactly as it was, so the
    /// caller can skip the fragment and keep parsing. `ContractViolation`
    /// means the kind has no record field and the parse must stop.
    pub fn apply_fragment(&mut self, kind: FragmentKind, text: &str) -> Result<(), ApplyError> {
        if !kind.is_record_field() {
            return Err(ApplyError::ContractViolation(kind));
        }
        if text.len() > MAX_FRAGMENT_BYTES {
            return Err(ApplyError::FragmentTooLarge(text.len(), MAX_FRAGMENT_BYTES));
        }

        match kind {
            FragmentKind::Date => self.date_text = text.to_string(),
            FragmentKind::Time => {
                // Exactly one space between date and time, even when no
                // date fragment came first
                self.date_text.push(' ');
                self.date_text.push_str(text);
            }
            FragmentKind::Thread => self.thread = Some(text.to_string()),
            FragmentKind::Type => self.type_text = Some(text.to_string()),
            FragmentKind::Class => self.class_name = Some(text.to_string()),
            FragmentKind::Message => self.message.push_str(text),
            // Rejected by the guard above
            FragmentKind::Custom => {}
        }
        Ok(())
    }

    /// Upsert a custom field. Inserting a new key and overwriting an
    /// existing one are both fine; this cannot fail.
    pub fn apply_custom_field(&mut self, key: String, value: String) {
        self.custom_fields.insert(key, value);
    }

    /// Finalize: resolve the timestamp once and freeze the record.
    ///
    /// The flag reports whether the accumulated date text parsed; the
    /// record itself stores the sentinel either way, so callers needing
    /// the distinction must use the flag.
    pub fn finish(self, resolver: &TimestampResolver) -> (LogRecord, bool) {
        let (date, date_ok) = resolver.resolve(&self.date_text);
        let record = LogRecord {
            date_text: self.date_text,
            date,
            thread: self.thread,
            type_text: self.type_text,
            class_name: self.class_name,
            message: self.message,
            custom_fields: self.custom_fields,
            line_in_file: self.line_in_file,
            item_number: self.item_number,
            found_on_line: None,
            bookmark: 0,
            severity: OnceLock::new(),
        };
        (record, date_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::TIMESTAMP_UNSET;
    use chrono::NaiveDate;

    fn builder() -> RecordBuilder {
        RecordBuilder::new(1, 1)
    }

    fn resolver() -> TimestampResolver {
        TimestampResolver::new("yyyy-MM-dd HH:mm:ss", &[]).unwrap()
    }

    // ─── Date and time accumulation ─────────────────────────────

    #[test]
    fn test_date_then_time_joined_by_one_space() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Date, "2024-01-15").unwrap();
        b.apply_fragment(FragmentKind::Time, "10:30:00").unwrap();

        let (record, ok) = b.finish(&resolver());
        assert_eq!(record.date_text(), "2024-01-15 10:30:00");
        assert!(ok);
        assert_eq!(
            record.date(),
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_repeated_date_replaces() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Date, "garbage").unwrap();
        b.apply_fragment(FragmentKind::Date, "2024-01-15").unwrap();

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.date_text(), "2024-01-15");
    }

    #[test]
    fn test_time_without_date_keeps_leading_space() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Time, "10:30:00").unwrap();

        let (record, ok) = b.finish(&resolver());
        assert_eq!(record.date_text(), " 10:30:00");
        assert!(!ok);
        assert_eq!(record.date(), TIMESTAMP_UNSET);
    }

    #[test]
    fn test_multiple_time_fragments_each_append() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Date, "2024-01-15").unwrap();
        b.apply_fragment(FragmentKind::Time, "10:30:00").unwrap();
        b.apply_fragment(FragmentKind::Time, "999").unwrap();

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.date_text(), "2024-01-15 10:30:00 999");
    }

    // ─── Replacing fields ───────────────────────────────────────

    #[test]
    fn test_thread_type_class_last_fragment_wins() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Thread, "worker-1").unwrap();
        b.apply_fragment(FragmentKind::Thread, "worker-2").unwrap();
        b.apply_fragment(FragmentKind::Type, "INFO").unwrap();
        b.apply_fragment(FragmentKind::Type, "WARN").unwrap();
        b.apply_fragment(FragmentKind::Class, "App.First").unwrap();
        b.apply_fragment(FragmentKind::Class, "App.Second").unwrap();

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.thread(), Some("worker-2"));
        assert_eq!(record.type_text(), Some("WARN"));
        assert_eq!(record.class_name(), Some("App.Second"));
    }

    #[test]
    fn test_unset_optional_fields_are_none() {
        let (record, _) = builder().finish(&resolver());
        assert_eq!(record.thread(), None);
        assert_eq!(record.type_text(), None);
        assert_eq!(record.class_name(), None);
    }

    // ─── Message accumulation ───────────────────────────────────

    #[test]
    fn test_message_appends_without_separator() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Message, "line1").unwrap();
        b.apply_fragment(FragmentKind::Message, "\nline2").unwrap();

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.message(), "line1\nline2");
    }

    #[test]
    fn test_message_fragments_concatenate_verbatim() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Message, "abc").unwrap();
        b.apply_fragment(FragmentKind::Message, "def").unwrap();

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.message(), "abcdef");
    }

    // ─── Custom fields ──────────────────────────────────────────

    #[test]
    fn test_custom_field_upsert() {
        let mut b = builder();
        b.apply_custom_field("user".to_string(), "alice".to_string());
        b.apply_custom_field("user".to_string(), "bob".to_string());
        b.apply_custom_field("request".to_string(), "abc-123".to_string());

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.custom_fields().len(), 2);
        assert_eq!(record.custom_field("user"), Some("bob"));
        assert_eq!(record.custom_field("request"), Some("abc-123"));
        assert_eq!(record.custom_field("missing"), None);
    }

    // ─── Contract violations and conversion failures ────────────

    #[test]
    fn test_custom_kind_is_a_contract_violation() {
        let mut b = builder();
        let err = b.apply_fragment(FragmentKind::Custom, "x").unwrap_err();
        assert!(matches!(
            err,
            ApplyError::ContractViolation(FragmentKind::Custom)
        ));
    }

    #[test]
    fn test_oversized_fragment_leaves_field_untouched() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Thread, "worker-1").unwrap();

        let huge = "x".repeat(MAX_FRAGMENT_BYTES + 1);
        let err = b.apply_fragment(FragmentKind::Thread, &huge).unwrap_err();
        assert!(matches!(err, ApplyError::FragmentTooLarge(_, _)));

        let (record, _) = b.finish(&resolver());
        assert_eq!(record.thread(), Some("worker-1"));
    }

    #[test]
    fn test_fragment_at_limit_is_accepted() {
        let mut b = builder();
        let exact = "x".repeat(MAX_FRAGMENT_BYTES);
        assert!(b.apply_fragment(FragmentKind::Message, &exact).is_ok());
    }

    // ─── Finalization ───────────────────────────────────────────

    #[test]
    fn test_unparseable_date_text_reports_false_but_keeps_text() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Date, "not a date").unwrap();

        let (record, ok) = b.finish(&resolver());
        assert!(!ok);
        assert_eq!(record.date(), TIMESTAMP_UNSET);
        assert_eq!(record.date_text(), "not a date");
    }

    #[test]
    fn test_no_date_fragments_resolve_false() {
        let (record, ok) = builder().finish(&resolver());
        assert!(!ok);
        assert_eq!(record.date(), TIMESTAMP_UNSET);
        assert_eq!(record.date_text(), "");
    }

    #[test]
    fn test_line_and_item_numbers_stamped_at_creation() {
        let b = RecordBuilder::new(42, 7);
        let (record, _) = b.finish(&resolver());
        assert_eq!(record.line_in_file(), 42);
        assert_eq!(record.item_number(), 7);
    }

    // ─── Severity resolution ────────────────────────────────────

    #[test]
    fn test_severity_resolves_lazily_and_memoizes() {
        let classifier = SeverityClassifier::new();
        let mut b = builder();
        b.apply_fragment(FragmentKind::Type, "WARN").unwrap();
        let (record, _) = b.finish(&resolver());

        assert_eq!(record.severity_cached(), None);
        assert_eq!(record.severity(&classifier), Severity::Warn);
        assert_eq!(record.severity_cached(), Some(Severity::Warn));
        assert_eq!(record.severity(&classifier), Severity::Warn);
    }

    #[test]
    fn test_unknown_token_lands_in_shared_cache_once() {
        let classifier = SeverityClassifier::new();
        let seeded = classifier.len();

        for _ in 0..2 {
            let mut b = builder();
            b.apply_fragment(FragmentKind::Type, "NOTICE").unwrap();
            let (record, _) = b.finish(&resolver());
            assert_eq!(record.severity(&classifier), Severity::Unknown);
        }

        assert_eq!(classifier.len(), seeded + 1);
    }

    #[test]
    fn test_severity_without_type_text() {
        let classifier = SeverityClassifier::new();
        let seeded = classifier.len();

        let (record, _) = builder().finish(&resolver());
        assert_eq!(record.severity(&classifier), Severity::Unknown);
        // Absent token must not populate the cache under an empty key
        assert_eq!(classifier.len(), seeded);
    }

    // ─── Viewer state slots ─────────────────────────────────────

    #[test]
    fn test_bookmark_slots() {
        let (mut record, _) = builder().finish(&resolver());
        assert_eq!(record.bookmark(), 0);

        record.set_bookmark(5);
        assert_eq!(record.bookmark(), 5);

        record.set_bookmark(12);
        assert_eq!(record.bookmark(), 9);

        record.set_bookmark(0);
        assert_eq!(record.bookmark(), 0);
    }

    #[test]
    fn test_found_on_line_defaults_unset() {
        let (mut record, _) = builder().finish(&resolver());
        assert_eq!(record.found_on_line(), None);

        record.set_found_on_line(Some(3));
        assert_eq!(record.found_on_line(), Some(3));

        record.set_found_on_line(None);
        assert_eq!(record.found_on_line(), None);
    }

    // ─── Export shape ───────────────────────────────────────────

    #[test]
    fn test_record_serializes_for_export() {
        let mut b = builder();
        b.apply_fragment(FragmentKind::Date, "2024-01-15").unwrap();
        b.apply_fragment(FragmentKind::Time, "10:30:00").unwrap();
        b.apply_fragment(FragmentKind::Type, "INFO").unwrap();
        b.apply_fragment(FragmentKind::Message, "started").unwrap();
        b.apply_custom_field("request".to_string(), "abc-123".to_string());
        let (record, _) = b.finish(&resolver());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date_text"], "2024-01-15 10:30:00");
        assert_eq!(json["type_text"], "INFO");
        assert_eq!(json["message"], "started");
        assert_eq!(json["line_in_file"], 1);
        assert_eq!(json["custom_fields"]["request"], "abc-123");
        // The memoized severity cell is session state, not export data
        assert!(json.get("severity").is_none());
    }
}
