//! Streaming record assembly: physical lines in, typed records out.
//!
//! Built for interactive viewing of real-world log files:
//! - Joins stack traces and wrapped output onto their opening line
//! - Lines before the first recognized start still become records
//! - Oversized captures are skipped without losing the record
//! - Timestamps resolve once per record, at completion
//! - Per-session counters for diagnostics via [`ParseMetrics`]
//!
//! The assembler owns the in-flight [`RecordBuilder`]; callers own the
//! completed records it emits.

use std::sync::Arc;

use crate::fragment::{ApplyError, Fragment, FragmentKind};
use crate::matcher::{LineMatch, LineMatcher};
use crate::metrics::{MetricsSnapshot, ParseMetrics};
use crate::record::{LogRecord, RecordBuilder};
use crate::severity::SeverityClassifier;
use crate::timestamp::TimestampResolver;

pub struct RecordAssembler {
    matcher: Box<dyn LineMatcher>,
    resolver: TimestampResolver,
    severities: Arc<SeverityClassifier>,
    metrics: Arc<ParseMetrics>,
    pending: Option<RecordBuilder>,
    current_line: usize,
    next_item: usize,
}

impl RecordAssembler {
    pub fn new(
        matcher: Box<dyn LineMatcher>,
        resolver: TimestampResolver,
        severities: Arc<SeverityClassifier>,
    ) -> Self {
        Self {
            matcher,
            resolver,
            severities,
            metrics: Arc::new(ParseMetrics::new()),
            pending: None,
            current_line: 0,
            next_item: 1,
        }
    }

    /// The severity classifier shared with completed records.
    pub fn classifier(&self) -> Arc<SeverityClassifier> {
        Arc::clone(&self.severities)
    }

    /// Point-in-time copy of the session counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Feed one physical line (without its terminator).
    ///
    /// Returns the previous record when this line completes it. Records
    /// emit one step behind the input: a record is only known complete
    /// when the next start line (or end of input) arrives.
    ///
    /// `Err` means a matcher handed over a fragment kind that cannot be
    /// stored; the parse cannot continue.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<LogRecord>, ApplyError> {
        self.current_line += 1;
        self.metrics.record_line_fed();

        match self.matcher.match_line(line) {
            LineMatch::Start(fragments) => {
                let completed = self.finish_pending();
                let mut builder = self.start_builder();
                self.apply_fragments(&mut builder, fragments)?;
                self.pending = Some(builder);
                Ok(completed)
            }
            LineMatch::Continuation => {
                match self.pending.as_mut() {
                    Some(builder) => {
                        self.metrics.record_continuation_line();
                        let mut text = String::with_capacity(line.len() + 1);
                        text.push('\n');
                        text.push_str(line);
                        Self::apply_or_skip(
                            &self.metrics,
                            builder,
                            FragmentKind::Message,
                            &text,
                            self.current_line,
                        )?;
                    }
                    None => {
                        // Nothing open yet (e.g. the file starts mid-record):
                        // keep the text as a message-only record
                        self.metrics.record_orphan_continuation();
                        tracing::debug!(
                            line = self.current_line,
                            "continuation without an open record, starting message-only record"
                        );
                        let mut builder = self.start_builder();
                        Self::apply_or_skip(
                            &self.metrics,
                            &mut builder,
                            FragmentKind::Message,
                            line,
                            self.current_line,
                        )?;
                        self.pending = Some(builder);
                    }
                }
                Ok(None)
            }
        }
    }

    /// Finalize the in-flight record (call at end of input).
    pub fn finish(&mut self) -> Option<LogRecord> {
        self.finish_pending()
    }

    /// Returns true if lines have been fed that no emitted record covers.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Parse a full text, one record per recognized start line.
    pub fn parse_text(&mut self, text: &str) -> Result<Vec<LogRecord>, ApplyError> {
        let mut records = Vec::new();
        for line in text.lines() {
            if let Some(record) = self.feed_line(line)? {
                records.push(record);
            }
        }
        if let Some(record) = self.finish() {
            records.push(record);
        }
        Ok(records)
    }

    fn start_builder(&mut self) -> RecordBuilder {
        let item = self.next_item;
        self.next_item += 1;
        self.metrics.record_started();
        RecordBuilder::new(self.current_line, item)
    }

    fn apply_fragments(
        &self,
        builder: &mut RecordBuilder,
        fragments: Vec<Fragment>,
    ) -> Result<(), ApplyError> {
        for fragment in fragments {
            match (fragment.kind, fragment.key) {
                (FragmentKind::Custom, Some(key)) => {
                    builder.apply_custom_field(key, fragment.text);
                    self.metrics.record_custom_field();
                }
                (kind, _) => {
                    Self::apply_or_skip(
                        &self.metrics,
                        builder,
                        kind,
                        &fragment.text,
                        self.current_line,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Store a fragment, treating oversize as skip-and-continue. Only a
    /// contract violation propagates.
    fn apply_or_skip(
        metrics: &ParseMetrics,
        builder: &mut RecordBuilder,
        kind: FragmentKind,
        text: &str,
        line: usize,
    ) -> Result<(), ApplyError> {
        match builder.apply_fragment(kind, text) {
            Ok(()) => Ok(()),
            Err(ApplyError::FragmentTooLarge(size, max)) => {
                tracing::warn!(
                    kind = kind.as_str(),
                    size,
                    max,
                    line,
                    "skipping oversized fragment"
                );
                metrics.record_oversized_fragment();
                Ok(())
            }
            Err(violation) => Err(violation),
        }
    }

    fn finish_pending(&mut self) -> Option<LogRecord> {
        let builder = self.pending.take()?;
        let (record, date_ok) = builder.finish(&self.resolver);
        if !date_ok && !record.date_text().is_empty() {
            tracing::warn!(
                line = record.line_in_file(),
                date_text = record.date_text(),
                "record date text did not resolve"
            );
            self.metrics.record_date_failure();
        }
        self.metrics.record_completed();
        Some(record)
    }
}
