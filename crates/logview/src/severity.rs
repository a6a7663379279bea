use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Resolved severity of a log record.
///
/// `Unknown` means a token was seen and not recognized. A record whose
/// severity was never looked up has no value at all; that state lives on
/// the record, not in this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Trace,
    /// Token seen but not in the alias table
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Trace => "trace",
            Severity::Unknown => "unknown",
        }
    }
}

/// Severity spellings recognized out of the box (log4net, Serilog and
/// NLog conventions). Matching is exact and case-sensitive.
const SEVERITY_ALIASES: [(&str, Severity); 23] = [
    ("Verbose", Severity::Verbose),
    ("VERBOSE", Severity::Verbose),
    ("VRB", Severity::Verbose),
    ("Debug", Severity::Debug),
    ("DEBUG", Severity::Debug),
    ("DBG", Severity::Debug),
    ("Information", Severity::Info),
    ("INFORMATION", Severity::Info),
    ("INFO", Severity::Info),
    ("INF", Severity::Info),
    ("Warning", Severity::Warn),
    ("WARNING", Severity::Warn),
    ("WARN", Severity::Warn),
    ("WRN", Severity::Warn),
    ("Error", Severity::Error),
    ("ERROR", Severity::Error),
    ("ERR", Severity::Error),
    ("Fatal", Severity::Fatal),
    ("FATAL", Severity::Fatal),
    ("FTL", Severity::Fatal),
    ("Trace", Severity::Trace),
    ("TRACE", Severity::Trace),
    ("TRC", Severity::Trace),
];

/// Shared token-to-severity lookup for one parsing session.
///
/// Misses are memoized: an unrecognized token is stored as `Unknown`, so
/// every later lookup of the same token is a plain cache hit. The map is
/// shared by all records of the session and safe to hit from multiple
/// threads.
#[derive(Debug)]
pub struct SeverityClassifier {
    cache: DashMap<String, Severity>,
}

impl SeverityClassifier {
    pub fn new() -> Self {
        let cache = DashMap::new();
        for (token, severity) in SEVERITY_ALIASES {
            cache.insert(token.to_string(), severity);
        }
        Self { cache }
    }

    /// Resolve a severity token. Case-sensitive: `"WARN"` resolves,
    /// `"warn"` does not. An empty token resolves to `Unknown` without
    /// touching the cache.
    pub fn classify(&self, token: &str) -> Severity {
        if token.is_empty() {
            return Severity::Unknown;
        }
        if let Some(found) = self.cache.get(token) {
            return *found;
        }
        // Miss: remember the token as Unknown. A racing insert of the
        // same token writes the same value, so the race is benign.
        tracing::trace!(token, "severity token not recognized, caching as unknown");
        self.cache.insert(token.to_string(), Severity::Unknown);
        Severity::Unknown
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::new()
    }
}
