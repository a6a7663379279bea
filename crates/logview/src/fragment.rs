use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Date portion of the timestamp; replaces earlier date text
    Date,
    /// Time portion of the timestamp; appended to the date text
    Time,
    /// Thread name or id
    Thread,
    /// Severity token text (e.g. "WARN")
    Type,
    /// Logger/class name
    Class,
    /// Free-form message text; accumulated verbatim
    Message,
    /// User-defined field, routed to the custom-field map
    Custom,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Date => "date",
            FragmentKind::Time => "time",
            FragmentKind::Thread => "thread",
            FragmentKind::Type => "type",
            FragmentKind::Class => "class",
            FragmentKind::Message => "message",
            FragmentKind::Custom => "custom",
        }
    }

    /// True for the six kinds that land in a fixed record field.
    /// `Custom` carries its own key and goes through the custom-field map.
    pub fn is_record_field(&self) -> bool {
        !matches!(self, FragmentKind::Custom)
    }
}

/// One captured piece of a matched line, tagged with where it belongs on
/// the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    /// Custom-field key; only meaningful when `kind` is `Custom`
    pub key: Option<String>,
    pub text: String,
}

impl Fragment {
    pub fn field(kind: FragmentKind, text: String) -> Self {
        Self {
            kind,
            key: None,
            text,
        }
    }

    pub fn custom(key: String, text: String) -> Self {
        Self {
            kind: FragmentKind::Custom,
            key: Some(key),
            text,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplyError {
    /// The fragment kind has no record field. This is a programming error
    /// in whatever drives the builder, not bad input, so it aborts the
    /// parse instead of being skipped.
    #[error("Fragment kind {0:?} does not map to a record field")]
    ContractViolation(FragmentKind),

    /// Recoverable: the fragment was refused and the target field keeps
    /// its previous value.
    #[error("Fragment too large: {0} bytes (max: {1} bytes)")]
    FragmentTooLarge(usize, usize),
}
