use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = LogError> = std::result::Result<T, E>;

/// Broad category of an error.
///
/// Each kind maps to a distinct message sent back to whoever issued the
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Command text could not be split into its fields.
    Validation,
    /// Month wasn't one of the twelve full month names.
    UnrecognizedMonth,
    /// No matching block, or no open row within the block.
    NotFound,
    /// Authentication or spreadsheet provider failure.
    Provider,
    /// Anything else.
    Unclassified,
}

pub struct LogError {
    inner: Box<LogErrorInner>,
}

struct LogErrorInner {
    kind: ErrorKind,
    msg: String,
    source: Option<Box<dyn Error + Send + Sync>>,
    fields: Vec<(Cow<'static, str>, String)>,
}

impl LogError {
    pub fn new(msg: impl Into<String>) -> Self {
        LogError {
            inner: Box::new(LogErrorInner {
                kind: ErrorKind::Unclassified,
                msg: msg.into(),
                source: None,
                fields: Vec::new(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.inner.kind = kind;
        self
    }

    /// Attach an extra key/value pair for display.
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: fmt::Display,
    {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn get_msg(&self) -> &str {
        &self.inner.msg
    }

    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.inner
            .fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        if !self.inner.fields.is_empty() {
            write!(f, " (")?;
            for (idx, (key, value)) in self.inner.fields.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            write!(f, ")")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogError")
            .field("kind", &self.inner.kind)
            .field("msg", &self.inner.msg)
            .field("fields", &self.inner.fields)
            .field("source", &self.inner.source)
            .finish()
    }
}

impl Error for LogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::with_source("IO error", Box::new(err))
    }
}

impl From<fmt::Error> for LogError {
    fn from(err: fmt::Error) -> Self {
        LogError::with_source("Format error", Box::new(err))
    }
}

/// Wrap foreign errors with a message.
pub trait ResultExt<T> {
    fn context(self, msg: &'static str) -> Result<T>;

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| LogError::with_source(msg, Box::new(e)))
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LogError::with_source(f(), Box::new(e)))
    }
}

/// Re-categorize errors that haven't been given a specific kind yet.
pub trait KindExt<T> {
    fn or_kind(self, kind: ErrorKind) -> Result<T>;
}

impl<T> KindExt<T> for Result<T> {
    fn or_kind(self, kind: ErrorKind) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == ErrorKind::Unclassified {
                e.with_kind(kind)
            } else {
                e
            }
        })
    }
}
