use loghours_error::{ErrorKind, LogError, Result};

/// Fields parsed from a `/loghours` command.
///
/// Values are kept as raw (trimmed) strings. Hours in particular are written
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    pub name: String,
    pub month: String,
    pub description: String,
    pub hours: String,
}

impl LogRequest {
    /// Parse `name;month;description;hours`.
    ///
    /// Anything other than exactly four semicolon separated parts is a
    /// validation error.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(';').map(str::trim).collect();
        match parts.as_slice() {
            [name, month, description, hours] => Ok(LogRequest {
                name: name.to_string(),
                month: month.to_string(),
                description: description.to_string(),
                hours: hours.to_string(),
            }),
            _ => Err(LogError::new("Expected <name>;<month>;<description>;<hours>")
                .with_field("parts", parts.len())
                .with_kind(ErrorKind::Validation)),
        }
    }
}
