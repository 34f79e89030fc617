use std::fmt::{Display, Formatter, Result as FormatResult};

/// Severity levels of the server's java.util.logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Finest,
    Finer,
    Fine,
    Config,
    Info,
    Warning,
    Severe,
}

impl LogLevel {
    /// Parse a level token, accepting the log4j/slf4j spellings servers also print.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "SEVERE" | "ERROR" | "FATAL" => Some(LogLevel::Severe),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "INFO" => Some(LogLevel::Info),
            "CONFIG" => Some(LogLevel::Config),
            "FINE" | "DEBUG" => Some(LogLevel::Fine),
            "FINER" => Some(LogLevel::Finer),
            "FINEST" | "TRACE" => Some(LogLevel::Finest),
            _ => None,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(match self {
            LogLevel::Finest => "FINEST",
            LogLevel::Finer => "FINER",
            LogLevel::Fine => "FINE",
            LogLevel::Config => "CONFIG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Severe => "SEVERE",
        })
    }
}

/// One printable unit produced by a log filter.
///
/// Bracketed `[#|...|#]` records fill in the header fields; plain text and
/// stream output only carry a message. `message` keeps its trailing newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub version: Option<String>,
    pub logger: Option<String>,
    pub thread_info: Option<String>,
    pub message: String,
    /// Set on every chunk after the first of a record whose message spans lines.
    pub multiline: bool,
}

impl LogRecord {
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        self.level.is_none()
    }

    /// Text as shown in the log view: `"<level>: <message>"` for the first chunk
    /// of a record, the bare message otherwise.
    pub fn render(&self) -> String {
        match (&self.level, self.multiline) {
            (Some(level), false) => format!("{level}: {}", self.message),
            _ => self.message.clone(),
        }
    }
}
