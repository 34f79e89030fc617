use crate::log_view::LogFilter;

use models::LogRecord;

use std::sync::OnceLock;

use regex::Regex;

/// Either a `LEVEL:` token or a timestamp-bearing header line
/// (`Oct 19, 2026 10:00:00 AM com.example.Foo bar`).
const LINE_START_PATTERN: &str = r"^(?:([\p{Lu}]{0,16}?):|([^\r\n]{0,24}?\d\d?:\d\d?:\d\d?))";
const HEADER_GROUP: usize = 2;

static LINE_START_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_line_start_regex() -> &'static Regex {
    LINE_START_REGEX.get_or_init(|| Regex::new(LINE_START_PATTERN).expect("valid regex pattern"))
}

/// Whether `line` is a timestamp header the log view hides.
pub fn is_header_line(line: &str) -> bool {
    get_line_start_regex()
        .captures(line)
        .is_some_and(|captures| captures.get(HEADER_GROUP).is_some())
}

/// Line-oriented filter for plain server output.
///
/// Buffers until a newline and drops the timestamp header lines that the
/// server prints before each `LEVEL: message` line.
#[derive(Debug, Default)]
pub struct LineStreamFilter {
    line: String,
}

impl LineStreamFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_line(&mut self) -> Option<LogRecord> {
        let mut line = std::mem::take(&mut self.line);
        if line.is_empty() || is_header_line(&line) {
            return None;
        }
        line.push('\n');
        Some(LogRecord::plain(line))
    }
}

impl LogFilter for LineStreamFilter {
    fn process(&mut self, c: char) -> Option<LogRecord> {
        match c {
            '\r' => None,
            '\n' => self.take_line(),
            _ => {
                self.line.push(c);
                None
            }
        }
    }

    fn flush(&mut self) -> Option<LogRecord> {
        self.take_line()
    }
}
