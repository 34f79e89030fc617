use crate::log_view::ansi::{AnsiColor, strip_ansi};
use crate::log_view::recognizer::{LineAction, Recognizer};

use models::{LogLevel, LogRecord};

use std::sync::Arc;

/// One line ready for display.
#[derive(Debug, Clone)]
pub struct RenderedLine {
    pub text: String,
    pub level: Option<LogLevel>,
    pub color: Option<AnsiColor>,
    pub action: Option<Arc<dyn LineAction>>,
}

/// Receives rendered lines of an instance's log readers.
pub trait LogSink: Send + Sync {
    fn line(&self, instance: &str, line: RenderedLine);

    /// A reader reached the end of its source.
    fn closed(&self, _instance: &str) {}
}

/// Leading `LEVEL:` token of a line.
pub fn level_prefix(text: &str) -> Option<LogLevel> {
    let (token, _) = text.split_once(':')?;
    if token.is_empty() || token.len() > 16 || !token.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    LogLevel::parse(token)
}

/// Turns parsed records into [`RenderedLine`]s.
#[derive(Clone)]
pub struct LinePipeline {
    recognizers: Vec<Arc<dyn Recognizer>>,
    max_recognized_len: usize,
}

impl LinePipeline {
    pub fn new(recognizers: Vec<Arc<dyn Recognizer>>, max_recognized_len: usize) -> Self {
        Self {
            recognizers,
            max_recognized_len,
        }
    }

    pub fn render(&self, record: &LogRecord) -> RenderedLine {
        let (text, color) = strip_ansi(&record.render());

        let level = record
            .level
            .as_deref()
            .and_then(LogLevel::parse)
            .or_else(|| level_prefix(&text));

        let action = if text.chars().count() > self.max_recognized_len {
            None
        } else {
            let line = text.trim_end_matches('\n');
            self.recognizers
                .iter()
                .find_map(|recognizer| recognizer.recognize(line))
        };

        RenderedLine {
            text,
            level,
            color,
            action,
        }
    }
}

/// Sink that forwards every line to the `log` facade under the `server` target.
#[derive(Debug, Default, Clone)]
pub struct ForwardingSink;

impl LogSink for ForwardingSink {
    fn line(&self, instance: &str, line: RenderedLine) {
        log::info!(target: "server", "[{instance}] {}", line.text.trim_end());
    }
}
