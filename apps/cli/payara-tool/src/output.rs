//! Console rendering of task progress, statuses and server log lines.

use tooling_core::lifecycle::task::{Operation, TaskListener};
use tooling_core::log_view::ansi::AnsiColor;
use tooling_core::log_view::pipeline::{LogSink, RenderedLine};

use models::{LogLevel, ServerStatus, TaskEvent, TaskState};

use std::io::{IsTerminal, Write, stdout};

use owo_colors::{AnsiColors, OwoColorize};

fn should_color() -> bool {
    stdout().is_terminal()
}

pub fn success(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), should_color(), AnsiColors::Green)
}

pub fn warning(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), should_color(), AnsiColors::Yellow)
}

pub fn style_error(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), should_color(), AnsiColors::Red)
}

pub fn accent(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), should_color(), AnsiColors::Cyan)
}

fn paint(text: &str, color: bool, with: AnsiColors) -> String {
    if color {
        format!("{}", text.color(with))
    } else {
        text.to_string()
    }
}

pub(crate) fn ansi_to_owo(color: AnsiColor) -> AnsiColors {
    match color {
        AnsiColor::Black => AnsiColors::Black,
        AnsiColor::Red => AnsiColors::Red,
        AnsiColor::Green => AnsiColors::Green,
        AnsiColor::Yellow => AnsiColors::Yellow,
        AnsiColor::Blue => AnsiColors::Blue,
        AnsiColor::Magenta => AnsiColors::Magenta,
        AnsiColor::Cyan => AnsiColors::Cyan,
    }
}

/// Status column of `status`, padded before colouring so columns line up.
pub fn status_cell(status: ServerStatus, color: bool) -> String {
    let padded = format!("{:<8}", status.as_str());
    if !color {
        return padded;
    }
    match status {
        ServerStatus::Online => format!("{}", padded.green()),
        ServerStatus::Offline => format!("{}", padded.red()),
        ServerStatus::Startup | ServerStatus::Shutdown => format!("{}", padded.yellow()),
        ServerStatus::Unknown => format!("{}", padded.dimmed()),
    }
}

pub fn status_colored(status: ServerStatus) -> String {
    status_cell(status, should_color())
}

// ============================================
// SERVER LOG LINES
// ============================================

/// Prints server log lines on stdout, coloured by level or by the colour the
/// server itself selected.
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            color: should_color(),
        }
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    pub(crate) fn style(&self, line: &RenderedLine) -> String {
        let text = line.text.trim_end_matches(['\r', '\n']);
        if !self.color {
            return text.to_string();
        }

        if let Some(color) = line.color {
            return format!("{}", text.color(ansi_to_owo(color)));
        }
        match line.level {
            Some(LogLevel::Severe) => format!("{}", text.red()),
            Some(LogLevel::Warning) => format!("{}", text.yellow()),
            Some(LogLevel::Config | LogLevel::Fine | LogLevel::Finer | LogLevel::Finest) => {
                format!("{}", text.dimmed())
            }
            Some(LogLevel::Info) | None if line.action.is_some() => format!("{}", text.cyan()),
            Some(LogLevel::Info) | None => text.to_string(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn line(&self, _instance: &str, line: RenderedLine) {
        let mut out = stdout().lock();
        // A closed stdout (piped into `head`) is not worth failing a task over.
        let _ = writeln!(out, "{}", self.style(&line));
    }

    fn closed(&self, instance: &str) {
        log::debug!("Output of '{instance}' closed");
    }
}

// ============================================
// TASK PROGRESS
// ============================================

/// Prints every lifecycle notification of one command.
pub struct ProgressPrinter {
    operation: Operation,
    color: bool,
}

impl ProgressPrinter {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            color: should_color(),
        }
    }

    pub fn with_color(operation: Operation, color: bool) -> Self {
        Self { operation, color }
    }

    pub(crate) fn format(&self, state: TaskState, event: TaskEvent, message: &str) -> String {
        let tag = format!("[{}]", self.operation);
        match state {
            TaskState::Running => format!("{} {message}", paint(&tag, self.color, AnsiColors::Cyan)),
            TaskState::Completed => format!("{} {message}", paint(&tag, self.color, AnsiColors::Green)),
            TaskState::Failed => format!(
                "{} {message} ({event})",
                paint(&tag, self.color, AnsiColors::Red)
            ),
        }
    }
}

impl TaskListener for ProgressPrinter {
    fn operation_state_changed(&self, state: TaskState, event: TaskEvent, message: &str) {
        println!("{}", self.format(state, event, message));
    }
}
