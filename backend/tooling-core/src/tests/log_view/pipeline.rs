use crate::log_view::ansi::AnsiColor;
use crate::log_view::pipeline::{LinePipeline, level_prefix};
use crate::log_view::recognizer::{Recognizer, StackFrameRecognizer};

use models::{LogLevel, LogRecord};

use std::sync::Arc;

fn pipeline(max: usize) -> LinePipeline {
    LinePipeline::new(vec![Arc::new(StackFrameRecognizer) as Arc<dyn Recognizer>], max)
}

#[test]
fn given_record_with_level_field_when_rendered_then_level_parsed() {
    let record = LogRecord {
        level: Some(String::from("WARNING")),
        message: String::from("disk almost full\n"),
        ..LogRecord::default()
    };

    let line = pipeline(500).render(&record);

    assert_eq!(line.text, "WARNING: disk almost full\n");
    assert_eq!(line.level, Some(LogLevel::Warning));
    assert!(line.action.is_none());
}

#[test]
fn given_plain_colored_line_when_rendered_then_level_from_prefix_and_color() {
    let line = pipeline(500).render(&LogRecord::plain("\x1b[31mSEVERE: boom\x1b[0m\n"));

    assert_eq!(line.text, "SEVERE: boom\n");
    assert_eq!(line.level, Some(LogLevel::Severe));
    assert_eq!(line.color, Some(AnsiColor::Red));
}

#[test]
fn given_stack_frame_line_when_rendered_then_action_attached() {
    let line = pipeline(500).render(&LogRecord::plain("\tat a.B.c(B.java:3)\n"));

    assert!(line.action.is_some());
}

/// **VALUE**: Verifies that overly long lines bypass the recognizers.
///
/// **WHY THIS MATTERS**: Recognizers run regexes on every line; huge single-line dumps
/// would otherwise stall the log reader.
#[test]
fn given_line_longer_than_limit_when_rendered_then_recognizers_skipped() {
    // GIVEN: A frame padded past a 40 character limit
    let text = format!("\tat a.B.c(B.java:3) {}\n", "x".repeat(40));

    // WHEN: Rendering
    let line = pipeline(40).render(&LogRecord::plain(text));

    // THEN: No action
    assert!(line.action.is_none());
}

#[test]
fn given_various_prefixes_when_parsed_then_only_level_tokens_count() {
    assert_eq!(level_prefix("INFO: x"), Some(LogLevel::Info));
    assert_eq!(level_prefix("WARN: x"), Some(LogLevel::Warning));
    assert_eq!(level_prefix("Info: x"), None);
    assert_eq!(level_prefix("HELLO: x"), None);
    assert_eq!(level_prefix("no colon"), None);
}
