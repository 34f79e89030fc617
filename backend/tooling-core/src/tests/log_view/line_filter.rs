use crate::log_view::LogFilter;
use crate::log_view::line_filter::{LineStreamFilter, is_header_line};

#[test]
fn given_timestamp_header_when_checked_then_is_header() {
    assert!(is_header_line(
        "Oct 19, 2026 10:15:30 AM com.sun.enterprise.glassfish.bootstrap.ASMain main"
    ));
    assert!(is_header_line("2026-10-19 9:05:07 something"));
}

#[test]
fn given_level_line_or_stack_frame_when_checked_then_not_header() {
    assert!(!is_header_line("INFO: Server started at 10:15:30"));
    assert!(!is_header_line("\tat com.example.Foo.bar(Foo.java:42)"));
    assert!(!is_header_line("plain output"));
}

/// **VALUE**: Verifies that the stream filter hides header lines and keeps everything else.
///
/// **WHY THIS MATTERS**: Server stdout prints a timestamp header before each `LEVEL: message`
/// line; showing both doubles the output without adding information.
#[test]
fn given_header_and_level_lines_when_streamed_then_only_level_line_emitted() {
    // GIVEN: A stream filter
    let mut filter = LineStreamFilter::new();

    // WHEN: Feeding a header, a level line and a blank line
    let records = filter.process_str(
        "Oct 19, 2026 10:15:30 AM com.example.Boot main\r\nINFO: Booting\n\n",
    );

    // THEN: Only the level line
    let lines: Vec<String> = records.iter().map(|r| r.render()).collect();
    assert_eq!(lines, vec!["INFO: Booting\n"]);
}

#[test]
fn given_unterminated_line_when_flushed_then_emitted() {
    let mut filter = LineStreamFilter::new();
    assert!(filter.process_str("tail without newline").is_empty());

    let record = filter.flush().unwrap();

    assert_eq!(record.message, "tail without newline\n");
}
