use crate::log_view::LogFilter;
use crate::log_view::bracketed::BracketedFilter;

use models::LogRecord;

const RECORD: &str = "[#|2026-10-19T10:15:30.123+0000|INFO|Payara 6.2024.6|javax.enterprise.system.core|_ThreadID=1;_ThreadName=main;|Server started|#]\n";

fn rendered(records: &[LogRecord]) -> Vec<String> {
    records.iter().map(LogRecord::render).collect()
}

/// **VALUE**: Verifies that a well-formed record renders to exactly one `LEVEL: message` line.
///
/// **WHY THIS MATTERS**: This is the common case of every server.log line; the header fields
/// must never leak into the view.
#[test]
fn given_well_formed_record_when_processed_then_single_prefixed_line() {
    // GIVEN: A fresh filter
    let mut filter = BracketedFilter::new();

    // WHEN: Feeding one record
    let records = filter.process_str(RECORD);

    // THEN: One rendered line with all header fields captured
    assert_eq!(rendered(&records), vec!["INFO: Server started\n"]);
    let record = &records[0];
    assert_eq!(record.timestamp.as_deref(), Some("2026-10-19T10:15:30.123+0000"));
    assert_eq!(record.version.as_deref(), Some("Payara 6.2024.6"));
    assert_eq!(record.logger.as_deref(), Some("javax.enterprise.system.core"));
    assert_eq!(record.thread_info.as_deref(), Some("_ThreadID=1;_ThreadName=main;"));
    assert!(!record.multiline);
}

/// **VALUE**: Verifies the parser is independent of how the input is chunked.
///
/// **BUG THIS CATCHES**: Would catch state kept per call instead of per filter, which
/// breaks as soon as a file read ends in the middle of a delimiter.
#[test]
fn given_record_split_at_every_position_when_processed_then_same_single_line() {
    for split in 0..=RECORD.len() {
        if !RECORD.is_char_boundary(split) {
            continue;
        }
        // GIVEN: A fresh filter and the record cut in two
        let mut filter = BracketedFilter::new();
        let (head, tail) = RECORD.split_at(split);

        // WHEN: Feeding both chunks
        let mut records = filter.process_str(head);
        records.extend(filter.process_str(tail));

        // THEN: Always exactly the one line
        assert_eq!(
            rendered(&records),
            vec!["INFO: Server started\n"],
            "split at {split}"
        );
    }
}

#[test]
fn given_hash_inside_message_when_processed_then_message_keeps_it() {
    let mut filter = BracketedFilter::new();

    let records = filter.process_str("[#|t|I|v|c|th|a#b|#]");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "a#b\n");
    assert_eq!(records[0].level.as_deref(), Some("I"));
}

/// **VALUE**: Verifies that a `|` or `|#` not followed by the closing sequence stays in
/// the message.
///
/// **BUG THIS CATCHES**: Would catch dropping the consumed delimiter characters when the
/// pending close turns out to be message text.
#[test]
fn given_partial_close_sequences_in_message_when_processed_then_reappended() {
    let mut filter = BracketedFilter::new();

    let records = filter.process_str("[#|t|INFO|v|c|th|a|b|#c||#]");

    assert_eq!(rendered(&records), vec!["INFO: a|b|#c|\n"]);
}

/// **VALUE**: Verifies multi-line messages: the level prefix appears exactly once.
///
/// **WHY THIS MATTERS**: Stack traces are logged as one record spanning many lines; repeating
/// the prefix on each line would make them unreadable.
#[test]
fn given_multiline_message_when_processed_then_prefix_only_on_first_chunk() {
    // GIVEN: A record whose message spans three lines
    let mut filter = BracketedFilter::new();

    // WHEN: Processing it
    let records = filter.process_str(
        "[#|t|SEVERE|v|c|th|Boom\n\tat com.example.Foo.bar(Foo.java:42)\n\tat com.example.Main.main(Main.java:7)|#]\n",
    );

    // THEN: First chunk prefixed, continuations flagged and bare
    assert_eq!(
        rendered(&records),
        vec![
            "SEVERE: Boom\n",
            "\tat com.example.Foo.bar(Foo.java:42)\n",
            "\tat com.example.Main.main(Main.java:7)\n",
        ]
    );
    assert!(!records[0].multiline);
    assert!(records[1].multiline && records[2].multiline);
}

#[test]
fn given_message_ending_with_newline_when_closed_then_no_empty_chunk() {
    let mut filter = BracketedFilter::new();

    let records = filter.process_str("[#|t|INFO|v|c|th|done\n|#]\n");

    assert_eq!(rendered(&records), vec!["INFO: done\n"]);
}

#[test]
fn given_deviation_after_bracket_when_processed_then_plain_text_verbatim() {
    let mut filter = BracketedFilter::new();

    let records = filter.process_str("[x] not a record\n[#nope\n");

    assert_eq!(rendered(&records), vec!["[x] not a record\n", "[#nope\n"]);
    assert!(records.iter().all(LogRecord::is_plain));
}

#[test]
fn given_plain_text_before_record_when_record_opens_then_plain_flushed_first() {
    let mut filter = BracketedFilter::new();

    let records = filter.process_str("Launching server[#|t|INFO|v|c|th|up|#]");

    assert_eq!(rendered(&records), vec!["Launching server", "INFO: up\n"]);
}

#[test]
fn given_carriage_returns_and_blank_lines_when_processed_then_dropped() {
    let mut filter = BracketedFilter::new();

    let records = filter.process_str("line one\r\n\r\n\n[#|t|INFO|v|c|th|two|#]\r\n");

    assert_eq!(rendered(&records), vec!["line one\n", "INFO: two\n"]);
}

#[test]
fn given_unterminated_record_when_flushed_then_partial_message_emitted() {
    let mut filter = BracketedFilter::new();
    assert!(filter.process_str("[#|t|WARNING|v|c|th|half").is_empty());

    let record = filter.flush().unwrap();

    assert_eq!(record.render(), "WARNING: half\n");
    assert!(filter.flush().is_none());
}

/// **VALUE**: Verifies text that only looked like a record header survives the end of input.
///
/// **WHY THIS MATTERS**: `logs` renders server.log once and stream readers flush at EOF; a
/// tail cut inside a header, or prose mentioning `[#|`, must still reach the view.
///
/// **BUG THIS CATCHES**: Would catch flush discarding the header fields parsed so far.
#[test]
fn given_truncated_header_when_flushed_then_text_passed_through() {
    // GIVEN: Plain text followed by an opening delimiter that never becomes a record
    let mut filter = BracketedFilter::new();
    let mut records = filter.process_str("plain line\nsee [#|docs for the format");

    // WHEN: The input ends
    records.extend(filter.flush());

    // THEN: Every character comes out as plain text
    assert_eq!(rendered(&records).concat(), "plain line\nsee [#|docs for the format");
    assert!(records.iter().all(LogRecord::is_plain));
    assert!(filter.flush().is_none());
}

#[test]
fn given_tail_cut_after_several_header_fields_when_flushed_then_fields_restored() {
    let mut filter = BracketedFilter::new();
    assert!(filter.process_str("[#|2026-10-19|SEVERE|Payara 6|jav").is_empty());

    let record = filter.flush().unwrap();

    assert_eq!(record.render(), "[#|2026-10-19|SEVERE|Payara 6|jav");
    assert!(record.is_plain());
}
