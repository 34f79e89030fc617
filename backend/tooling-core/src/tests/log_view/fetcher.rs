use crate::log_view::fetcher::{FileFollower, Utf8Carry};

use std::io::Write;

use tempfile::NamedTempFile;

#[test]
fn given_multibyte_char_split_across_chunks_when_decoded_then_carried_over() {
    // GIVEN: "é" (0xC3 0xA9) cut between two reads
    let mut carry = Utf8Carry::default();

    // WHEN: Decoding both halves
    let first = carry.decode(b"caf\xC3");
    let second = carry.decode(b"\xA9!");

    // THEN: Nothing lost, nothing replaced
    assert_eq!(first, "caf");
    assert_eq!(second, "é!");
}

#[test]
fn given_invalid_byte_when_decoded_then_replacement_character() {
    let mut carry = Utf8Carry::default();

    assert_eq!(carry.decode(b"a\xFFb"), "a\u{FFFD}b");
}

#[test]
fn given_dangling_sequence_when_finished_then_lossy_output() {
    let mut carry = Utf8Carry::default();
    assert_eq!(carry.decode(b"x\xE2\x82"), "x");

    assert_eq!(carry.finish(), "\u{FFFD}");
    assert_eq!(carry.finish(), "");
}

/// **VALUE**: Verifies that following a growing file yields only the appended bytes.
///
/// **BUG THIS CATCHES**: Would catch re-reading from offset zero, which repeats the
/// whole log in the viewer on every poll.
#[tokio::test]
async fn given_growing_file_when_read_repeatedly_then_only_delta_returned() {
    // GIVEN: A log file with one line, followed from the start
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "first\n").unwrap();
    file.flush().unwrap();
    let mut follower = FileFollower::new(file.path(), true);

    // WHEN: Reading, appending, reading again, reading without changes
    let initial = follower.read_delta().await.unwrap();
    write!(file, "second\n").unwrap();
    file.flush().unwrap();
    let delta = follower.read_delta().await.unwrap();
    let idle = follower.read_delta().await.unwrap();

    // THEN: Each byte is returned exactly once
    assert_eq!(initial, "first\n");
    assert_eq!(delta, "second\n");
    assert_eq!(idle, "");
    assert_eq!(follower.offset(), 13);
}

#[tokio::test]
async fn given_follow_from_end_when_read_then_existing_content_skipped() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "old content\n").unwrap();
    file.flush().unwrap();
    let mut follower = FileFollower::new(file.path(), false);

    assert_eq!(follower.read_delta().await.unwrap(), "");

    write!(file, "new\n").unwrap();
    file.flush().unwrap();
    assert_eq!(follower.read_delta().await.unwrap(), "new\n");
}

#[tokio::test]
async fn given_missing_file_when_read_then_empty_until_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.log");
    let mut follower = FileFollower::new(&path, true);

    assert_eq!(follower.read_delta().await.unwrap(), "");

    std::fs::write(&path, "hello\n").unwrap();
    assert_eq!(follower.read_delta().await.unwrap(), "hello\n");
}
