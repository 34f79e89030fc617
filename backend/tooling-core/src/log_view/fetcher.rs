use crate::error::log_view::LogViewError;
use crate::log_view::LogFilter;
use crate::log_view::pipeline::{LinePipeline, LogSink};

use common::ErrorLocation;

use std::io::{ErrorKind, SeekFrom};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio::time::sleep;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Decodes UTF-8 from arbitrary byte chunks, holding back a sequence split
/// across two reads until the rest arrives.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::new();
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[start..valid_end]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            start = valid_end;
                            break;
                        }
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + invalid;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        out
    }

    /// Whatever is still held back, lossily decoded.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Follows a growing log file, reading only bytes appended since the last read.
///
/// A file that shrinks (rotation, truncation) is not detected; reading
/// resumes once it grows past the previous offset again.
#[derive(Debug)]
pub struct FileFollower {
    path: PathBuf,
    offset: u64,
    decoder: Utf8Carry,
}

impl FileFollower {
    /// With `from_start` the existing content is read too; otherwise only
    /// what is appended from now on.
    pub fn new(path: impl Into<PathBuf>, from_start: bool) -> Self {
        let path = path.into();
        let offset = if from_start {
            0
        } else {
            std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0)
        };
        Self {
            path,
            offset,
            decoder: Utf8Carry::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[track_caller]
    fn io_error(&self, source: std::io::Error) -> LogViewError {
        LogViewError::Io {
            path: self.path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }

    /// Text appended since the previous call; empty when nothing changed or
    /// the file does not exist yet.
    pub async fn read_delta(&mut self) -> Result<String, LogViewError> {
        let len = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if len <= self.offset {
            return Ok(String::new());
        }

        let mut file = File::open(&self.path).await.map_err(|e| self.io_error(e))?;
        file.seek(SeekFrom::Start(self.offset))
            .await
            .map_err(|e| self.io_error(e))?;

        let mut bytes = Vec::new();
        file.take(len - self.offset)
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| self.io_error(e))?;

        self.offset += bytes.len() as u64;
        trace!("Read {} new bytes from {}", bytes.len(), self.path.display());
        Ok(self.decoder.decode(&bytes))
    }
}

pub(crate) fn feed(
    text: &str,
    filter: &mut dyn LogFilter,
    pipeline: &LinePipeline,
    sink: &dyn LogSink,
    instance: &str,
) {
    for c in text.chars() {
        if let Some(record) = filter.process(c) {
            sink.line(instance, pipeline.render(&record));
        }
    }
}

pub(crate) async fn pump_file(
    instance: String,
    mut follower: FileFollower,
    mut filter: Box<dyn LogFilter>,
    pipeline: LinePipeline,
    sink: Arc<dyn LogSink>,
    read_delay: Duration,
) {
    debug!("Following {} for '{instance}'", follower.path().display());

    loop {
        match follower.read_delta().await {
            Ok(text) => feed(&text, filter.as_mut(), &pipeline, sink.as_ref(), &instance),
            Err(e) => warn!("Log reader for '{instance}': {e}"),
        }
        sleep(read_delay).await;
    }
}

pub(crate) async fn pump_stream<R>(
    instance: String,
    label: &'static str,
    mut reader: R,
    mut filter: Box<dyn LogFilter>,
    pipeline: LinePipeline,
    sink: Arc<dyn LogSink>,
) where
    R: AsyncRead + Unpin + Send,
{
    let mut decoder = Utf8Carry::default();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.decode(&buffer[..n]);
                feed(&text, filter.as_mut(), &pipeline, sink.as_ref(), &instance);
            }
            Err(e) => {
                warn!("Reading {label} of '{instance}' failed: {e}");
                break;
            }
        }
    }

    let rest = decoder.finish();
    feed(&rest, filter.as_mut(), &pipeline, sink.as_ref(), &instance);
    if let Some(record) = filter.flush() {
        sink.line(&instance, pipeline.render(&record));
    }

    debug!("{label} of '{instance}' closed");
    sink.closed(&instance);
}
