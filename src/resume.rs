// Motion Logger - Sample Counter Resume
//
// After a mount the counter continues from the last record already on the
// card. The last line is found by reading a small chunk from the end of the
// file and searching it backwards for a line boundary, doubling the chunk
// until one is found or the whole file has been read.

use crate::config::{LOG_HEADER, RESUME_CHUNK_BYTES, RESUME_MAX_BYTES};
use crate::error::LoggerError;
use crate::hal::StorageDriver;
use crate::record::parse_index;

/// Where the counter picks up after a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// The log file did not exist and was created with its header.
    Created,
    /// The file exists but holds no record (empty, or header only).
    NoRecords,
    /// The last record carries this index.
    Continue { last_index: u32 },
    /// The last line does not start with an index.
    Unparsed,
}

impl Resume {
    pub fn next_index(&self) -> u32 {
        match *self {
            Self::Continue { last_index } => last_index.wrapping_add(1),
            Self::Created | Self::NoRecords | Self::Unparsed => 0,
        }
    }
}

/// Last non-empty line of `tail`, without its terminator. The flag is `true`
/// when a newline precedes the line inside `tail`, i.e. the line is known to
/// be complete even if `tail` is only the end of a longer file.
pub fn split_last_line(tail: &[u8]) -> Option<(&[u8], bool)> {
    let end = tail.iter().rposition(|b| !matches!(b, b'\n' | b'\r'))? + 1;
    let body = &tail[..end];
    Some(match body.iter().rposition(|&b| b == b'\n') {
        Some(newline) => (&body[newline + 1..], true),
        None => (body, false),
    })
}

/// Read backwards from the end of the log file until the last line is
/// isolated. `Ok(None)` when the file has no non-empty line, or when the
/// last line is longer than `max_bytes`.
///
/// Trailing blank lines are skipped rather than taken as the last line, so
/// a stray newline after the final record does not restart the counter at 0.
/// A strict backwards scan would stop at the empty line instead.
pub fn find_last_line<D: StorageDriver + ?Sized>(
    storage: &mut D,
    chunk_bytes: usize,
    max_bytes: usize,
) -> anyhow::Result<Option<String>> {
    let mut want = chunk_bytes.clamp(1, max_bytes.max(1));
    loop {
        let tail = storage.read_tail(want)?;
        let whole_file = tail.len() < want;
        match split_last_line(&tail) {
            Some((line, bounded)) if bounded || whole_file => {
                return Ok(Some(String::from_utf8_lossy(line).into_owned()));
            }
            None if whole_file => return Ok(None),
            _ if want >= max_bytes => {
                log::warn!("No line boundary in the last {} bytes of the log", want);
                return Ok(None);
            }
            _ => want = want.saturating_mul(2).min(max_bytes),
        }
    }
}

/// Make sure the log file exists and work out where the counter continues.
/// Call only with the card mounted.
pub fn resume<D: StorageDriver + ?Sized>(storage: &mut D) -> Result<Resume, LoggerError> {
    let created = storage
        .create_with_header_if_absent(LOG_HEADER)
        .map_err(LoggerError::StorageOpen)?;
    if created {
        return Ok(Resume::Created);
    }

    let last_line =
        find_last_line(storage, RESUME_CHUNK_BYTES, RESUME_MAX_BYTES).map_err(LoggerError::StorageOpen)?;
    Ok(match last_line {
        None => Resume::NoRecords,
        Some(line) if line == LOG_HEADER.trim_end() => Resume::NoRecords,
        Some(line) => match parse_index(&line) {
            Some(last_index) => Resume::Continue { last_index },
            None => Resume::Unparsed,
        },
    })
}
