//! Journal frame encoding with CRC32 checksums
//!
//! Frame layout:
//!
//! ```text
//! +----------------+----------------+----------------------+
//! | len: u32 LE    | crc32: u32 LE  | body: bincode record |
//! +----------------+----------------+----------------------+
//! ```
//!
//! `crc32` covers `body` only. A frame cut short by a crash is reported as
//! [`DecodeError::Incomplete`] so recovery can drop it; a complete frame whose
//! checksum does not match is [`DecodeError::ChecksumMismatch`].

use crate::wal::WalRecord;
use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Size of the frame header in bytes
pub const HEADER_LEN: usize = 8;

/// Upper bound on a single frame body
///
/// Guards recovery against allocating for a garbage length field.
pub const MAX_BODY_LEN: usize = 64 * 1024 * 1024;

/// Frame decoding failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before the frame does
    #[error("incomplete frame at offset {offset}: need {needed} bytes, have {have}")]
    Incomplete {
        /// Frame start offset
        offset: u64,
        /// Bytes available from offset
        have: usize,
        /// Bytes the frame requires
        needed: usize,
    },

    /// Body checksum does not match the header
    #[error("checksum mismatch at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Frame start offset
        offset: u64,
        /// Checksum stored in the header
        expected: u32,
        /// Checksum computed over the body
        actual: u32,
    },

    /// Length field exceeds [`MAX_BODY_LEN`]
    #[error("frame at offset {offset} declares {len} bytes")]
    Oversized {
        /// Frame start offset
        offset: u64,
        /// Declared body length
        len: usize,
    },

    /// Body is not a valid record
    #[error("undecodable record at offset {offset}: {message}")]
    Malformed {
        /// Frame start offset
        offset: u64,
        /// Decoder message
        message: String,
    },
}

/// Frame encoding failure
///
/// Raised before any byte is written, so the journal is left untouched.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Record could not be serialized
    #[error("cannot serialize record: {0}")]
    Serialization(#[from] bincode::Error),

    /// Body would exceed [`MAX_BODY_LEN`]
    #[error("record body of {len} bytes exceeds the {max} byte frame limit")]
    Oversized {
        /// Serialized body length
        len: usize,
        /// Frame body limit
        max: usize,
    },
}

/// Encode a record into a complete frame
///
/// Refuses bodies that [`decode_record`] would reject as oversized.
pub fn encode_record(record: &WalRecord) -> Result<Vec<u8>, EncodeError> {
    let body = bincode::serialize(record)?;
    let oversized = EncodeError::Oversized {
        len: body.len(),
        max: MAX_BODY_LEN,
    };
    if body.len() > MAX_BODY_LEN {
        return Err(oversized);
    }
    let len = u32::try_from(body.len()).map_err(|_| oversized)?;
    let mut frame = vec![0u8; HEADER_LEN + body.len()];
    LittleEndian::write_u32(&mut frame[0..4], len);
    LittleEndian::write_u32(&mut frame[4..8], crc32fast::hash(&body));
    frame[HEADER_LEN..].copy_from_slice(&body);
    Ok(frame)
}

/// Decode one frame from the start of `buf`
///
/// `offset` is the position of `buf[0]` in the file, used for error reports.
/// Returns the record and the number of bytes consumed.
pub fn decode_record(buf: &[u8], offset: u64) -> Result<(WalRecord, usize), DecodeError> {
    if buf.len() < HEADER_LEN {
        return Err(DecodeError::Incomplete {
            offset,
            have: buf.len(),
            needed: HEADER_LEN,
        });
    }

    let len = LittleEndian::read_u32(&buf[0..4]) as usize;
    if len > MAX_BODY_LEN {
        return Err(DecodeError::Oversized { offset, len });
    }
    let expected = LittleEndian::read_u32(&buf[4..8]);

    let total = HEADER_LEN + len;
    if buf.len() < total {
        return Err(DecodeError::Incomplete {
            offset,
            have: buf.len(),
            needed: total,
        });
    }

    let body = &buf[HEADER_LEN..total];
    let actual = crc32fast::hash(body);
    if actual != expected {
        return Err(DecodeError::ChecksumMismatch {
            offset,
            expected,
            actual,
        });
    }

    let record = bincode::deserialize(body).map_err(|e| DecodeError::Malformed {
        offset,
        message: e.to_string(),
    })?;
    Ok((record, total))
}
