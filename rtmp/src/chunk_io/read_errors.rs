use std::io;
use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while reading RTMP chunk
/// headers or reassembling a chunked message.
#[derive(Debug, Error)]
pub enum ChunkReadError {
    /// The input ended before the header or chunk currently being read was complete
    #[error("Required {needed} bytes but only {available} were available")]
    NotEnoughBytes { needed: usize, available: usize },

    /// Only type 0 and type 1 chunk headers carry a message length, so the first chunk of a
    /// message cannot use any other header format.
    #[error("Chunk header format {format_id} cannot start a message")]
    UnsupportedHeaderFormat { format_id: u8 },

    /// Every chunk after the first chunk of a message must use a type 3 (empty) header
    #[error("Continuation chunk used header format {format_id} instead of format 3")]
    InvalidContinuationFormat { format_id: u8 },

    /// A continuation chunk belonged to a different chunk stream than the message it continues
    #[error("Continuation chunk was on csid {actual} but the message started on csid {expected}")]
    ChunkStreamIdMismatch { expected: u32, actual: u32 },

    /// An I/O error occurred while reading the input buffer
    #[error("{0}")]
    Io(#[from] io::Error),
}
