use super::chunk_header::{read_basic_header, ChunkHeaderFormat};
use super::ChunkReadError;
use bytes::{Bytes, BytesMut};
use std::cmp::min;

/// Maximum chunk size in effect before any `SetChunkSize` message has been exchanged
pub const INITIAL_MAX_CHUNK_SIZE: usize = 128;

/// Gathers the body of a message that was split into chunks into one contiguous buffer.
///
/// `input` must be positioned directly after the message's first chunk header.  Every chunk
/// after the first must carry a type 3 basic header on the same chunk stream as the first
/// chunk.  On success `input` is advanced past the last chunk of the message; on failure it is
/// left untouched.
pub fn reassemble_message(
    input: &mut &[u8],
    chunk_stream_id: u32,
    message_length: u32,
) -> Result<Bytes, ChunkReadError> {
    let mut bytes = *input;
    let mut remaining = message_length as usize;

    // The length is peer controlled, so never reserve more than could actually arrive
    let mut body = BytesMut::with_capacity(min(remaining, bytes.len()));

    while remaining > 0 {
        let chunk_length = min(remaining, INITIAL_MAX_CHUNK_SIZE);
        if bytes.len() < chunk_length {
            return Err(ChunkReadError::NotEnoughBytes {
                needed: chunk_length,
                available: bytes.len(),
            });
        }

        body.extend_from_slice(&bytes[..chunk_length]);
        bytes = &bytes[chunk_length..];
        remaining -= chunk_length;

        if remaining > 0 {
            let header = read_basic_header(&mut bytes)?;
            if header.format != ChunkHeaderFormat::Empty {
                return Err(ChunkReadError::InvalidContinuationFormat {
                    format_id: header.format.format_id(),
                });
            }

            if header.chunk_stream_id != chunk_stream_id {
                return Err(ChunkReadError::ChunkStreamIdMismatch {
                    expected: chunk_stream_id,
                    actual: header.chunk_stream_id,
                });
            }
        }
    }

    *input = bytes;
    Ok(body.freeze())
}
