//! Readers for the pieces of the RTMP chunk stream format needed to rebuild the first message
//! a peer sends.
//!
//! Only the default 128 byte chunk size is supported, since a different chunk size can only be
//! negotiated through a `SetChunkSize` message, and the first message of a connection cannot be
//! preceded by one.

mod chunk_header;
mod read_errors;
mod reassembler;

pub use self::chunk_header::{
    read_basic_header, read_message_header, BasicHeader, ChunkHeaderFormat, MessageHeader,
};
pub use self::read_errors::ChunkReadError;
pub use self::reassembler::{reassemble_message, INITIAL_MAX_CHUNK_SIZE};
