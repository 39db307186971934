use super::ChunkReadError;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

const FULL_HEADER_LENGTH: usize = 11;
const TIME_DELTA_HEADER_LENGTH: usize = 7;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ChunkHeaderFormat {
    Full,                            // Format 0
    TimeDeltaWithoutMessageStreamId, // Format 1
    TimeDeltaOnly,                   // Format 2
    Empty,                           // Format 3
}

impl ChunkHeaderFormat {
    pub fn format_id(&self) -> u8 {
        match *self {
            ChunkHeaderFormat::Full => 0,
            ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId => 1,
            ChunkHeaderFormat::TimeDeltaOnly => 2,
            ChunkHeaderFormat::Empty => 3,
        }
    }
}

/// The 1 to 3 byte prefix of every RTMP chunk
#[derive(PartialEq, Eq, Debug)]
pub struct BasicHeader {
    pub format: ChunkHeaderFormat,
    pub chunk_stream_id: u32,
}

/// The fields of a message's first chunk header that matter for reassembling it
#[derive(PartialEq, Eq, Debug)]
pub struct MessageHeader {
    pub chunk_stream_id: u32,
    pub message_length: u32,
    pub message_type_id: u8,
}

/// Reads a chunk basic header from the front of `input`.
///
/// On success `input` is advanced past the header.  On failure `input` is left untouched.
pub fn read_basic_header(input: &mut &[u8]) -> Result<BasicHeader, ChunkReadError> {
    let bytes = *input;
    if bytes.is_empty() {
        return Err(ChunkReadError::NotEnoughBytes {
            needed: 1,
            available: 0,
        });
    }

    let format = get_format(bytes[0]);
    let (chunk_stream_id, header_length) = get_csid(bytes)?;

    *input = &bytes[header_length..];
    Ok(BasicHeader {
        format,
        chunk_stream_id,
    })
}

/// Reads the basic header and message header of a chunk that starts a new message.
///
/// Only type 0 and type 1 headers are accepted, as they are the only formats that state the
/// message's length and type.  The timestamp and message stream id are skipped.
pub fn read_message_header(input: &mut &[u8]) -> Result<MessageHeader, ChunkReadError> {
    let mut bytes = *input;
    let basic_header = read_basic_header(&mut bytes)?;
    let header_length = match basic_header.format {
        ChunkHeaderFormat::Full => FULL_HEADER_LENGTH,
        ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId => TIME_DELTA_HEADER_LENGTH,
        format => {
            return Err(ChunkReadError::UnsupportedHeaderFormat {
                format_id: format.format_id(),
            })
        }
    };

    if bytes.len() < header_length {
        return Err(ChunkReadError::NotEnoughBytes {
            needed: header_length,
            available: bytes.len(),
        });
    }

    let _timestamp = bytes.read_u24::<BigEndian>()?;
    let message_length = bytes.read_u24::<BigEndian>()?;
    let message_type_id = bytes.read_u8()?;
    if basic_header.format == ChunkHeaderFormat::Full {
        let _message_stream_id = bytes.read_u32::<LittleEndian>()?;
    }

    *input = bytes;
    Ok(MessageHeader {
        chunk_stream_id: basic_header.chunk_stream_id,
        message_length,
        message_type_id,
    })
}

fn get_format(byte: u8) -> ChunkHeaderFormat {
    const TYPE_0_MASK: u8 = 0b00000000;
    const TYPE_1_MASK: u8 = 0b01000000;
    const TYPE_2_MASK: u8 = 0b10000000;
    const FORMAT_MASK: u8 = 0b11000000;

    match byte & FORMAT_MASK {
        TYPE_0_MASK => ChunkHeaderFormat::Full,
        TYPE_1_MASK => ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId,
        TYPE_2_MASK => ChunkHeaderFormat::TimeDeltaOnly,
        _ => ChunkHeaderFormat::Empty,
    }
}

fn get_csid(buffer: &[u8]) -> Result<(u32, usize), ChunkReadError> {
    const CSID_MASK: u8 = 0b00111111;

    let header_length = match buffer[0] & CSID_MASK {
        0 => 2,
        1 => 3,
        _ => 1,
    };

    if buffer.len() < header_length {
        return Err(ChunkReadError::NotEnoughBytes {
            needed: header_length,
            available: buffer.len(),
        });
    }

    let csid = match header_length {
        2 => buffer[1] as u32 + 64,
        3 => (buffer[2] as u32 * 256) + buffer[1] as u32 + 64,
        _ => (buffer[0] & CSID_MASK) as u32,
    };

    Ok((csid, header_length))
}
