use crate::chunk_io::{read_message_header, reassemble_message};
use crate::messages::ConnectParseError;
use byteorder::{BigEndian, ByteOrder};
use rml_amf0_scan::{markers, Amf0Reader};

/// Message type id of an AMF0 encoded command message
pub const AMF0_COMMAND_TYPE_ID: u8 = 20;

const CONNECT_COMMAND_NAME: &[u8] = b"connect";
const SWF_URL_PROPERTY: &[u8] = b"swfUrl";
const PAGE_URL_PROPERTY: &[u8] = b"pageUrl";
const TRANSACTION_ID_LENGTH: usize = 1 + 8;

/// Values captured from a client's `connect` command
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ConnectMetadata {
    /// URL of the flash player (or other client) that initiated the connection
    pub swf_url: Option<String>,

    /// URL of the web page the client was embedded in
    pub page_url: Option<String>,
}

impl ConnectMetadata {
    pub fn new() -> ConnectMetadata {
        ConnectMetadata {
            swf_url: None,
            page_url: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.swf_url.is_none() && self.page_url.is_none()
    }

    /// Drops any captured values
    pub fn clear(&mut self) {
        self.swf_url = None;
        self.page_url = None;
    }
}

/// Reads one complete chunked message from the front of `input` and extracts the connect
/// command's properties from it into `metadata`.
///
/// On success `input` is advanced past the message.
pub fn read_connect_message(
    input: &mut &[u8],
    metadata: &mut ConnectMetadata,
) -> Result<(), ConnectParseError> {
    let mut bytes = *input;
    let header = read_message_header(&mut bytes)?;
    if header.message_type_id != AMF0_COMMAND_TYPE_ID {
        return Err(ConnectParseError::NotAnAmf0Command {
            type_id: header.message_type_id,
        });
    }

    let body = reassemble_message(&mut bytes, header.chunk_stream_id, header.message_length)?;
    extract_connect_properties(&body[..], metadata)?;

    *input = bytes;
    Ok(())
}

/// Walks the body of an AMF0 command message, requiring it to be a `connect` command, and
/// captures the first `swfUrl` and `pageUrl` properties of its command object.
///
/// Values that are already present in `metadata` are never replaced.  Reaching the end of the
/// body between two properties ends the scan just like an object end marker does.
pub fn extract_connect_properties(
    body: &[u8],
    metadata: &mut ConnectMetadata,
) -> Result<(), ConnectParseError> {
    let mut reader = Amf0Reader::new(body);

    let command_name = reader.read_string_bytes()?;
    if command_name != CONNECT_COMMAND_NAME {
        return Err(ConnectParseError::NotAConnectCommand);
    }

    match reader.peek(TRANSACTION_ID_LENGTH) {
        Ok(bytes) if bytes[0] == markers::NUMBER_MARKER => {
            reader.take(TRANSACTION_ID_LENGTH)?;
        }

        _ => return Err(ConnectParseError::MissingTransactionId),
    }

    reader
        .expect_marker(markers::OBJECT_MARKER)
        .map_err(|_| ConnectParseError::MissingCommandObject)?;

    loop {
        // A full object end marker is 3 bytes, so anything shorter cannot be a valid property
        let property_start = reader
            .peek(3)
            .map_err(|_| ConnectParseError::TruncatedObject)?;

        let name_length = BigEndian::read_u16(&property_start[..2]) as usize;
        if name_length == 0 {
            if property_start[2] == markers::OBJECT_END_MARKER {
                break;
            }

            return Err(ConnectParseError::UnexpectedEmptyPropertyName);
        }

        reader.take(2)?;
        let name = reader.take(name_length)?;

        if name == SWF_URL_PROPERTY && metadata.swf_url.is_none() {
            metadata.swf_url = Some(reader.read_string()?);
        } else if name == PAGE_URL_PROPERTY && metadata.page_url.is_none() {
            metadata.page_url = Some(reader.read_string()?);
        } else {
            reader.skip_value()?;
        }

        if reader.is_empty() {
            break;
        }
    }

    Ok(())
}
