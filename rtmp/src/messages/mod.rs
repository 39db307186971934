/*!
This module contains functionality for picking metadata out of the first RTMP message a client
sends after the handshake, which is expected to be a `connect` command.

Only the `swfUrl` and `pageUrl` properties of the command object are captured.  Every other
property is skipped without being decoded.
*/

mod connect;
mod deserialization_errors;

pub use self::connect::{
    extract_connect_properties, read_connect_message, ConnectMetadata, AMF0_COMMAND_TYPE_ID,
};
pub use self::deserialization_errors::ConnectParseError;
