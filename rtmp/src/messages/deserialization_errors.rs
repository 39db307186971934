use crate::chunk_io::ChunkReadError;
use rml_amf0_scan::Amf0ScanError;
use thiserror::Error;

/// Enumeration that represents the various ways the first command message of a connection
/// can fail to be recognized as a `connect` command.
#[derive(Debug, Error)]
pub enum ConnectParseError {
    /// The first message was not an AMF0 command message
    #[error("Expected an AMF0 command message (type 20) but received message type {type_id}")]
    NotAnAmf0Command { type_id: u8 },

    /// The command message's name was something other than `connect`
    #[error("The command message was not a connect command")]
    NotAConnectCommand,

    /// The command name was not followed by a numeric transaction id
    #[error("The connect command did not contain a transaction id")]
    MissingTransactionId,

    /// The transaction id was not followed by the command object
    #[error("The connect command did not contain a command object")]
    MissingCommandObject,

    /// A zero length property name was not followed by the object end marker
    #[error("Unexpected empty object property name")]
    UnexpectedEmptyPropertyName,

    /// The command object ended partway through a property
    #[error("The command object was truncated")]
    TruncatedObject,

    /// The message's chunks could not be read
    #[error("The command message's chunks could not be read: {0}")]
    Chunk(#[from] ChunkReadError),

    /// A value inside the command could not be read or skipped
    #[error("The command message did not contain valid Amf0 encoded values: {0}")]
    Amf0(#[from] Amf0ScanError),
}
