use std::io;
use thiserror::Error;

/// Errors raised while scanning AMF0 encoded bytes
#[derive(Debug, Error, PartialEq)]
pub enum Amf0ScanError {
    /// Hit the end of the byte buffer while more data was required
    #[error("Hit end of the byte buffer but was expecting {needed} more bytes ({available} available)")]
    UnexpectedEof { needed: usize, available: usize },

    /// A specific type marker was required but a different one was found
    #[error("Expected AMF0 marker {expected:#04x} but found {actual:#04x}")]
    UnexpectedMarker { expected: u8, actual: u8 },

    /// Strings that are read (rather than skipped) must contain at least one byte
    #[error("Encountered a zero length string where a value was required")]
    EmptyString,

    /// The value's type is valid AMF0 but cannot be skipped by the scanner
    #[error("Encountered unsupported marker {marker:#04x}")]
    UnsupportedMarker { marker: u8 },
}

/// Errors raised while encoding AMF0 values
#[derive(Debug, Error)]
pub enum Amf0SerializationError {
    #[error("String length greater than 65,535")]
    NormalStringTooLong,

    #[error("Object property name length greater than 65,535")]
    PropertyNameTooLong,

    #[error("{0}")]
    Io(#[from] io::Error),
}
