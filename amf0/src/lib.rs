//! This crate provides bounded scanning of data encoded with the Adobe AMF0 specification
//! located at
//! <https://wwwimages2.adobe.com/content/dam/acom/en/devnet/pdf/amf0-file-format-specification.pdf>
//!
//! Unlike a full AMF0 deserializer, the [`Amf0Reader`] never builds an object graph.  It walks a
//! borrowed byte slice one primitive at a time, which makes it suitable for picking a handful of
//! values out of untrusted traffic.  Every read is bounds checked and reports an error instead
//! of reading past the end of the input.
//!
//! # Examples
//! ```
//! use rml_amf0_scan::{Amf0Reader, Amf0Value, serialize};
//!
//! let input = vec![
//!     Amf0Value::Utf8String("connect".to_string()),
//!     Amf0Value::Number(1.0),
//!     Amf0Value::Boolean(true),
//! ];
//!
//! let bytes = serialize(&input).unwrap();
//! let mut reader = Amf0Reader::new(&bytes);
//!
//! assert_eq!(reader.read_string().unwrap(), "connect");
//! reader.skip_value().unwrap();
//! reader.skip_value().unwrap();
//! assert!(reader.is_empty());
//! ```

mod errors;
mod reader;
mod serialization;

pub use crate::errors::{Amf0ScanError, Amf0SerializationError};
pub use crate::reader::Amf0Reader;
pub use crate::serialization::serialize;

/// The subset of AMF0 values that can be encoded for command payloads.
///
/// Object properties are kept in insertion order (and may repeat a name), since the order
/// properties appear on the wire matters to anything scanning them.
#[derive(PartialEq, Debug, Clone)]
pub enum Amf0Value {
    Number(f64),
    Boolean(bool),
    Utf8String(String),
    Object(Vec<(String, Amf0Value)>),
    Null,
}

pub mod markers {
    pub const NUMBER_MARKER: u8 = 0;
    pub const BOOLEAN_MARKER: u8 = 1;
    pub const STRING_MARKER: u8 = 2;
    pub const OBJECT_MARKER: u8 = 3;
    pub const NULL_MARKER: u8 = 5;
    pub const OBJECT_END_MARKER: u8 = 9;
    pub const UTF_8_EMPTY_MARKER: u16 = 0;
}
