//! Cursor style reader over a borrowed AMF0 encoded buffer

use crate::errors::Amf0ScanError;
use crate::markers;
use byteorder::{BigEndian, ByteOrder};

/// Walks AMF0 encoded bytes without copying them.
///
/// The reader only ever moves forward.  A failed read leaves the reader positioned where it
/// was before the read began, but callers scanning untrusted data are expected to abandon the
/// whole buffer on the first error.
pub struct Amf0Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Amf0Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Amf0Reader<'a> {
        Amf0Reader { bytes }
    }

    /// Number of bytes that have not been consumed yet
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the next `count` bytes without consuming them
    pub fn peek(&self, count: usize) -> Result<&'a [u8], Amf0ScanError> {
        if self.bytes.len() < count {
            return Err(Amf0ScanError::UnexpectedEof {
                needed: count,
                available: self.bytes.len(),
            });
        }

        Ok(&self.bytes[..count])
    }

    /// Consumes and returns the next `count` bytes
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], Amf0ScanError> {
        let taken = self.peek(count)?;
        self.bytes = &self.bytes[count..];
        Ok(taken)
    }

    pub fn read_u8(&mut self) -> Result<u8, Amf0ScanError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Amf0ScanError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    /// Consumes the next byte, requiring it to be the specified type marker
    pub fn expect_marker(&mut self, expected: u8) -> Result<(), Amf0ScanError> {
        let actual = self.peek(1)?[0];
        if actual != expected {
            return Err(Amf0ScanError::UnexpectedMarker { expected, actual });
        }

        self.bytes = &self.bytes[1..];
        Ok(())
    }

    /// Reads a string value (marker, 16 bit length, bytes) and returns its raw bytes.
    ///
    /// Zero length strings are rejected.
    pub fn read_string_bytes(&mut self) -> Result<&'a [u8], Amf0ScanError> {
        let header = self.peek(3)?;
        if header[0] != markers::STRING_MARKER {
            return Err(Amf0ScanError::UnexpectedMarker {
                expected: markers::STRING_MARKER,
                actual: header[0],
            });
        }

        let length = BigEndian::read_u16(&header[1..3]) as usize;
        if length == 0 {
            return Err(Amf0ScanError::EmptyString);
        }

        self.peek(3 + length)?;
        self.bytes = &self.bytes[3..];
        self.take(length)
    }

    /// Reads a string value into a newly owned `String`.
    ///
    /// AMF0 strings are nominally UTF-8, but captured traffic is not guaranteed to be, so
    /// invalid sequences are replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String, Amf0ScanError> {
        let bytes = self.read_string_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Skips over a single number, boolean or string value.  Any other value type is an error.
    pub fn skip_value(&mut self) -> Result<(), Amf0ScanError> {
        let marker = self.peek(1)?[0];
        let length = match marker {
            markers::NUMBER_MARKER => 1 + 8,
            markers::BOOLEAN_MARKER => 1 + 1,
            markers::STRING_MARKER => {
                let header = self.peek(3)?;
                3 + BigEndian::read_u16(&header[1..3]) as usize
            }

            x => return Err(Amf0ScanError::UnsupportedMarker { marker: x }),
        };

        self.take(length)?;
        Ok(())
    }
}
