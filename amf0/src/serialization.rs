//! Module contains functionality for serializing values into
//! bytes based on the AMF0 specification
//! (http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/amf/pdf/amf0-file-format-specification.pdf)

use crate::errors::Amf0SerializationError;
use crate::markers;
use crate::Amf0Value;
use byteorder::{BigEndian, WriteBytesExt};

/// Serializes values into an amf0 encoded vector of bytes
pub fn serialize(values: &[Amf0Value]) -> Result<Vec<u8>, Amf0SerializationError> {
    let mut bytes = vec![];
    for value in values {
        serialize_value(value, &mut bytes)?;
    }

    Ok(bytes)
}

fn serialize_value(value: &Amf0Value, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    match *value {
        Amf0Value::Boolean(val) => Ok(serialize_bool(val, bytes)),
        Amf0Value::Null => Ok(serialize_null(bytes)),
        Amf0Value::Number(val) => serialize_number(val, bytes),
        Amf0Value::Utf8String(ref val) => serialize_string(val, bytes),
        Amf0Value::Object(ref val) => serialize_object(val, bytes),
    }
}

fn serialize_number(value: f64, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    bytes.push(markers::NUMBER_MARKER);
    bytes.write_f64::<BigEndian>(value)?;
    Ok(())
}

fn serialize_bool(value: bool, bytes: &mut Vec<u8>) {
    bytes.push(markers::BOOLEAN_MARKER);
    bytes.push(value as u8);
}

fn serialize_string(value: &str, bytes: &mut Vec<u8>) -> Result<(), Amf0SerializationError> {
    if value.len() > (u16::max_value() as usize) {
        return Err(Amf0SerializationError::NormalStringTooLong);
    }

    bytes.push(markers::STRING_MARKER);
    bytes.write_u16::<BigEndian>(value.len() as u16)?;
    bytes.extend(value.as_bytes());
    Ok(())
}

fn serialize_null(bytes: &mut Vec<u8>) {
    bytes.push(markers::NULL_MARKER);
}

fn serialize_object(
    properties: &[(String, Amf0Value)],
    bytes: &mut Vec<u8>,
) -> Result<(), Amf0SerializationError> {
    bytes.push(markers::OBJECT_MARKER);

    for (name, value) in properties {
        if name.len() > (u16::max_value() as usize) {
            return Err(Amf0SerializationError::PropertyNameTooLong);
        }

        bytes.write_u16::<BigEndian>(name.len() as u16)?;
        bytes.extend(name.as_bytes());
        serialize_value(value, bytes)?;
    }

    bytes.write_u16::<BigEndian>(markers::UTF_8_EMPTY_MARKER)?;
    bytes.push(markers::OBJECT_END_MARKER);
    Ok(())
}
