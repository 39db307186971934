use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use rand::Rng;
use rml_amf0_scan::{serialize, Amf0Value};

pub const CONNECT_CSID: u8 = 3;

pub fn random_bytes(count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}

pub fn string(value: &str) -> Amf0Value {
    Amf0Value::Utf8String(value.to_string())
}

/// AMF0 body of a command message with the specified name and command object properties
pub fn command_body(command_name: &str, properties: Vec<(&str, Amf0Value)>) -> Vec<u8> {
    let properties = properties
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

    serialize(&[
        string(command_name),
        Amf0Value::Number(1.0),
        Amf0Value::Object(properties),
    ])
    .unwrap()
}

/// Splits a message body into 128 byte chunks behind a type 0 header
pub fn chunk_message(type_id: u8, csid: u8, body: &[u8]) -> Vec<u8> {
    let mut bytes = vec![csid];
    bytes.write_u24::<BigEndian>(0).unwrap();
    bytes.write_u24::<BigEndian>(body.len() as u32).unwrap();
    bytes.write_u8(type_id).unwrap();
    bytes.write_u32::<LittleEndian>(0).unwrap();

    for (index, chunk) in body.chunks(128).enumerate() {
        if index > 0 {
            bytes.push(0b11_000000 | csid);
        }

        bytes.extend_from_slice(chunk);
    }

    bytes
}

/// A typical connect command, large enough to span multiple chunks
pub fn connect_message(swf_url: &str, page_url: &str) -> Vec<u8> {
    let body = command_body(
        "connect",
        vec![
            ("app", string("live")),
            ("flashVer", string("WIN 11,1,102,55")),
            ("swfUrl", string(swf_url)),
            ("tcUrl", string("rtmp://media.example.com:1935/live")),
            ("fpad", Amf0Value::Boolean(false)),
            ("capabilities", Amf0Value::Number(239.0)),
            ("audioCodecs", Amf0Value::Number(3575.0)),
            ("videoCodecs", Amf0Value::Number(252.0)),
            ("videoFunction", Amf0Value::Number(1.0)),
            ("pageUrl", string(page_url)),
            ("objectEncoding", Amf0Value::Number(0.0)),
        ],
    );

    chunk_message(20, CONNECT_CSID, &body)
}
