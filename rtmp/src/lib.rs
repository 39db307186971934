//! Passive identification of RTMP flows.
//!
//! This crate watches the bytes travelling in both directions of a TCP connection and decides
//! whether the connection is RTMP, without taking part in the conversation.  It follows both
//! sides of the RTMP handshake, then reads the client's `connect` command to capture the
//! `swfUrl` and `pageUrl` the client reported.
//!
//! The entry point is [`detector::RtmpDetector`].  The lower level modules are exposed for
//! hosts that want to reuse the individual parsers.

#[cfg(test)]
mod test_utils;

pub mod chunk_io;
pub mod detector;
pub mod handshake;
pub mod messages;
