//! Passive tracking of one side of an RTMP handshake.
//!
//! An RTMP handshake consists of each peer sending a single version byte (C0/S0) followed by
//! two 1536 byte packets (C1/S1 and C2/S2).  The contents of the 1536 byte packets are not
//! validated, only counted, since an observer has no way to check the digest or echo without
//! seeing both sides perfectly in order.  What is checked is that neither peer sends its
//! second packet before receiving the other peer's first packet.

mod errors;

pub use self::errors::HandshakeError;

use crate::messages::{read_connect_message, ConnectMetadata};
use std::cmp::min;
use tracing::trace;

/// The only RTMP version this tracker accepts in C0/S0
pub const RTMP_VERSION: u8 = 3;

/// Size of the C1/S1 and C2/S2 handshake packets
pub const HANDSHAKE_PACKET_SIZE: u16 = 1536;

/// Progress of a single peer through the handshake.  States are ordered, so a peer is "at or
/// past" a state when it compares greater than or equal to it.
#[derive(Eq, PartialEq, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum HandshakeState {
    Init,
    SentHandshake0,
    SendingHandshake1,
    SentHandshake1,
    SendingHandshake2,
    SentHandshake2,

    /// Nothing more is of interest from this peer
    Done,
}

/// Which side of the connection a tracker is watching
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PeerType {
    Client,
    Server,
}

/// Consumes the bytes one peer sends during the handshake, which may arrive split across any
/// number of packets.
#[derive(Debug)]
pub struct HandshakeTracker {
    peer_type: PeerType,
    state: HandshakeState,
    bytes_left: u16,
}

impl HandshakeTracker {
    pub fn new(peer_type: PeerType) -> HandshakeTracker {
        HandshakeTracker {
            peer_type,
            state: HandshakeState::Init,
            bytes_left: 0,
        }
    }

    pub fn peer_type(&self) -> PeerType {
        self.peer_type
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Bytes still expected for the handshake packet currently being sent.  Only meaningful
    /// while in one of the `Sending` states.
    pub fn bytes_left(&self) -> u16 {
        self.bytes_left
    }

    pub fn is_done(&self) -> bool {
        self.state == HandshakeState::Done
    }

    /// Consumes all of `bytes`, advancing through as many states as the bytes allow.
    ///
    /// `peer_state` is the current state of the tracker watching the other direction.  Once the
    /// client's handshake is complete the bytes that follow are parsed as the connect command,
    /// with any captured values stored in `metadata`.  The connect command must arrive in the
    /// same call that its first byte does.
    pub fn process_bytes(
        &mut self,
        bytes: &[u8],
        peer_state: HandshakeState,
        metadata: &mut ConnectMetadata,
    ) -> Result<(), HandshakeError> {
        let mut input = bytes;

        loop {
            match self.state {
                HandshakeState::Init => {
                    let version = match input.first() {
                        Some(version) => *version,
                        None => return Ok(()),
                    };

                    // The server cannot respond before the client has started the handshake
                    if self.peer_type == PeerType::Server {
                        self.require_peer(peer_state, HandshakeState::SentHandshake0)?;
                    }

                    if version != RTMP_VERSION {
                        return Err(HandshakeError::BadVersionId { version });
                    }

                    input = &input[1..];
                    self.set_state(HandshakeState::SentHandshake0);
                }

                HandshakeState::SentHandshake0 => {
                    if input.is_empty() {
                        return Ok(());
                    }

                    self.start_packet(HandshakeState::SendingHandshake1);
                }

                HandshakeState::SendingHandshake1 => {
                    if !self.consume_packet(&mut input, HandshakeState::SentHandshake1) {
                        return Ok(());
                    }
                }

                HandshakeState::SentHandshake1 => {
                    if input.is_empty() {
                        return Ok(());
                    }

                    // C2 echoes S1 and S2 echoes C1, so neither can be sent early
                    self.require_peer(peer_state, HandshakeState::SentHandshake1)?;
                    self.start_packet(HandshakeState::SendingHandshake2);
                }

                HandshakeState::SendingHandshake2 => {
                    if !self.consume_packet(&mut input, HandshakeState::SentHandshake2) {
                        return Ok(());
                    }
                }

                HandshakeState::SentHandshake2 => match self.peer_type {
                    PeerType::Client => {
                        if input.is_empty() {
                            return Ok(());
                        }

                        read_connect_message(&mut input, metadata)?;
                        self.set_state(HandshakeState::Done);
                    }

                    PeerType::Server => self.set_state(HandshakeState::Done),
                },

                HandshakeState::Done => return Ok(()),
            }
        }
    }

    fn require_peer(
        &self,
        peer_state: HandshakeState,
        required: HandshakeState,
    ) -> Result<(), HandshakeError> {
        if peer_state < required {
            return Err(HandshakeError::PeerNotReady {
                peer: self.peer_type,
                actual: self.state,
                required,
                peer_state,
            });
        }

        Ok(())
    }

    fn start_packet(&mut self, sending_state: HandshakeState) {
        self.bytes_left = HANDSHAKE_PACKET_SIZE;
        self.set_state(sending_state);
    }

    /// Returns true once every byte of the current handshake packet has been consumed
    fn consume_packet(&mut self, input: &mut &[u8], sent_state: HandshakeState) -> bool {
        let count = min(input.len(), self.bytes_left as usize);
        *input = &input[count..];
        self.bytes_left -= count as u16;

        if self.bytes_left > 0 {
            trace!(
                peer = ?self.peer_type,
                bytes_left = self.bytes_left,
                "Handshake packet partially received"
            );

            return false;
        }

        self.set_state(sent_state);
        true
    }

    fn set_state(&mut self, state: HandshakeState) {
        trace!(peer = ?self.peer_type, from = ?self.state, to = ?state, "Handshake state changed");
        self.state = state;
    }
}
