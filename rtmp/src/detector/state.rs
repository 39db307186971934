use super::{Direction, RejectReason};
use crate::handshake::{HandshakeState, HandshakeTracker, PeerType};
use crate::messages::ConnectMetadata;

/// Everything the detector remembers about a single flow between packets
#[derive(Debug)]
pub struct RtmpFlowState {
    client: HandshakeTracker,
    server: HandshakeTracker,
    metadata: ConnectMetadata,
}

impl RtmpFlowState {
    pub fn new() -> RtmpFlowState {
        RtmpFlowState {
            client: HandshakeTracker::new(PeerType::Client),
            server: HandshakeTracker::new(PeerType::Server),
            metadata: ConnectMetadata::new(),
        }
    }

    pub fn client_state(&self) -> HandshakeState {
        self.client.state()
    }

    pub fn server_state(&self) -> HandshakeState {
        self.server.state()
    }

    pub fn client_bytes_left(&self) -> u16 {
        self.client.bytes_left()
    }

    pub fn server_bytes_left(&self) -> u16 {
        self.server.bytes_left()
    }

    /// Metadata captured from the connect command so far
    pub fn metadata(&self) -> &ConnectMetadata {
        &self.metadata
    }

    /// True once both peers have been watched for as long as they are of interest
    pub fn is_complete(&self) -> bool {
        self.client.is_done() && self.server.is_done()
    }

    /// Feeds bytes observed travelling in `direction` to that direction's tracker
    pub fn process_bytes(&mut self, direction: Direction, bytes: &[u8]) -> Result<(), RejectReason> {
        let result = match direction {
            Direction::FromInitiator => {
                self.client
                    .process_bytes(bytes, self.server.state(), &mut self.metadata)
            }

            Direction::FromResponder => {
                self.server
                    .process_bytes(bytes, self.client.state(), &mut self.metadata)
            }
        };

        result.map_err(|source| RejectReason::Handshake { direction, source })
    }

    /// Moves the captured metadata out of the state, leaving nothing captured behind
    pub fn take_metadata(&mut self) -> ConnectMetadata {
        std::mem::replace(&mut self.metadata, ConnectMetadata::new())
    }

    /// Releases anything captured so far
    pub fn discard_metadata(&mut self) {
        self.metadata.clear();
    }
}

impl Default for RtmpFlowState {
    fn default() -> Self {
        RtmpFlowState::new()
    }
}
