use super::{HandshakeState, PeerType};
use crate::messages::ConnectParseError;
use thiserror::Error;

/// Enumeration that represents the reasons an observed handshake is not a valid RTMP handshake
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The first byte sent by a peer was not RTMP version 3
    #[error("First byte of the handshake was {version} instead of 3")]
    BadVersionId { version: u8 },

    /// A peer started sending a handshake packet before the other peer had sent the packet it
    /// depends on.
    #[error("{peer:?} moved past {actual:?} while its peer was only at {peer_state:?} (needs {required:?})")]
    PeerNotReady {
        peer: PeerType,
        actual: HandshakeState,
        required: HandshakeState,
        peer_state: HandshakeState,
    },

    /// The client's first message after the handshake was not a readable connect command
    #[error("Client did not send a valid connect command: {0}")]
    ConnectCommand(#[from] ConnectParseError),
}
