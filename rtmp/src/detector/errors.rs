use super::Direction;
use crate::handshake::HandshakeError;
use thiserror::Error;

/// The reason a flow was determined to not be RTMP
#[derive(Debug, Error)]
pub enum RejectReason {
    /// The bytes seen in one direction did not follow the RTMP handshake
    #[error("Invalid {direction:?} traffic: {source}")]
    Handshake {
        direction: Direction,
        #[source]
        source: HandshakeError,
    },

    /// The flow was watched for the maximum number of packets without being identified
    #[error("Flow not identified after {count} packets (limit {max})")]
    PacketLimitExceeded { count: u32, max: u32 },
}
