//! Identifies RTMP flows from the bytes observed in each direction.
//!
//! The host hands every packet of a candidate flow to [`RtmpDetector::validate`], in the order
//! the packets were observed within each direction.  The detector tracks both sides of the
//! handshake, reads the client's connect command, and reports whether the flow is RTMP.
//!
//! # Examples
//! ```
//! use rml_rtmp_probe::detector::{Direction, DetectorConfig, FlowTable, Packet, RtmpDetector, ServiceResult};
//!
//! let detector = RtmpDetector::new(DetectorConfig::new());
//! let mut flows = FlowTable::new();
//!
//! let packet = Packet {
//!     data: &[3],
//!     direction: Direction::FromInitiator,
//!     session_packet_count: 1,
//! };
//!
//! assert_eq!(detector.validate(&mut flows, &"flow-1", &packet), ServiceResult::InProgress);
//! ```

mod config;
mod errors;
mod host;
mod result;
mod state;

#[cfg(test)]
mod tests;

pub use self::config::DetectorConfig;
pub use self::errors::RejectReason;
pub use self::host::{
    AppId, Direction, FlowEntry, FlowOutcome, FlowStore, FlowTable, HttpSessionMetadata,
    OutcomeReporter, Packet, SessionMetadataSink, RTMP_PORT,
};
pub use self::result::ServiceResult;
pub use self::state::RtmpFlowState;

use crate::messages::ConnectMetadata;
use tracing::{debug, trace};

enum Evaluation {
    InProgress,
    Rejected(RejectReason),
    Identified(ConnectMetadata),
}

/// Decides whether flows are RTMP, one packet at a time
pub struct RtmpDetector {
    config: DetectorConfig,
}

impl RtmpDetector {
    pub fn new(config: DetectorConfig) -> RtmpDetector {
        RtmpDetector { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Processes one packet of `flow`, reports the verdict to the host, and returns it.
    ///
    /// A packet with no payload is valid and only re-checks the packet limit.  Once a flow has
    /// been rejected or identified the host should stop passing its packets in.
    pub fn validate<K, H>(&self, host: &mut H, flow: &K, packet: &Packet<'_>) -> ServiceResult
    where
        H: FlowStore<K> + OutcomeReporter<K> + SessionMetadataSink<K>,
    {
        let evaluation = match host.get_state(flow) {
            Some(state) => self.evaluate(state, packet),
            None => {
                debug!("Tracking new candidate RTMP flow");
                let state = host.create_and_attach_state(flow, RtmpFlowState::new());
                self.evaluate(state, packet)
            }
        };

        match evaluation {
            Evaluation::InProgress => {
                host.mark_in_progress(flow, packet);
                ServiceResult::InProgress
            }

            Evaluation::Rejected(reason) => {
                debug!(reason = %reason, "Flow is not RTMP");
                host.mark_failed(flow, packet);
                ServiceResult::NoMatch
            }

            Evaluation::Identified(metadata) => {
                debug!(
                    swf_url = ?metadata.swf_url,
                    page_url = ?metadata.page_url,
                    "Flow identified as RTMP"
                );

                host.mark_success(flow, packet, AppId::Rtmp, &metadata);
                if !metadata.is_empty() {
                    self.publish_metadata(host.http_session(flow), metadata);
                }

                ServiceResult::Success
            }
        }
    }

    fn evaluate(&self, state: &mut RtmpFlowState, packet: &Packet<'_>) -> Evaluation {
        if let Err(reason) = state.process_bytes(packet.direction, packet.data) {
            state.discard_metadata();
            return Evaluation::Rejected(reason);
        }

        if state.is_complete() {
            return Evaluation::Identified(state.take_metadata());
        }

        if packet.session_packet_count >= self.config.max_packets {
            state.discard_metadata();
            return Evaluation::Rejected(RejectReason::PacketLimitExceeded {
                count: packet.session_packet_count,
                max: self.config.max_packets,
            });
        }

        trace!(
            client_state = ?state.client_state(),
            server_state = ?state.server_state(),
            "Flow still in progress"
        );

        Evaluation::InProgress
    }

    /// Moves captured values into the session record.  A field that already holds a value is
    /// left alone and the captured value is dropped.
    fn publish_metadata(&self, session: &mut HttpSessionMetadata, metadata: ConnectMetadata) {
        let ConnectMetadata { swf_url, page_url } = metadata;

        if let Some(swf_url) = swf_url {
            if session.url.is_none() {
                session.url = Some(swf_url);
                session.scan_host_url = true;
            } else {
                trace!("Session already has a url, discarding swfUrl");
            }
        }

        if let Some(page_url) = page_url {
            if !self.config.referrer_capture_disabled && session.referer.is_none() {
                session.referer = Some(page_url);
            } else {
                trace!("Referer capture disabled or already set, discarding pageUrl");
            }
        }
    }
}
