//! The interfaces through which the detector talks to the engine hosting it, plus a simple
//! in-memory host.

use super::RtmpFlowState;
use crate::messages::ConnectMetadata;
use std::collections::HashMap;
use std::hash::Hash;

/// Well known TCP port for RTMP, for hosts that select flows by port
pub const RTMP_PORT: u16 = 1935;

/// Which peer sent a packet
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Direction {
    /// Sent by the peer that opened the connection (the RTMP client)
    FromInitiator,

    /// Sent by the peer that accepted the connection (the RTMP server)
    FromResponder,
}

/// Protocols the detector can identify
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum AppId {
    Rtmp,
}

/// A single packet's payload along with what the host knows about it
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    pub data: &'a [u8],
    pub direction: Direction,

    /// Number of packets the host has seen on this flow, including this one
    pub session_packet_count: u32,
}

/// HTTP-like session attributes the host tracks per flow, which RTMP metadata is published to
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct HttpSessionMetadata {
    pub url: Option<String>,
    pub referer: Option<String>,

    /// Raised when `url` was set and should be scanned for further application hints
    pub scan_host_url: bool,
}

/// Per-flow storage of detector state
pub trait FlowStore<K> {
    fn get_state(&mut self, flow: &K) -> Option<&mut RtmpFlowState>;

    /// Attaches a new state to the flow.  The state is dropped along with the flow.
    fn create_and_attach_state(&mut self, flow: &K, state: RtmpFlowState) -> &mut RtmpFlowState;
}

/// Receives the detector's verdict for every packet
pub trait OutcomeReporter<K> {
    fn mark_in_progress(&mut self, flow: &K, packet: &Packet<'_>);
    fn mark_failed(&mut self, flow: &K, packet: &Packet<'_>);
    fn mark_success(
        &mut self,
        flow: &K,
        packet: &Packet<'_>,
        app_id: AppId,
        metadata: &ConnectMetadata,
    );
}

/// Access to the flow's HTTP-like session record
pub trait SessionMetadataSink<K> {
    /// Returns the flow's session record, creating an empty one if it has none yet
    fn http_session(&mut self, flow: &K) -> &mut HttpSessionMetadata;
}

/// The last verdict reported for a flow
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum FlowOutcome {
    InProgress,
    Failed,
    Identified {
        app_id: AppId,
        metadata: ConnectMetadata,
    },
}

/// Everything a `FlowTable` holds for one flow
#[derive(Debug, Default)]
pub struct FlowEntry {
    pub state: Option<RtmpFlowState>,
    pub http_session: Option<HttpSessionMetadata>,
    pub outcome: Option<FlowOutcome>,
}

/// A `HashMap` backed host keeping every flow in memory until it is removed
pub struct FlowTable<K> {
    flows: HashMap<K, FlowEntry>,
}

impl<K: Hash + Eq + Clone> FlowTable<K> {
    pub fn new() -> FlowTable<K> {
        FlowTable {
            flows: HashMap::new(),
        }
    }

    pub fn get(&self, flow: &K) -> Option<&FlowEntry> {
        self.flows.get(flow)
    }

    pub fn outcome(&self, flow: &K) -> Option<&FlowOutcome> {
        self.flows.get(flow).and_then(|entry| entry.outcome.as_ref())
    }

    /// Forgets a flow, releasing its detector state and session record
    pub fn remove(&mut self, flow: &K) -> Option<FlowEntry> {
        self.flows.remove(flow)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    fn entry(&mut self, flow: &K) -> &mut FlowEntry {
        self.flows.entry(flow.clone()).or_insert_with(FlowEntry::default)
    }
}

impl<K: Hash + Eq + Clone> Default for FlowTable<K> {
    fn default() -> Self {
        FlowTable::new()
    }
}

impl<K: Hash + Eq + Clone> FlowStore<K> for FlowTable<K> {
    fn get_state(&mut self, flow: &K) -> Option<&mut RtmpFlowState> {
        self.flows
            .get_mut(flow)
            .and_then(|entry| entry.state.as_mut())
    }

    fn create_and_attach_state(&mut self, flow: &K, state: RtmpFlowState) -> &mut RtmpFlowState {
        self.entry(flow).state.insert(state)
    }
}

impl<K: Hash + Eq + Clone> OutcomeReporter<K> for FlowTable<K> {
    fn mark_in_progress(&mut self, flow: &K, _packet: &Packet<'_>) {
        self.entry(flow).outcome = Some(FlowOutcome::InProgress);
    }

    fn mark_failed(&mut self, flow: &K, _packet: &Packet<'_>) {
        self.entry(flow).outcome = Some(FlowOutcome::Failed);
    }

    fn mark_success(
        &mut self,
        flow: &K,
        _packet: &Packet<'_>,
        app_id: AppId,
        metadata: &ConnectMetadata,
    ) {
        self.entry(flow).outcome = Some(FlowOutcome::Identified {
            app_id,
            metadata: metadata.clone(),
        });
    }
}

impl<K: Hash + Eq + Clone> SessionMetadataSink<K> for FlowTable<K> {
    fn http_session(&mut self, flow: &K) -> &mut HttpSessionMetadata {
        self.entry(flow)
            .http_session
            .get_or_insert_with(HttpSessionMetadata::default)
    }
}
