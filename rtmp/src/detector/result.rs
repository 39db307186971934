/// The result of handing a single packet to the detector
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ServiceResult {
    /// More packets are needed before the flow can be identified
    InProgress,

    /// The flow is not RTMP.  No more packets from it should be given to the detector.
    NoMatch,

    /// The flow was identified as RTMP
    Success,
}
