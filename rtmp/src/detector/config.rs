/// The configuration options that govern how RTMP flows are identified
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Number of packets a flow may be observed for without being identified before it is
    /// rejected
    pub max_packets: u32,

    /// When set the `pageUrl` of a connect command is never published as the session's referer
    pub referrer_capture_disabled: bool,
}

impl DetectorConfig {
    /// Creates a new detector config with overridable defaults
    pub fn new() -> DetectorConfig {
        DetectorConfig {
            max_packets: 15,
            referrer_capture_disabled: false,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig::new()
    }
}
