use anyhow::bail;

pub struct MuxConfig {
    /// The number of distinct priority levels the multiplexer schedules. Channels have a priority
    ///  in `0..priority_count`, lower values being scheduled first.
    pub priority_count: u32,

    /// This is the maximum payload length of a single DATA segment. Longer transfers are split
    ///  into several segments, giving other channels a chance to interleave their segments.
    ///
    /// A small value improves latency for high-priority channels, a large value reduces the
    ///  per-segment overhead.
    pub max_payload_len: usize,
}

impl MuxConfig {
    /// defaults for a multiplexer on top of a TCP connection with a regular Ethernet MTU
    pub fn default_tcp() -> MuxConfig {
        MuxConfig {
            priority_count: 4,
            max_payload_len: 1400,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.priority_count == 0 {
            bail!("there must be at least one priority level");
        }
        if self.max_payload_len == 0 {
            bail!("maximum payload length must be positive");
        }
        if u32::try_from(self.max_payload_len).is_err() {
            bail!("maximum payload length {} does not fit into a segment header", self.max_payload_len);
        }

        Ok(())
    }
}
