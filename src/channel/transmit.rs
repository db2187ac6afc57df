use std::cmp::min;
use tracing::{debug, trace};
use crate::buffer::FixedBuf;
use crate::channel::Channel;
use crate::ensure_channel;
use crate::error::ErrorKind;
use crate::quota::{bounded_by, PrecheckedCast, SafeCast};
use crate::segment::{DataSegment, DataSegmentHeader, SegmentKind};

impl Channel {
    /// Called by the multiplexer when it is ready to send a DATA segment for this channel.
    ///
    /// The payload is taken from the byte source and bounded by the application's transmit quota,
    ///  the peer's window, and `max_payload_len`. Returns `None` if there is nothing to send,
    ///  which is not an error: the multiplexer may pull a channel with stale scheduling requests.
    ///
    /// If there is more data to send after this segment, the channel requests to be scheduled again.
    pub fn produce_outbound(&mut self, max_payload_len: usize) -> anyhow::Result<Option<DataSegment>> {
        let Some(channel_id) = self.channel_id() else {
            debug!("inactive channel pulled for data - ignoring");
            return Ok(None);
        };

        // the payload length must fit into the segment header
        let max_payload_len = min(max_payload_len, u32::MAX as usize);
        let requested = bounded_by(self.xmit.available(), max_payload_len);
        if requested == 0 {
            debug!("channel {}: pulled for data, but nothing can be sent (quota {}, window {}, max payload {})",
                channel_id, self.xmit.quota_remaining(), self.xmit.window_remaining(), max_payload_len);
            return Ok(None);
        }

        let payload = self.endpoints.request_xmit_buffer(requested);
        ensure_channel!(!payload.is_empty(), ErrorKind::InternalInvariant, Some(channel_id),
            "byte source provided no data although {} bytes were requested", requested);
        ensure_channel!(payload.len() <= requested, ErrorKind::InternalInvariant, Some(channel_id),
            "byte source provided {} bytes, but only {} were requested", payload.len(), requested);

        let header = DataSegmentHeader {
            channel_id,
            seq: self.xmit.seq(),
            payload_len: payload.len().prechecked_cast(),
        };
        self.xmit.advance(payload.len().safe_cast());
        trace!("channel {}: sending {} bytes at seq {}", channel_id, header.payload_len, header.seq);

        if self.xmit.available() > 0 {
            self.request_scheduling(SegmentKind::Data);
        }

        Ok(Some(DataSegment { header, payload }))
    }

    /// Called by the multiplexer after a DATA segment's payload was written to the transport
    pub fn segment_transmitted(&mut self, payload: FixedBuf) {
        trace!("channel {:?}: {} bytes transmitted", self.channel_id(), payload.len());
        self.endpoints.xmit_completed(payload);
    }
}
