use std::cmp::min;
use tracing::trace;
use crate::buffer::FixedBuf;
use crate::channel::Channel;
use crate::error::ErrorKind;
use crate::quota::SafeCast;
use crate::{ensure_channel, fail_channel};
use crate::transport::TransportReader;

impl Channel {
    /// Checks that an inbound DATA segment continues exactly where the previous one ended. The
    ///  transport is ordered and reliable, so any gap or overlap means that the peers are out
    ///  of sync.
    pub fn verify_sequence(&self, packet_seq: u64) -> anyhow::Result<()> {
        ensure_channel!(packet_seq == self.recv.seq(), ErrorKind::ProtocolViolation, self.channel_id(),
            "received segment with seq {}, expected {}", packet_seq, self.recv.seq());
        Ok(())
    }

    /// Pumps `byte_count` bytes of an inbound DATA segment's payload from the transport into the
    ///  application's byte target.
    ///
    /// The payload must fit into the receive window. If the transport has no more data right now,
    ///  this stops early and returns the number of bytes that were consumed - the caller is
    ///  expected to call again with the rest when the transport becomes readable.
    pub fn accept_inbound<R: TransportReader + ?Sized>(&mut self, reader: &mut R, byte_count: usize) -> anyhow::Result<usize> {
        let allowed = self.recv.window_remaining();
        ensure_channel!(byte_count.safe_cast() <= allowed, ErrorKind::ProtocolViolation, self.channel_id(),
            "received {} bytes, but the receive window permits only {}", byte_count, allowed);

        let mut remaining = byte_count;
        let mut total_read = 0;

        while remaining > 0 {
            let mut buf = match self.recv_target_buffer.take() {
                Some(buf) => buf,
                None => self.request_recv_buffer(remaining)?,
            };

            let read_limit = min(buf.remaining_capacity(), remaining);
            let read_result = reader.read(&mut buf.unfilled_mut()[..read_limit]);
            let num_read = match read_result {
                Ok(n) => n,
                Err(e) => {
                    self.recv_target_buffer = Some(buf);
                    return Err(e);
                }
            };
            ensure_channel!(num_read <= read_limit, ErrorKind::InternalInvariant, self.channel_id(),
                "transport reported reading {} bytes into a buffer of {} bytes", num_read, read_limit);

            buf.advance(num_read);
            self.recv.advance(num_read.safe_cast());
            remaining -= num_read;
            total_read += num_read;

            if buf.is_full() {
                trace!("channel {:?}: receive buffer of {} bytes is full", self.channel_id(), buf.len());
                self.endpoints.recv_completed(buf);
            }
            else {
                self.recv_target_buffer = Some(buf);
            }

            if num_read == 0 {
                trace!("channel {:?}: transport has no more data, {} of {} bytes pending", self.channel_id(), remaining, byte_count);
                break;
            }
        }

        Ok(total_read)
    }

    fn request_recv_buffer(&mut self, max_len: usize) -> anyhow::Result<FixedBuf> {
        let Some(buf) = self.endpoints.request_recv_buffer(max_len) else {
            fail_channel!(ErrorKind::InternalInvariant, self.channel_id(), "byte target provided no receive buffer");
        };

        ensure_channel!(buf.remaining_capacity() > 0, ErrorKind::InternalInvariant, self.channel_id(),
            "byte target provided a receive buffer that cannot take data");
        ensure_channel!(buf.remaining_capacity() <= max_len, ErrorKind::InternalInvariant, self.channel_id(),
            "byte target provided a receive buffer for {} bytes, but only {} were requested", buf.remaining_capacity(), max_len);

        trace!("channel {:?}: new receive buffer for {} bytes", self.channel_id(), buf.remaining_capacity());
        Ok(buf)
    }
}
