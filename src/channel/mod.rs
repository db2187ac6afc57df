//! A single channel of the multiplexed connection, i.e. its flow control state in both directions
//!  and the glue between the application's byte target / source and the multiplexer.

mod flow;
mod receive;
mod transmit;

pub use flow::FlowCounters;

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use tracing::{debug, trace};
use crate::buffer::FixedBuf;
use crate::endpoint::{ChannelBinding, ChannelEndpoints};
use crate::ensure_channel;
use crate::error::ErrorKind;
use crate::scheduler::{ChannelScheduler, SchedulingRequest};
use crate::segment::{ArmSegment, SegmentKind};

enum Activation {
    Inactive,
    Active {
        channel_id: u32,
        scheduler: Arc<dyn ChannelScheduler>,
    },
}

pub struct Channel {
    priority: u32,
    activation: Activation,
    endpoints: ChannelEndpoints,

    recv: FlowCounters,
    xmit: FlowCounters,

    /// The local receive window changed since it was last advertised to the peer. This starts
    ///  out as `true` so the peer learns the initial window right after activation.
    recv_arm_pending: bool,

    /// The target buffer that is currently being filled. It is requested from the byte target
    ///  when data arrives and handed back as soon as it is full, so a partially filled buffer
    ///  is retained across segments.
    recv_target_buffer: Option<FixedBuf>,
}

impl Channel {
    pub fn new(priority: u32, endpoints: ChannelEndpoints) -> Channel {
        Channel {
            priority,
            activation: Activation::Inactive,
            endpoints,
            recv: FlowCounters::default(),
            xmit: FlowCounters::default(),
            recv_arm_pending: true,
            recv_target_buffer: None,
        }
    }

    /// Called by the multiplexer when the channel is registered with it. This assigns the
    ///  channel's id, binds the application's target and source, and requests the initial
    ///  window advertisement.
    pub fn activate(&mut self, scheduler: Arc<dyn ChannelScheduler>, channel_id: u32) -> anyhow::Result<()> {
        ensure_channel!(!self.is_active(), ErrorKind::Configuration, self.channel_id(),
            "channel is already active, cannot activate it as channel {}", channel_id);
        ensure_channel!(self.priority < scheduler.priority_count(), ErrorKind::Configuration, Some(channel_id),
            "priority must be below {}, but is {}", scheduler.priority_count(), self.priority);

        debug!("activating channel {} with priority {}", channel_id, self.priority);
        self.activation = Activation::Active { channel_id, scheduler };

        self.endpoints.bind(ChannelBinding {
            channel_id,
            priority: self.priority,
        });

        self.request_scheduling(SegmentKind::Arm);
        if self.xmit.available() > 0 {
            self.request_scheduling(SegmentKind::Data);
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.activation, Activation::Active { .. })
    }

    /// `None` until the channel is activated
    pub fn channel_id(&self) -> Option<u32> {
        match &self.activation {
            Activation::Inactive => None,
            Activation::Active { channel_id, .. } => Some(*channel_id),
        }
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    fn request_scheduling(&self, kind: SegmentKind) {
        match &self.activation {
            Activation::Inactive => {
                trace!("channel is not active yet - not requesting {:?} scheduling", kind);
            }
            Activation::Active { channel_id, scheduler } => {
                scheduler.request_scheduling(SchedulingRequest {
                    channel_id: *channel_id,
                    priority: self.priority,
                    kind,
                });
            }
        }
    }

    /// Raises the application's transmit limit to a new cumulative value. Values that do not
    ///  exceed the current limit are ignored.
    pub fn grant_transmit_quota(&mut self, new_limit: u64) {
        let added = self.xmit.raise_limit_to(new_limit);
        if added > 0 {
            debug!("channel {:?}: transmit limit raised by {} to {}", self.channel_id(), added, self.xmit.limit());
            self.request_scheduling(SegmentKind::Data);
        }
    }

    pub fn add_transmit_quota(&mut self, added: u64) {
        self.grant_transmit_quota(self.xmit.limit().saturating_add(added));
    }

    /// Grants `added` more bytes of receive quota, which opens the receive window by the same
    ///  amount and schedules advertising it to the peer.
    pub fn grant_receive_quota(&mut self, added: u64) {
        self.recv.add_limit(added);
        self.recv.add_arm(added);
        self.recv_arm_pending = true;

        debug!("channel {:?}: receive limit raised by {} to {}", self.channel_id(), added, self.recv.limit());
        self.request_scheduling(SegmentKind::Arm);
    }

    /// Raises the receive limit to a new cumulative value. Values that do not exceed the current
    ///  limit are ignored.
    pub fn set_receive_limit(&mut self, new_limit: u64) {
        let added = crate::quota::delta(new_limit, self.recv.limit());
        if added > 0 {
            self.grant_receive_quota(added);
        }
    }

    /// Application hint that the byte source may have new data
    pub fn request_transmit(&self) {
        if self.xmit.available() > 0 {
            self.request_scheduling(SegmentKind::Data);
        }
    }

    /// Handles the peer's advertisement of its receive window, i.e. this channel's transmit window.
    ///
    /// The advertised arm is adopted as it is, even if it is below the current one. An arm below
    ///  `xmit_seq` simply leaves no window until the peer advertises a higher one.
    pub fn remote_window_update(&mut self, new_arm: u64) {
        // compared against the old arm, so this must happen before adopting the new one
        if new_arm != self.xmit.arm() && self.xmit.quota_remaining() > 0 {
            self.request_scheduling(SegmentKind::Data);
        }
        let previous = self.xmit.set_arm(new_arm);
        trace!("channel {:?}: transmit window moved from {} to {}", self.channel_id(), previous, new_arm);
    }

    /// Called by the multiplexer when it is ready to send a control segment for this channel.
    ///  Returns the pending window advertisement if there is one and it fits into
    ///  `max_header_len` bytes.
    pub fn pull_control(&mut self, max_header_len: usize) -> Option<ArmSegment> {
        let channel_id = self.channel_id()?;

        if !self.recv_arm_pending {
            trace!("channel {}: no window advertisement pending", channel_id);
            return None;
        }
        if max_header_len < ArmSegment::MAX_SERIALIZED_LEN {
            debug!("channel {}: no room for a window advertisement ({} bytes)", channel_id, max_header_len);
            return None;
        }

        self.recv_arm_pending = false;
        trace!("channel {}: advertising receive window {}", channel_id, self.recv.arm());
        Some(ArmSegment {
            channel_id,
            arm: self.recv.arm(),
        })
    }

    pub fn arm_pending(&self) -> bool {
        self.recv_arm_pending
    }

    pub fn recv_counters(&self) -> &FlowCounters {
        &self.recv
    }

    pub fn xmit_counters(&self) -> &FlowCounters {
        &self.xmit
    }

    pub fn recv_seq(&self) -> u64 {
        self.recv.seq()
    }

    pub fn recv_arm(&self) -> u64 {
        self.recv.arm()
    }

    pub fn recv_limit(&self) -> u64 {
        self.recv.limit()
    }

    pub fn recv_position(&self) -> u64 {
        self.recv.position()
    }

    pub fn recv_remaining(&self) -> u64 {
        self.recv.quota_remaining()
    }

    pub fn xmit_seq(&self) -> u64 {
        self.xmit.seq()
    }

    pub fn xmit_arm(&self) -> u64 {
        self.xmit.arm()
    }

    pub fn xmit_limit(&self) -> u64 {
        self.xmit.limit()
    }

    pub fn xmit_position(&self) -> u64 {
        self.xmit.position()
    }

    pub fn xmit_remaining(&self) -> u64 {
        self.xmit.quota_remaining()
    }

    pub fn xmit_remaining_by_remote(&self) -> u64 {
        self.xmit.window_remaining()
    }

    pub fn holds_recv_buffer(&self) -> bool {
        self.recv_target_buffer.is_some()
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.channel_id() {
            Some(id) => write!(f, "Channel[{} recv {} / xmit {}]", id, self.recv, self.xmit),
            None => write!(f, "Channel[inactive recv {} / xmit {}]", self.recv, self.xmit),
        }
    }
}

impl Debug for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
