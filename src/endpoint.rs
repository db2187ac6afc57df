//! The application side of a channel: a byte *target* that received data is written to, and a
//!  byte *source* that data to be sent is taken from.
//!
//! Buffers move by value. A target lends a buffer to the channel, which fills it across as many
//!  inbound segments as necessary and hands it back once it is full. A source hands over a filled
//!  buffer per outbound segment and gets it back after the segment was written to the transport.

use crate::buffer::FixedBuf;

/// Identifies the channel an application object was bound to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelBinding {
    pub channel_id: u32,
    pub priority: u32,
}

pub trait ChannelBound {
    /// Called once when the channel is activated
    fn bind(&mut self, binding: ChannelBinding);
}

pub trait RecvByteTarget: ChannelBound {
    /// Returns an empty or partially filled buffer that can take between 1 and `max_len` bytes.
    ///  Returning `None` or a buffer with no or too much remaining capacity is a contract
    ///  violation that fails the channel.
    fn request_recv_buffer(&mut self, max_len: usize) -> Option<FixedBuf>;

    /// Hands back a buffer after it was filled completely. The target may process the data
    ///  right away or pass it on, but it must be ready to provide another buffer afterwards.
    fn recv_completed(&mut self, buf: FixedBuf);
}

pub trait XmitByteSource: ChannelBound {
    /// Returns a buffer with between 1 and `max_len` bytes of data to be sent. This is only
    ///  called while the application's transmit quota is not used up, so there must be data
    ///  available: a buffer that is empty or contains too much data is a contract violation that
    ///  fails the channel.
    fn request_xmit_buffer(&mut self, max_len: usize) -> FixedBuf;

    /// Hands back a buffer after its contents were written to the transport, e.g. for reuse
    fn xmit_completed(&mut self, buf: FixedBuf);
}

/// A single application object acting as both target and source of a channel
pub trait ChannelUser: RecvByteTarget + XmitByteSource {}
impl<T: RecvByteTarget + XmitByteSource> ChannelUser for T {}

pub enum ChannelEndpoints {
    Separate {
        target: Box<dyn RecvByteTarget + Send>,
        source: Box<dyn XmitByteSource + Send>,
    },
    /// target and source are the same object, which is bound only once
    Shared(Box<dyn ChannelUser + Send>),
}

impl ChannelEndpoints {
    pub fn separate(target: impl RecvByteTarget + Send + 'static, source: impl XmitByteSource + Send + 'static) -> ChannelEndpoints {
        ChannelEndpoints::Separate {
            target: Box::new(target),
            source: Box::new(source),
        }
    }

    pub fn shared(user: impl ChannelUser + Send + 'static) -> ChannelEndpoints {
        ChannelEndpoints::Shared(Box::new(user))
    }

    pub(crate) fn bind(&mut self, binding: ChannelBinding) {
        match self {
            ChannelEndpoints::Separate { target, source } => {
                target.bind(binding);
                source.bind(binding);
            }
            ChannelEndpoints::Shared(user) => {
                user.bind(binding);
            }
        }
    }

    pub(crate) fn request_recv_buffer(&mut self, max_len: usize) -> Option<FixedBuf> {
        match self {
            ChannelEndpoints::Separate { target, .. } => target.request_recv_buffer(max_len),
            ChannelEndpoints::Shared(user) => user.request_recv_buffer(max_len),
        }
    }

    pub(crate) fn recv_completed(&mut self, buf: FixedBuf) {
        match self {
            ChannelEndpoints::Separate { target, .. } => target.recv_completed(buf),
            ChannelEndpoints::Shared(user) => user.recv_completed(buf),
        }
    }

    pub(crate) fn request_xmit_buffer(&mut self, max_len: usize) -> FixedBuf {
        match self {
            ChannelEndpoints::Separate { source, .. } => source.request_xmit_buffer(max_len),
            ChannelEndpoints::Shared(user) => user.request_xmit_buffer(max_len),
        }
    }

    pub(crate) fn xmit_completed(&mut self, buf: FixedBuf) {
        match self {
            ChannelEndpoints::Separate { source, .. } => source.xmit_completed(buf),
            ChannelEndpoints::Shared(user) => user.xmit_completed(buf),
        }
    }
}
