//! Two channels wired back to back through an in-memory byte stream, driven by a minimal
//!  multiplexer loop that uses nothing but the crate's public API.

use std::sync::{Arc, Mutex};
use bytes::BytesMut;
use chanflow::buffer::FixedBuf;
use chanflow::channel::Channel;
use chanflow::config::MuxConfig;
use chanflow::endpoint::{ChannelBinding, ChannelBound, ChannelEndpoints, RecvByteTarget, XmitByteSource};
use chanflow::error::{ChannelError, ErrorKind};
use chanflow::scheduler::SchedulingQueue;
use chanflow::segment::{ArmSegment, DataSegmentHeader, SegmentHeader, SegmentKind};
use tracing::Level;

#[ctor::ctor]
fn init_test_logging() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init()
        .ok();
}

#[derive(Clone, Default)]
struct Collector {
    received: Arc<Mutex<Vec<u8>>>,
}
impl ChannelBound for Collector {
    fn bind(&mut self, _binding: ChannelBinding) {}
}
impl RecvByteTarget for Collector {
    fn request_recv_buffer(&mut self, max_len: usize) -> Option<FixedBuf> {
        Some(FixedBuf::new(max_len.min(16)))
    }

    fn recv_completed(&mut self, buf: FixedBuf) {
        self.received.lock().unwrap().extend_from_slice(buf.as_ref());
    }
}

struct Pattern {
    next: usize,
    len: usize,
}
impl ChannelBound for Pattern {
    fn bind(&mut self, _binding: ChannelBinding) {}
}
impl XmitByteSource for Pattern {
    fn request_xmit_buffer(&mut self, max_len: usize) -> FixedBuf {
        let n = max_len.min(self.len - self.next);
        let chunk = (self.next..self.next + n)
            .map(|i| i as u8)
            .collect::<Vec<_>>();
        self.next += n;
        FixedBuf::from_slice(&chunk)
    }

    fn xmit_completed(&mut self, _buf: FixedBuf) {}
}

struct Side {
    channel: Channel,
    queue: Arc<SchedulingQueue>,
    config: MuxConfig,
}

impl Side {
    fn new(endpoints: ChannelEndpoints, config: MuxConfig) -> Side {
        let queue = Arc::new(SchedulingQueue::new(&config).unwrap());
        let mut channel = Channel::new(1, endpoints);
        channel.activate(queue.clone(), 9).unwrap();
        Side { channel, queue, config }
    }

    /// pulls every segment this side has scheduled and writes it to the wire
    fn flush(&mut self, wire: &mut BytesMut) -> anyhow::Result<()> {
        while let Some(request) = self.queue.next_request() {
            assert_eq!(request.channel_id, 9);
            match request.kind {
                SegmentKind::Arm => {
                    if let Some(arm) = self.channel.pull_control(ArmSegment::MAX_SERIALIZED_LEN) {
                        SegmentHeader::Arm(arm).ser(wire);
                    }
                }
                SegmentKind::Data => {
                    if let Some(segment) = self.channel.produce_outbound(self.config.max_payload_len)? {
                        SegmentHeader::Data(segment.header).ser(wire);
                        wire.extend_from_slice(segment.payload.as_ref());
                        self.channel.segment_transmitted(segment.payload);
                    }
                }
            }
        }
        Ok(())
    }

    /// consumes everything on the wire
    fn dispatch(&mut self, wire: &[u8]) -> anyhow::Result<()> {
        let mut wire = wire;
        while !wire.is_empty() {
            match SegmentHeader::deser(&mut wire)? {
                SegmentHeader::Arm(arm) => {
                    self.channel.remote_window_update(arm.arm);
                }
                SegmentHeader::Data(header) => {
                    self.channel.verify_sequence(header.seq)?;
                    let consumed = self.channel.accept_inbound(&mut wire, header.payload_len as usize)?;
                    assert_eq!(consumed, header.payload_len as usize);
                }
            }
        }
        Ok(())
    }
}

fn config() -> MuxConfig {
    MuxConfig {
        priority_count: 2,
        max_payload_len: 20,
    }
}

#[test]
fn test_transfer_through_small_window() {
    const TOTAL: usize = 1000;
    const WINDOW: u64 = 64;

    let collector = Collector::default();
    let mut sender = Side::new(ChannelEndpoints::separate(Collector::default(), Pattern { next: 0, len: TOTAL }), config());
    let mut receiver = Side::new(ChannelEndpoints::separate(collector.clone(), Pattern { next: 0, len: 0 }), config());

    sender.channel.grant_transmit_quota(TOTAL as u64);

    let mut rounds = 0;
    while collector.received.lock().unwrap().len() < TOTAL {
        rounds += 1;
        assert!(rounds < 1000, "no progress: {:?} / {:?}", sender.channel, receiver.channel);

        if receiver.channel.recv_remaining() == 0 {
            receiver.channel.grant_receive_quota(WINDOW);
        }

        let mut to_sender = BytesMut::new();
        receiver.flush(&mut to_sender).unwrap();
        sender.dispatch(&to_sender).unwrap();

        let mut to_receiver = BytesMut::new();
        sender.flush(&mut to_receiver).unwrap();
        receiver.dispatch(&to_receiver).unwrap();

        assert!(sender.channel.xmit_seq() <= receiver.channel.recv_arm());
        assert_eq!(sender.channel.xmit_seq(), receiver.channel.recv_seq());
    }

    let expected = (0..TOTAL).map(|i| i as u8).collect::<Vec<_>>();
    assert_eq!(*collector.received.lock().unwrap(), expected);
    assert_eq!(sender.channel.xmit_position(), TOTAL as u64);
    assert_eq!(receiver.channel.recv_position(), TOTAL as u64);
    assert!(!receiver.channel.holds_recv_buffer());
}

#[test]
fn test_sender_ignoring_window() {
    let mut receiver = Side::new(ChannelEndpoints::separate(Collector::default(), Pattern { next: 0, len: 0 }), config());
    receiver.channel.grant_receive_quota(5);

    let mut wire = BytesMut::new();
    SegmentHeader::Data(DataSegmentHeader { channel_id: 9, seq: 0, payload_len: 10 }).ser(&mut wire);
    wire.extend_from_slice(&[0; 10]);

    let err = receiver.dispatch(&wire).unwrap_err();
    assert_eq!(ChannelError::kind_of(&err), Some(ErrorKind::ProtocolViolation));
    assert_eq!(receiver.channel.recv_seq(), 0);
}

#[test]
fn test_sequence_gap() {
    let mut receiver = Side::new(ChannelEndpoints::separate(Collector::default(), Pattern { next: 0, len: 0 }), config());
    receiver.channel.grant_receive_quota(50);

    let mut wire = BytesMut::new();
    SegmentHeader::Data(DataSegmentHeader { channel_id: 9, seq: 0, payload_len: 3 }).ser(&mut wire);
    wire.extend_from_slice(&[1, 2, 3]);
    SegmentHeader::Data(DataSegmentHeader { channel_id: 9, seq: 4, payload_len: 3 }).ser(&mut wire);
    wire.extend_from_slice(&[4, 5, 6]);

    let err = receiver.dispatch(&wire).unwrap_err();
    assert_eq!(ChannelError::kind_of(&err), Some(ErrorKind::ProtocolViolation));
    assert_eq!(receiver.channel.recv_seq(), 3);
}
