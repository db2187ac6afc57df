use std::mem::size_of;
use anyhow::bail;
use bytes::{Buf, BufMut, BytesMut};
use bytes_varint::{VarIntSupport, VarIntSupportMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::buffer::FixedBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SegmentKind {
    Data = 1,
    Arm = 2,
}

/// Header of a DATA segment, followed by `payload_len` bytes of payload on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSegmentHeader {
    pub channel_id: u32,
    /// the sequence number of the first payload byte
    pub seq: u64,
    pub payload_len: u32,
}

/// An ARM segment advertises the sender's receive window to the peer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmSegment {
    pub channel_id: u32,
    pub arm: u64,
}

/// A DATA segment as it is handed from a channel to the multiplexer for framing
#[derive(Debug, PartialEq, Eq)]
pub struct DataSegment {
    pub header: DataSegmentHeader,
    pub payload: FixedBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentHeader {
    Data(DataSegmentHeader),
    Arm(ArmSegment),
}

const KIND_LEN: usize = size_of::<u8>();
const MAX_VARINT_U32_LEN: usize = 5;
const FIXED_U64_LEN: usize = size_of::<u64>();

impl DataSegmentHeader {
    /// kind | channel id | seq | payload length
    pub const MAX_SERIALIZED_LEN: usize = KIND_LEN + MAX_VARINT_U32_LEN + FIXED_U64_LEN + MAX_VARINT_U32_LEN;
}

impl ArmSegment {
    /// kind | channel id | arm
    pub const MAX_SERIALIZED_LEN: usize = KIND_LEN + MAX_VARINT_U32_LEN + FIXED_U64_LEN;
}

impl SegmentHeader {
    /// the longest header of any kind
    pub const MAX_SERIALIZED_LEN: usize = max_len(DataSegmentHeader::MAX_SERIALIZED_LEN, ArmSegment::MAX_SERIALIZED_LEN);

    pub fn channel_id(&self) -> u32 {
        match self {
            SegmentHeader::Data(h) => h.channel_id,
            SegmentHeader::Arm(a) => a.channel_id,
        }
    }

    pub fn ser(&self, buf: &mut BytesMut) {
        match self {
            SegmentHeader::Data(h) => {
                buf.put_u8(SegmentKind::Data.into());
                buf.put_u32_varint(h.channel_id);
                buf.put_u64(h.seq);
                buf.put_u32_varint(h.payload_len);
            }
            SegmentHeader::Arm(a) => {
                buf.put_u8(SegmentKind::Arm.into());
                buf.put_u32_varint(a.channel_id);
                buf.put_u64(a.arm);
            }
        }
    }

    /// NB: For DATA segments, only the header is consumed - the payload remains in `buf`
    pub fn deser(buf: &mut impl Buf) -> anyhow::Result<SegmentHeader> {
        let kind = SegmentKind::try_from(try_get_u8(buf)?)?;
        let channel_id = buf.try_get_u32_varint()?;

        match kind {
            SegmentKind::Data => {
                let seq = try_get_u64(buf)?;
                let payload_len = buf.try_get_u32_varint()?;
                Ok(SegmentHeader::Data(DataSegmentHeader { channel_id, seq, payload_len }))
            }
            SegmentKind::Arm => {
                let arm = try_get_u64(buf)?;
                Ok(SegmentHeader::Arm(ArmSegment { channel_id, arm }))
            }
        }
    }
}

const fn max_len(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

fn try_get_u8(buf: &mut impl Buf) -> anyhow::Result<u8> {
    if buf.remaining() < size_of::<u8>() {
        bail!("segment header truncated");
    }
    Ok(buf.get_u8())
}

fn try_get_u64(buf: &mut impl Buf) -> anyhow::Result<u64> {
    if buf.remaining() < size_of::<u64>() {
        bail!("segment header truncated");
    }
    Ok(buf.get_u64())
}
