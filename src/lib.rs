//! This crate implements a single *channel* of a multiplexed, flow-controlled byte streaming
//!  protocol: several independent byte streams share one ordered, reliable transport connection
//!  (typically TCP), and each of them is flow-controlled independently in both directions.
//!
//! ## Flow control
//!
//! Every direction of a channel is governed by two independent quota mechanisms:
//!
//! * the *window* (`seq` / `arm`): `seq` counts the bytes that were sequenced on the wire so far,
//!   `arm` is the highest `seq` the receiving side currently permits. The receiver advertises
//!   its `arm` to the sender in ARM segments, and a sender must never send beyond it.
//! * the *application quota* (`position` / `limit`): `limit` is the cumulative number of bytes
//!   the local application is willing to transfer, `position` the number of bytes actually
//!   transferred.
//!
//! Data is only sent if both the application and the remote peer are ready for it, i.e. the
//!  payload length is bounded by `min(limit - position, arm - seq)`.
//!
//! NB: `position` and `seq` currently always advance together. They are kept separate nonetheless
//!      so that buffered-but-not-yet-sequenced data can be introduced without redesigning the
//!      accounting.
//!
//! All counters are `u64` and never wrap.
//!
//! ## Scheduling
//!
//! A channel never writes to the transport itself. When it has something to send (an updated
//!  receive window, or data within quota and window), it pushes a [scheduler::SchedulingRequest]
//!  to the multiplexer's [scheduler::ChannelScheduler]. The multiplexer later *pulls* the segment
//!  from the channel ([channel::Channel::pull_control], [channel::Channel::produce_outbound]),
//!  frames it and writes it to the transport. Requests are idempotent between pulls, and a pull
//!  without pending work simply yields nothing.
//!
//! ## Segments
//!
//! Big-endian, channel ids and payload lengths as varints:
//!
//! ```ascii
//! DATA:  kind (u8, 1) | channel id (varint u32) | seq (u64) | payload length (varint u32) | payload
//! ARM:   kind (u8, 2) | channel id (varint u32) | arm (u64)
//! ```
//!
//! ## Threading
//!
//! A channel is owned by its connection and mutated by exactly one processing context at a time;
//!  it does no locking of its own. No operation blocks: a transport that has no data right now
//!  returns zero bytes, and the channel reports partial progress.

pub mod buffer;
pub mod channel;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod quota;
pub mod scheduler;
pub mod segment;
pub mod transport;

#[cfg(test)]
mod test_util;
