use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use crate::buffer::FixedBuf;
use crate::endpoint::{ChannelBinding, ChannelBound, RecvByteTarget, XmitByteSource};
use crate::scheduler::{ChannelScheduler, SchedulingRequest};

#[derive(Default)]
struct TargetState {
    max_buf_size: usize,
    bindings: Vec<ChannelBinding>,
    requested: Vec<usize>,
    received: Vec<u8>,
}

/// A byte target that hands out buffers of (at most) a fixed size and collects everything it
///  receives. Clones share their state so that tests can inspect a target after moving it into
///  a channel.
#[derive(Clone)]
pub struct CollectingTarget {
    state: Arc<Mutex<TargetState>>,
}
impl CollectingTarget {
    pub fn new(max_buf_size: usize) -> CollectingTarget {
        CollectingTarget {
            state: Arc::new(Mutex::new(TargetState {
                max_buf_size,
                ..Default::default()
            })),
        }
    }

    pub fn bindings(&self) -> Vec<ChannelBinding> {
        self.state.lock().unwrap().bindings.clone()
    }

    /// the `max_len` values of all buffer requests
    pub fn requested(&self) -> Vec<usize> {
        self.state.lock().unwrap().requested.clone()
    }

    pub fn received(&self) -> Vec<u8> {
        self.state.lock().unwrap().received.clone()
    }
}
impl ChannelBound for CollectingTarget {
    fn bind(&mut self, binding: ChannelBinding) {
        self.state.lock().unwrap().bindings.push(binding);
    }
}
impl RecvByteTarget for CollectingTarget {
    fn request_recv_buffer(&mut self, max_len: usize) -> Option<FixedBuf> {
        let mut state = self.state.lock().unwrap();
        state.requested.push(max_len);
        Some(FixedBuf::new(max_len.min(state.max_buf_size)))
    }

    fn recv_completed(&mut self, buf: FixedBuf) {
        self.state.lock().unwrap().received.extend_from_slice(buf.as_ref());
    }
}

#[derive(Default)]
struct SourceState {
    data: VecDeque<u8>,
    bindings: Vec<ChannelBinding>,
    requested: Vec<usize>,
    num_completed: usize,
}

/// A byte source that sends the bytes it was initialized with. Clones share their state.
#[derive(Clone)]
pub struct QueueSource {
    state: Arc<Mutex<SourceState>>,
}
impl QueueSource {
    pub fn new(data: &[u8]) -> QueueSource {
        QueueSource {
            state: Arc::new(Mutex::new(SourceState {
                data: data.iter().cloned().collect(),
                ..Default::default()
            })),
        }
    }

    pub fn bindings(&self) -> Vec<ChannelBinding> {
        self.state.lock().unwrap().bindings.clone()
    }

    pub fn requested(&self) -> Vec<usize> {
        self.state.lock().unwrap().requested.clone()
    }

    pub fn num_completed(&self) -> usize {
        self.state.lock().unwrap().num_completed
    }
}
impl ChannelBound for QueueSource {
    fn bind(&mut self, binding: ChannelBinding) {
        self.state.lock().unwrap().bindings.push(binding);
    }
}
impl XmitByteSource for QueueSource {
    fn request_xmit_buffer(&mut self, max_len: usize) -> FixedBuf {
        let mut state = self.state.lock().unwrap();
        state.requested.push(max_len);
        let n = max_len.min(state.data.len());
        let chunk = state.data.drain(..n).collect::<Vec<_>>();
        FixedBuf::from_slice(&chunk)
    }

    fn xmit_completed(&mut self, _buf: FixedBuf) {
        self.state.lock().unwrap().num_completed += 1;
    }
}

/// Target and source in a single object
#[derive(Clone)]
pub struct SharedUser {
    target: CollectingTarget,
    source: QueueSource,
    bindings: Arc<Mutex<Vec<ChannelBinding>>>,
}
impl SharedUser {
    pub fn new(max_buf_size: usize, data: &[u8]) -> SharedUser {
        SharedUser {
            target: CollectingTarget::new(max_buf_size),
            source: QueueSource::new(data),
            bindings: Default::default(),
        }
    }

    pub fn bindings(&self) -> Vec<ChannelBinding> {
        self.bindings.lock().unwrap().clone()
    }

    pub fn received(&self) -> Vec<u8> {
        self.target.received()
    }

    pub fn num_xmit_completed(&self) -> usize {
        self.source.num_completed()
    }
}
impl ChannelBound for SharedUser {
    fn bind(&mut self, binding: ChannelBinding) {
        self.bindings.lock().unwrap().push(binding);
    }
}
impl RecvByteTarget for SharedUser {
    fn request_recv_buffer(&mut self, max_len: usize) -> Option<FixedBuf> {
        self.target.request_recv_buffer(max_len)
    }

    fn recv_completed(&mut self, buf: FixedBuf) {
        self.target.recv_completed(buf)
    }
}
impl XmitByteSource for SharedUser {
    fn request_xmit_buffer(&mut self, max_len: usize) -> FixedBuf {
        self.source.request_xmit_buffer(max_len)
    }

    fn xmit_completed(&mut self, buf: FixedBuf) {
        self.source.xmit_completed(buf)
    }
}

/// A scheduler that records all requests, including redundant ones
pub struct RecordingScheduler {
    priority_count: u32,
    requests: Mutex<Vec<SchedulingRequest>>,
}
impl RecordingScheduler {
    pub fn new(priority_count: u32) -> Arc<RecordingScheduler> {
        Arc::new(RecordingScheduler {
            priority_count,
            requests: Default::default(),
        })
    }

    /// returns and clears the requests recorded so far
    pub fn take_requests(&self) -> Vec<SchedulingRequest> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}
impl ChannelScheduler for RecordingScheduler {
    fn request_scheduling(&self, request: SchedulingRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn priority_count(&self) -> u32 {
        self.priority_count
    }
}
