#[cfg(test)] use mockall::automock;
use std::collections::VecDeque;
use std::sync::Mutex;
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};
use crate::config::MuxConfig;
use crate::segment::SegmentKind;

/// A channel's request to be pulled for a segment of the given kind at some later time
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchedulingRequest {
    pub channel_id: u32,
    pub priority: u32,
    pub kind: SegmentKind,
}

/// The multiplexer side of the scheduling contract. Requests are fire-and-forget: a channel
///  pushes a request, and the multiplexer eventually pulls the corresponding segment from the
///  channel. Requests for the same channel and kind that are pushed before the pull are
///  redundant.
#[cfg_attr(test, automock)]
pub trait ChannelScheduler: Send + Sync + 'static {
    fn request_scheduling(&self, request: SchedulingRequest);

    /// channels must have a priority below this value
    fn priority_count(&self) -> u32;
}

/// A priority queue of pending scheduling requests.
///
/// Requests are ordered by priority (lower value first), ARM before DATA within a priority level,
///  and FIFO otherwise. A request that is already pending is not queued a second time.
pub struct SchedulingQueue {
    priority_count: u32,
    inner: Mutex<SchedulingQueueInner>,
}

struct SchedulingQueueInner {
    /// one queue per priority level and segment kind: `[prio0 arm, prio0 data, prio1 arm, ...]`
    levels: Vec<VecDeque<SchedulingRequest>>,
    pending: FxHashSet<(u32, SegmentKind)>,
}

impl SchedulingQueue {
    pub fn new(config: &MuxConfig) -> anyhow::Result<SchedulingQueue> {
        config.validate()?;

        let num_levels = 2 * config.priority_count as usize;
        Ok(SchedulingQueue {
            priority_count: config.priority_count,
            inner: Mutex::new(SchedulingQueueInner {
                levels: (0..num_levels).map(|_| VecDeque::new()).collect(),
                pending: FxHashSet::default(),
            }),
        })
    }

    fn level_index(request: &SchedulingRequest) -> usize {
        let kind_offset = match request.kind {
            SegmentKind::Arm => 0,
            SegmentKind::Data => 1,
        };
        2 * request.priority as usize + kind_offset
    }

    /// Removes and returns the most urgent pending request
    pub fn next_request(&self) -> Option<SchedulingRequest> {
        let mut inner = self.lock();
        let request = inner.levels.iter_mut()
            .find_map(|level| level.pop_front())?;

        inner.pending.remove(&(request.channel_id, request.kind));
        trace!("next scheduled: {:?}", request);
        Some(request)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulingQueueInner> {
        // the queue's state is consistent after every operation, so a poisoned lock is harmless
        self.inner.lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

impl ChannelScheduler for SchedulingQueue {
    fn request_scheduling(&self, request: SchedulingRequest) {
        if request.priority >= self.priority_count {
            warn!("dropping scheduling request {:?}: priority must be below {}", request, self.priority_count);
            return;
        }

        let mut inner = self.lock();
        if inner.pending.insert((request.channel_id, request.kind)) {
            trace!("queueing {:?}", request);
            inner.levels[Self::level_index(&request)].push_back(request);
        }
        else {
            debug!("{:?} is already pending - ignoring", request);
        }
    }

    fn priority_count(&self) -> u32 {
        self.priority_count
    }
}
