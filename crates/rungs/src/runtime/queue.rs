use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rungs_core::lifecycle::Mode;

use super::lane::{Job, Lane, OwnerId};
use super::latch::Latch;
use crate::error::log_core_error;

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Default)]
struct InFlightState {
    count: usize,
    latch: Option<Arc<Latch>>,
}

/// In-flight counter plus the latch for the current busy batch.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    state: Mutex<InFlightState>,
}

impl InFlight {
    /// Count one more item; the first item of a batch gets a fresh latch.
    pub(crate) fn enter(self: &Arc<Self>) -> InFlightGuard {
        let mut state = self.state.lock();
        if state.count == 0 {
            state.latch = Some(Arc::new(Latch::new()));
        }
        state.count += 1;
        InFlightGuard {
            owner: Arc::clone(self),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.state.lock().count
    }

    /// Latch of the current batch, `None` when idle.
    pub(crate) fn latch(&self) -> Option<Arc<Latch>> {
        self.state.lock().latch.clone()
    }

    fn leave(&self) {
        let released = {
            let mut state = self.state.lock();
            state.count = state.count.saturating_sub(1);
            if state.count == 0 {
                state.latch.take()
            } else {
                None
            }
        };
        if let Some(latch) = released {
            latch.release();
        }
    }
}

/// Decrements the in-flight count on drop.
///
/// Travels inside the posted job, so the count drops whether the job ran,
/// was withdrawn before starting, was dropped by a closed lane, or unwound
/// from a panicking hook.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    owner: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner.leave();
    }
}

/// Clears the queue's running flag on drop, including while unwinding.
struct RunningGuard(Arc<AtomicBool>);

impl RunningGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(Arc::clone(flag))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-component serialized worker.
///
/// Dispatches onto its lane according to `Mode`; `*Sync` modes hand the job
/// back for inline execution when the caller already runs on the lane and
/// is not itself inside one of this queue's jobs (a nested walk of the same
/// component would interleave with the outer one).
#[derive(Debug)]
pub(crate) struct ExecutionQueue {
    id: OwnerId,
    mode: Mode,
    lane: Arc<Lane>,
    in_flight: Arc<InFlight>,
    running: Arc<AtomicBool>,
}

impl ExecutionQueue {
    pub(crate) fn new(mode: Mode, lane: Arc<Lane>) -> Self {
        Self {
            id: NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed),
            mode,
            lane,
            in_flight: Arc::new(InFlight::default()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn lane_name(&self) -> &str {
        self.lane.name()
    }

    /// True when the caller runs on this queue's lane.
    pub(crate) fn is_on_lane(&self) -> bool {
        self.lane.is_current()
    }

    /// Start accounting for one work item before it is handed to [`dispatch`].
    ///
    /// [`dispatch`]: ExecutionQueue::dispatch
    pub(crate) fn enter(&self) -> InFlightGuard {
        self.in_flight.enter()
    }

    /// Post `work`, or return it for inline execution.
    ///
    /// The guard is moved into the job and released after `work` finishes
    /// or the job is dropped unstarted. The caller must run a returned job
    /// itself, after releasing any locks it holds.
    #[must_use]
    pub(crate) fn dispatch<F>(&self, guard: InFlightGuard, work: F) -> Option<Job>
    where
        F: FnOnce() + Send + 'static,
    {
        let running = Arc::clone(&self.running);
        let job: Job = Box::new(move || {
            let _guard = guard;
            let _running = RunningGuard::start(&running);
            work();
        });

        if self.mode.is_inline_allowed()
            && self.lane.is_current()
            && !self.running.load(Ordering::Acquire)
        {
            return Some(job);
        }

        if let Err(err) = self.lane.post(self.id, job) {
            log_core_error(err);
        }
        None
    }

    /// Drop this queue's unstarted work. Other queues sharing the lane are untouched.
    pub(crate) fn clear_pending(&self) -> usize {
        self.lane.remove_pending(self.id)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    pub(crate) fn latch(&self) -> Option<Arc<Latch>> {
        self.in_flight.latch()
    }
}
