use std::any::Any;
use std::cell::Cell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use rungs_core::error::{CoreError, Result};
use tracing::{debug, error, warn};

use crate::config::PanicPolicy;

/// Unit of work posted to a lane.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Identifies which queue posted a job, so a queue can withdraw its own
/// unstarted work from a shared lane.
pub(crate) type OwnerId = u64;

static NEXT_LANE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_LANE: Cell<u64> = const { Cell::new(0) };
}

struct Posted {
    owner: OwnerId,
    job: Job,
}

struct LaneQueue {
    jobs: VecDeque<Posted>,
    open: bool,
}

struct LaneShared {
    id: u64,
    name: String,
    policy: PanicPolicy,
    queue: Mutex<LaneQueue>,
    ready: Condvar,
}

/// A single worker thread that runs posted jobs strictly one at a time, FIFO.
///
/// The UI lane is shared by every UI-mode component; each IO-mode component
/// gets its own lane. Dropping the `Lane` closes it: unstarted jobs are
/// dropped (their drop guards still run) and the thread is joined unless the
/// drop happens on the lane thread itself.
pub(crate) struct Lane {
    shared: Arc<LaneShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Lane {
    pub(crate) fn spawn(name: impl Into<String>, policy: PanicPolicy) -> Result<Self> {
        let shared = Arc::new(LaneShared {
            id: NEXT_LANE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            policy,
            queue: Mutex::new(LaneQueue {
                jobs: VecDeque::new(),
                open: true,
            }),
            ready: Condvar::new(),
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(shared.name.clone())
            .spawn(move || run(worker))
            .map_err(CoreError::from)?;

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.shared.name
    }

    /// True when called from this lane's worker thread.
    pub(crate) fn is_current(&self) -> bool {
        CURRENT_LANE.with(|current| current.get() == self.shared.id)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.shared.queue.lock().open
    }

    /// Append a job. On a closed lane the job is dropped and `LaneClosed` returned.
    pub(crate) fn post(&self, owner: OwnerId, job: Job) -> Result<()> {
        let mut queue = self.shared.queue.lock();
        if !queue.open {
            drop(queue);
            drop(job);
            return Err(CoreError::lane_closed(self.shared.name.clone()));
        }
        queue.jobs.push_back(Posted { owner, job });
        self.shared.ready.notify_one();
        Ok(())
    }

    /// Withdraw every unstarted job posted by `owner`. Returns how many were removed.
    pub(crate) fn remove_pending(&self, owner: OwnerId) -> usize {
        let removed: Vec<Posted> = {
            let mut queue = self.shared.queue.lock();
            let (removed, kept): (VecDeque<Posted>, VecDeque<Posted>) =
                queue.jobs.drain(..).partition(|posted| posted.owner == owner);
            queue.jobs = kept;
            removed.into_iter().collect()
        };
        // Dropped outside the lane lock: job guards take their own locks.
        removed.len()
    }

    pub(crate) fn pending(&self) -> usize {
        self.shared.queue.lock().jobs.len()
    }

    /// Close the lane, drop unstarted work and join the worker.
    pub(crate) fn shutdown(&self) {
        close(&self.shared);

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if self.is_current() {
                // Dropped from inside one of our own jobs: the loop exits on its own.
                return;
            }
            if handle.join().is_err() {
                warn!(lane = %self.shared.name, "lane thread exited with a panic");
            }
        }
    }
}

impl Drop for Lane {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lane")
            .field("name", &self.shared.name)
            .field("policy", &self.shared.policy)
            .field("open", &self.is_open())
            .field("pending", &self.pending())
            .finish()
    }
}

fn close(shared: &LaneShared) {
    let dropped: Vec<Posted> = {
        let mut queue = shared.queue.lock();
        queue.open = false;
        shared.ready.notify_all();
        queue.jobs.drain(..).collect()
    };
    if !dropped.is_empty() {
        debug!(lane = %shared.name, dropped = dropped.len(), "lane closed with pending work");
    }
}

fn run(shared: Arc<LaneShared>) {
    CURRENT_LANE.with(|current| current.set(shared.id));
    debug!(lane = %shared.name, "lane started");

    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(posted) = queue.jobs.pop_front() {
                    break Some(posted.job);
                }
                if !queue.open {
                    break None;
                }
                shared.ready.wait(&mut queue);
            }
        };
        let Some(job) = job else { break };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!(
                lane = %shared.name,
                panic = panic_message(payload.as_ref()),
                policy = ?shared.policy,
                "lifecycle work panicked"
            );
            if shared.policy == PanicPolicy::Terminate {
                close(&shared);
                break;
            }
        }
    }

    debug!(lane = %shared.name, "lane stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn jobs_run_in_post_order_on_the_lane_thread() {
        let lane = Lane::spawn("test-lane", PanicPolicy::Isolate).unwrap();
        let (tx, rx) = mpsc::channel();

        for i in 0..5 {
            let tx = tx.clone();
            lane.post(1, Box::new(move || {
                let on_lane = thread::current().name() == Some("test-lane");
                tx.send((i, on_lane)).unwrap();
            }))
            .unwrap();
        }

        let seen: Vec<(i32, bool)> = (0..5).map(|_| rx.recv().unwrap()).collect();
        assert_eq!(seen, (0..5).map(|i| (i, true)).collect::<Vec<_>>());
        assert!(!lane.is_current());
    }

    #[test]
    fn remove_pending_only_touches_the_owner() {
        let lane = Lane::spawn("test-lane-remove", PanicPolicy::Isolate).unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        // Park the lane so later posts stay queued.
        lane.post(9, Box::new(move || {
            gate_rx.recv().unwrap();
        }))
        .unwrap();

        for owner in [1, 2, 1] {
            let done_tx = done_tx.clone();
            lane.post(owner, Box::new(move || done_tx.send(owner).unwrap()))
                .unwrap();
        }

        assert_eq!(lane.remove_pending(1), 2);
        gate_tx.send(()).unwrap();

        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn isolate_policy_keeps_serving_after_a_panic() {
        let lane = Lane::spawn("test-lane-isolate", PanicPolicy::Isolate).unwrap();
        let (tx, rx) = mpsc::channel();

        lane.post(1, Box::new(|| panic!("hook failed"))).unwrap();
        lane.post(1, Box::new(move || tx.send(()).unwrap())).unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(lane.is_open());
    }

    #[test]
    fn terminate_policy_closes_the_lane() {
        let lane = Lane::spawn("test-lane-terminate", PanicPolicy::Terminate).unwrap();
        lane.post(1, Box::new(|| panic!("hook failed"))).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while lane.is_open() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert!(!lane.is_open());
        let err = lane.post(1, Box::new(|| {})).unwrap_err();
        assert_eq!(err.kind, rungs_core::error::ErrorKind::LaneClosed);
    }
}
