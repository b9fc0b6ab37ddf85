use std::any::TypeId;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rungs_core::lifecycle::{
    drive, ActivationGate, Component, DriveOutcome, Mode, Params, State, Transaction, Transition,
};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use super::events::TransitionEvent;
use super::lane::Job;
use super::profiler::ObjectProfiler;
use super::queue::ExecutionQueue;
use super::registry::Shared;

/// Identity of a registered instance: the address of its allocation.
///
/// Stable for as long as the Spec lives, since the Spec's weak handle keeps
/// the allocation from being reused.
pub(crate) type ComponentId = usize;

pub(crate) fn component_id<T: ?Sized>(component: &T) -> ComponentId {
    component as *const T as *const () as usize
}

/// How a component is registered: setup params, execution mode, and
/// whether it follows the global lifecycle signal.
#[derive(Debug, Clone, Default)]
pub struct ComponentOptions {
    pub params: Params,
    pub mode: Mode,
    pub follow_global_lifecycle: bool,
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn follow_global_lifecycle(mut self, follow: bool) -> Self {
        self.follow_global_lifecycle = follow;
        self
    }
}

pub(crate) struct SpecInit {
    pub(crate) component: Weak<dyn Component>,
    pub(crate) id: ComponentId,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) tag: String,
    pub(crate) options: ComponentOptions,
    pub(crate) queue: ExecutionQueue,
    pub(crate) event_capacity: usize,
    pub(crate) log_lifecycle: bool,
    pub(crate) profiler: Option<Arc<ObjectProfiler>>,
}

/// Scheduler-private runtime record for one registered component.
pub(crate) struct Spec {
    id: ComponentId,
    component: Weak<dyn Component>,
    type_id: TypeId,
    type_name: &'static str,
    tag: String,
    params: Params,
    follows_global_lifecycle: bool,
    log_lifecycle: bool,
    profiler: Option<Arc<ObjectProfiler>>,

    state: Mutex<State>,

    // Latest issued transaction; the one a newer request cancels.
    active: Mutex<Option<Arc<Transaction>>>,

    // Makes cancel + withdraw + post one step with respect to other dispatchers.
    dispatch: Mutex<()>,

    queue: ExecutionQueue,
    gate: Arc<ActivationGate>,
    events: broadcast::Sender<TransitionEvent>,
}

impl Spec {
    pub(crate) fn new(init: SpecInit) -> Self {
        let (events, _rx) = broadcast::channel(init.event_capacity.max(1));
        Self {
            id: init.id,
            component: init.component,
            type_id: init.type_id,
            type_name: init.type_name,
            tag: init.tag,
            params: init.options.params,
            follows_global_lifecycle: init.options.follow_global_lifecycle,
            log_lifecycle: init.log_lifecycle,
            profiler: init.profiler,
            state: Mutex::new(State::Down),
            active: Mutex::new(None),
            dispatch: Mutex::new(()),
            queue: init.queue,
            gate: Arc::new(ActivationGate::new()),
            events,
        }
    }

    pub(crate) fn id(&self) -> ComponentId {
        self.id
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn state(&self) -> State {
        *self.state.lock()
    }

    pub(crate) fn mode(&self) -> Mode {
        self.queue.mode()
    }

    pub(crate) fn follows_global_lifecycle(&self) -> bool {
        self.follows_global_lifecycle
    }

    pub(crate) fn gate(&self) -> Arc<ActivationGate> {
        Arc::clone(&self.gate)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.queue.in_flight()
    }

    /// Request a walk toward `target`.
    ///
    /// Cancels the previous transaction, withdraws this component's unstarted
    /// work and posts the new walk. Runs the walk inline only when the mode
    /// allows it and the caller is already on the lane.
    pub(crate) fn set_state(self: &Arc<Self>, target: State, registry: Weak<Shared>) {
        if let Some(job) = self.request(target, registry, false) {
            job();
        }
    }

    /// Like [`set_state`](Spec::set_state), but hands an inline walk back to
    /// the caller instead of running it.
    ///
    /// Lets the caller release its own locks before any hook runs.
    #[must_use]
    pub(crate) fn dispatch_state(
        self: &Arc<Self>,
        target: State,
        registry: Weak<Shared>,
    ) -> Option<Job> {
        self.request(target, registry, false)
    }

    /// Request a walk to `Down`; releases the component even if it never left `Down`.
    pub(crate) fn tear_down(self: &Arc<Self>, registry: Weak<Shared>) {
        if let Some(job) = self.request(State::Down, registry, true) {
            job();
        }
    }

    fn request(
        self: &Arc<Self>,
        target: State,
        registry: Weak<Shared>,
        teardown: bool,
    ) -> Option<Job> {
        let guard = self.queue.enter();
        let _serial = self.dispatch.lock();

        let withdrawn = self.queue.clear_pending();
        let tx = Arc::new(Transaction::new(target));
        let previous = self.active.lock().replace(Arc::clone(&tx));
        if let Some(previous) = previous {
            if previous.cancel() {
                trace!(
                    component = self.type_name,
                    tag = %self.tag,
                    superseded = %previous.target(),
                    requested = %target,
                    withdrawn,
                    "previous transaction canceled"
                );
            }
        }

        let spec = Arc::downgrade(self);
        self.queue.dispatch(guard, move || {
            if let Some(spec) = spec.upgrade() {
                spec.run(&tx, &registry, teardown);
            }
        })
    }

    /// Wait until no work is in flight, then run `block`.
    pub(crate) fn sync<R>(&self, block: impl FnOnce() -> R) -> R {
        if self.queue.is_on_lane() {
            if self.queue.in_flight() > 0 {
                warn!(
                    component = self.type_name,
                    tag = %self.tag,
                    lane = self.queue.lane_name(),
                    "sync called from the component's own lane; not waiting"
                );
            }
            return block();
        }

        if let Some(latch) = self.queue.latch() {
            latch.wait();
        }
        block()
    }

    fn run(&self, tx: &Arc<Transaction>, registry: &Weak<Shared>, teardown: bool) {
        let _slot = ActiveSlot {
            slot: &self.active,
            tx,
        };

        // Superseded after dispatch but before it started: nothing to undo.
        if tx.is_canceled() {
            trace!(
                component = self.type_name,
                tag = %self.tag,
                requested = %tx.target(),
                "transaction superseded before it started"
            );
            return;
        }

        let Some(component) = self.component.upgrade() else {
            trace!(
                component = self.type_name,
                tag = %self.tag,
                "component dropped; transaction abandoned"
            );
            return;
        };

        let verbose = self.log_lifecycle || component.logs_lifecycle();
        let from = self.state();
        let outcome = drive(component.as_ref(), &self.params, tx, from, |transition, goal| {
            self.commit(transition, goal, verbose);
            self.profile(transition);
            if goal == State::Down {
                if let Some(registry) = registry.upgrade() {
                    registry.unregister(self);
                }
            }
        });

        // Tearing down a component that never left Down still releases it.
        if teardown && outcome == DriveOutcome::Unchanged(State::Down) {
            if let Some(registry) = registry.upgrade() {
                registry.unregister(self);
            }
        }

        if let DriveOutcome::Canceled(state) = outcome {
            trace!(
                component = self.type_name,
                tag = %self.tag,
                halted = %state,
                requested = %tx.target(),
                "transaction superseded"
            );
        }
    }

    fn profile(&self, transition: Transition) {
        let Some(profiler) = &self.profiler else {
            return;
        };
        match transition {
            Transition::SetUp => profiler.did_create(self.type_name, &self.tag, &self.component),
            Transition::TearDown => {
                profiler.will_destroy(self.type_name, &self.tag, &self.component)
            }
            _ => {}
        }
    }

    fn commit(&self, transition: Transition, goal: State, verbose: bool) {
        let start = std::mem::replace(&mut *self.state.lock(), goal);

        match (start, goal) {
            (_, State::Active) => self.gate.activate(),
            (State::Active, _) => self.gate.deactivate(),
            _ => {}
        }

        if verbose {
            debug!(
                component = self.type_name,
                tag = %self.tag,
                %transition,
                from = %start,
                to = %goal,
                "lifecycle step"
            );
        } else {
            trace!(
                component = self.type_name,
                tag = %self.tag,
                %transition,
                from = %start,
                to = %goal,
                "lifecycle step"
            );
        }

        // No receivers or lagging receivers must not stall the walk.
        let _ = self.events.send(TransitionEvent {
            type_name: self.type_name,
            tag: self.tag.clone(),
            transition,
            start_state: start,
            goal_state: goal,
        });
    }
}

impl std::fmt::Debug for Spec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spec")
            .field("type_name", &self.type_name)
            .field("tag", &self.tag)
            .field("state", &self.state())
            .field("mode", &self.mode())
            .field("follows_global_lifecycle", &self.follows_global_lifecycle)
            .finish()
    }
}

/// Clears `active` when the walk ends, unless a newer transaction took the slot.
struct ActiveSlot<'a> {
    slot: &'a Mutex<Option<Arc<Transaction>>>,
    tx: &'a Arc<Transaction>,
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|active| Arc::ptr_eq(active, self.tx)) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanicPolicy;
    use crate::runtime::lane::Lane;

    #[derive(Default)]
    struct Idle;
    impl Component for Idle {}

    fn spec_for(component: Weak<dyn Component>, lane: &str) -> Arc<Spec> {
        let lane = Arc::new(Lane::spawn(lane, PanicPolicy::Isolate).unwrap());
        Arc::new(Spec::new(SpecInit {
            component,
            id: 0,
            type_id: TypeId::of::<Idle>(),
            type_name: "Idle",
            tag: "idle".to_string(),
            options: ComponentOptions::new().mode(Mode::IoAsync),
            queue: ExecutionQueue::new(Mode::IoAsync, lane),
            event_capacity: 4,
            log_lifecycle: false,
            profiler: None,
        }))
    }

    #[test]
    fn dropped_component_abandons_the_walk() {
        let component: Arc<dyn Component> = Arc::new(Idle);
        let weak = Arc::downgrade(&component);
        drop(component);

        let spec = spec_for(weak, "spec-dropped");
        spec.set_state(State::Active, Weak::new());
        spec.sync(|| {});

        assert_eq!(spec.state(), State::Down);
        assert!(!spec.gate().is_active());
        assert!(spec.active.lock().is_none());
    }

    #[test]
    fn finished_walk_clears_the_active_slot() {
        let component: Arc<dyn Component> = Arc::new(Idle);
        let spec = spec_for(Arc::downgrade(&component), "spec-slot");

        spec.set_state(State::Active, Weak::new());
        let state = spec.sync(|| spec.state());

        assert_eq!(state, State::Active);
        assert!(spec.gate().is_active());
        assert!(spec.active.lock().is_none());
        assert_eq!(spec.in_flight(), 0);
    }
}
