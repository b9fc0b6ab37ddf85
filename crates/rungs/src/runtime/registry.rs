use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rungs_core::error::{CoreError, Result};
use rungs_core::lifecycle::{ActivationGate, Component, Params, State};
use tokio::sync::broadcast;
use tracing::debug;

use super::events::TransitionEvent;
use super::lane::{Job, Lane};
use super::profiler::{ObjectLeak, ObjectProfiler};
use super::queue::ExecutionQueue;
use super::spec::{component_id, ComponentId, ComponentOptions, Spec, SpecInit};
use crate::config::RuntimeConfig;
use crate::error::log_core_error;

type Provider = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

struct Entry {
    // The registry's strong reference; the Spec only holds a weak one.
    instance: Arc<dyn Any + Send + Sync>,
    spec: Arc<Spec>,
}

#[derive(Default)]
struct Tables {
    components: HashMap<ComponentId, Entry>,
    providers: HashMap<TypeId, Provider>,
    global_state: State,
}

impl Tables {
    fn find(&self, type_id: TypeId, tag: &str) -> Option<&Entry> {
        self.components
            .values()
            .find(|entry| Spec::type_id(&entry.spec) == type_id && entry.spec.tag() == tag)
    }

    fn is_taken(&self, id: ComponentId, type_id: TypeId, tag: &str) -> bool {
        self.components.contains_key(&id) || self.find(type_id, tag).is_some()
    }
}

pub(crate) struct Shared {
    config: RuntimeConfig,
    ui_lane: Arc<Lane>,
    tables: Mutex<Tables>,
    // Serializes global lifecycle fan-outs. Never held while a hook runs.
    signal: Mutex<()>,
    io_lanes: AtomicU64,
    profiler: Option<Arc<ObjectProfiler>>,
}

impl Shared {
    /// Drop the component once its walk reaches `Down`.
    ///
    /// Only the Spec that is currently registered for the instance is removed.
    pub(crate) fn unregister(&self, spec: &Spec) {
        let removed = {
            let mut tables = self.tables.lock();
            let current = tables
                .components
                .get(&spec.id())
                .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(&entry.spec), spec));
            if current {
                tables.components.remove(&spec.id())
            } else {
                None
            }
        };

        // Dropped outside the table lock: a component's Drop may call back in.
        if let Some(entry) = removed {
            debug!(
                component = entry.spec.type_name(),
                tag = %entry.spec.tag(),
                "component unregistered"
            );
            drop(entry);
        }
    }
}

/// Process-wide table of live components, their Specs, type-keyed factories
/// and the last global lifecycle state.
///
/// Cheap to clone; clones share the same tables and UI lane. Components are
/// found by concrete type and tag. Dropping the last handle stops the UI
/// lane once in-flight work has drained from it.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Registry {
    /// Registry with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Registry configured from `RUNGS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(RuntimeConfig::from_env()?)
    }

    pub fn with_config(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let ui_lane = Arc::new(Lane::spawn(config.ui_lane_name.clone(), config.panic_policy)?);
        let profiler = config
            .profile_objects
            .then(|| Arc::new(ObjectProfiler::default()));
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                ui_lane,
                tables: Mutex::new(Tables::default()),
                signal: Mutex::new(()),
                io_lanes: AtomicU64::new(0),
                profiler,
            }),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.shared.config
    }

    // ---------------- Registration ----------------

    /// Register `component` under `tag` at `State::Down`.
    ///
    /// Fails with `ErrorKind::AlreadyRegistered` when a component of the same
    /// type and tag, or this very instance, is registered; the existing
    /// registration is left untouched.
    pub fn register<T: Component>(
        &self,
        component: Arc<T>,
        tag: impl Into<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        let tag = tag.into();
        let id = component_id(component.as_ref());
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if self.shared.tables.lock().is_taken(id, type_id, &tag) {
            return Err(CoreError::already_registered(type_name, tag));
        }

        let lane = if options.mode.is_ui() {
            Arc::clone(&self.shared.ui_lane)
        } else {
            let n = self.shared.io_lanes.fetch_add(1, Ordering::Relaxed) + 1;
            let name = format!("{}-{n}", self.shared.config.io_lane_prefix);
            Arc::new(Lane::spawn(name, self.shared.config.panic_policy)?)
        };

        let mode = options.mode;
        let follows = options.follow_global_lifecycle;
        let dyn_component: Arc<dyn Component> = component.clone();
        let spec = Arc::new(Spec::new(SpecInit {
            component: Arc::downgrade(&dyn_component),
            id,
            type_id,
            type_name,
            tag: tag.clone(),
            options,
            queue: ExecutionQueue::new(mode, lane),
            event_capacity: self.shared.config.event_capacity,
            log_lifecycle: self.shared.config.log_lifecycle,
            profiler: self.shared.profiler.clone(),
        }));

        {
            let mut tables = self.shared.tables.lock();
            // Re-check: another thread may have won while the lane was spawning.
            if tables.is_taken(id, type_id, &tag) {
                drop(tables);
                return Err(CoreError::already_registered(type_name, tag));
            }
            tables.components.insert(
                id,
                Entry {
                    instance: component,
                    spec,
                },
            );
        }

        debug!(
            component = type_name,
            tag = %tag,
            mode = mode.label(),
            follows_global_lifecycle = follows,
            "component registered"
        );
        Ok(())
    }

    /// Register a factory used by [`set_up`](Registry::set_up) for `T`,
    /// replacing any previous one.
    pub fn provide<T, F>(&self, factory: F)
    where
        T: Component,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let provider: Provider = Arc::new(move || Arc::new(factory()) as Arc<dyn Any + Send + Sync>);
        self.shared
            .tables
            .lock()
            .providers
            .insert(TypeId::of::<T>(), provider);
    }

    /// Materialize `T` under `tag` unless one is registered already.
    ///
    /// Uses the provider registered for `T` if any, else `T::default()`.
    /// Returns `Ok(true)` when a component was created, `Ok(false)` when the
    /// call was a no-op.
    pub fn set_up<T: Component + Default>(
        &self,
        tag: impl Into<String>,
        options: ComponentOptions,
    ) -> Result<bool> {
        self.set_up_with(tag, options, T::default)
    }

    /// Like [`set_up`](Registry::set_up), with `construct` as the fallback
    /// when no provider is registered for `T`.
    pub fn set_up_with<T, F>(
        &self,
        tag: impl Into<String>,
        options: ComponentOptions,
        construct: F,
    ) -> Result<bool>
    where
        T: Component,
        F: FnOnce() -> T,
    {
        let tag = tag.into();

        let provider = {
            let tables = self.shared.tables.lock();
            if tables.find(TypeId::of::<T>(), &tag).is_some() {
                return Ok(false);
            }
            tables.providers.get(&TypeId::of::<T>()).cloned()
        };

        let component = match provider.map(|provide| provide().downcast::<T>()) {
            Some(Ok(component)) => component,
            _ => Arc::new(construct()),
        };

        let follows = options.follow_global_lifecycle;
        match self.register(Arc::clone(&component), tag, options) {
            Ok(()) => {}
            Err(err) if err.is_already_registered() => return Ok(false),
            Err(err) => return Err(err),
        }

        if follows {
            self.set_state(component.as_ref(), self.global_state());
        }
        Ok(true)
    }

    /// Start tearing down `T` registered under `tag`.
    ///
    /// Returns whether a teardown was issued; unknown (type, tag) is a no-op.
    pub fn tear_down<T: Component>(&self, tag: &str) -> bool {
        let Some(spec) = self.spec_by_tag::<T>(tag) else {
            debug!(component = std::any::type_name::<T>(), tag, "nothing to tear down");
            return false;
        };
        spec.tear_down(Arc::downgrade(&self.shared));
        true
    }

    // ---------------- Lifecycle ----------------

    /// Drive `component` toward `target`. Returns without waiting.
    ///
    /// Supersedes any walk already requested for the component. Unknown
    /// components are ignored.
    ///
    /// Components are identified by address, so every identity-based method
    /// takes the component itself. Pass `arc.as_ref()`; a handle such as
    /// `&Arc<T>` is not a component and is rejected at compile time:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// use rungs::{Component, Registry, State};
    ///
    /// struct Widget;
    /// impl Component for Widget {}
    ///
    /// let registry = Registry::new().unwrap();
    /// let widget = Arc::new(Widget);
    /// registry.set_state(&widget, State::Active);
    /// ```
    pub fn set_state<T: Component + ?Sized>(&self, component: &T, target: State) {
        match self.spec_for(component) {
            Some(spec) => spec.set_state(target, Arc::downgrade(&self.shared)),
            None => log_core_error(CoreError::not_registered(std::any::type_name::<T>())),
        }
    }

    /// Record the host's lifecycle state and drive every component that
    /// follows it.
    pub fn set_global_state(&self, state: State) {
        self.signal_global(state, false);
    }

    /// Like [`set_global_state`](Registry::set_global_state), but does
    /// nothing when `state` already is the global state.
    ///
    /// The comparison and the update happen under the same lock as every
    /// other global signal. Returns whether followers were driven.
    pub fn set_global_state_if_changed(&self, state: State) -> bool {
        self.signal_global(state, true)
    }

    pub fn global_state(&self) -> State {
        self.shared.tables.lock().global_state
    }

    /// Block until `component` has no work in flight, then run `block`.
    ///
    /// Runs `block` straight away when the component is not registered, or
    /// when called from the component's own lane.
    pub fn sync<T: Component + ?Sized, R>(&self, component: &T, block: impl FnOnce() -> R) -> R {
        match self.spec_for(component) {
            Some(spec) => spec.sync(block),
            None => {
                log_core_error(CoreError::not_registered(std::any::type_name::<T>()));
                block()
            }
        }
    }

    /// Block until every registered component has settled.
    pub fn await_all(&self) {
        for spec in self.specs() {
            spec.sync(|| ());
        }
    }

    // ---------------- Lookup ----------------

    /// The `T` registered under `tag`, if any.
    pub fn lookup<T: Component>(&self, tag: &str) -> Option<Arc<T>> {
        let instance = {
            let tables = self.shared.tables.lock();
            Arc::clone(&tables.find(TypeId::of::<T>(), tag)?.instance)
        };
        instance.downcast::<T>().ok()
    }

    pub fn contains<T: Component>(&self, tag: &str) -> bool {
        self.shared
            .tables
            .lock()
            .find(TypeId::of::<T>(), tag)
            .is_some()
    }

    pub fn is_registered<T: Component + ?Sized>(&self, component: &T) -> bool {
        self.spec_for(component).is_some()
    }

    pub fn len(&self) -> usize {
        self.shared.tables.lock().components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current rung of `component`; `Down` when not registered.
    pub fn state_of<T: Component + ?Sized>(&self, component: &T) -> State {
        self.spec_for(component)
            .map(|spec| spec.state())
            .unwrap_or(State::Down)
    }

    /// Setup params of `component`; empty when not registered.
    pub fn params_of<T: Component + ?Sized>(&self, component: &T) -> Params {
        self.spec_for(component)
            .map(|spec| spec.params().clone())
            .unwrap_or_default()
    }

    pub fn tag_of<T: Component + ?Sized>(&self, component: &T) -> Option<String> {
        self.spec_for(component).map(|spec| spec.tag().to_string())
    }

    /// Gate that is open exactly while `component` is `Active`.
    pub fn activation_gate<T: Component + ?Sized>(&self, component: &T) -> Option<Arc<ActivationGate>> {
        self.spec_for(component).map(|spec| spec.gate())
    }

    /// Transition events of `component`, from now on.
    pub fn subscribe_transition_events<T: Component + ?Sized>(
        &self,
        component: &T,
    ) -> Option<broadcast::Receiver<TransitionEvent>> {
        self.spec_for(component).map(|spec| spec.subscribe())
    }

    /// Work items of `component` not yet finished; 0 when not registered.
    pub fn in_flight<T: Component + ?Sized>(&self, component: &T) -> usize {
        self.spec_for(component)
            .map(|spec| spec.in_flight())
            .unwrap_or(0)
    }

    /// Torn-down components that are still referenced somewhere.
    ///
    /// Each one is also logged at warn. Always empty unless
    /// `RuntimeConfig::profile_objects` is set.
    pub fn object_leaks(&self) -> Vec<ObjectLeak> {
        self.shared
            .profiler
            .as_ref()
            .map(|profiler| profiler.leaks())
            .unwrap_or_default()
    }

    // ---------------- Internals ----------------

    fn signal_global(&self, state: State, only_if_changed: bool) -> bool {
        let signal = self.shared.signal.lock();

        let followers: Vec<Arc<Spec>> = {
            let mut tables = self.shared.tables.lock();
            if only_if_changed && tables.global_state == state {
                return false;
            }
            tables.global_state = state;
            tables
                .components
                .values()
                .filter(|entry| entry.spec.follows_global_lifecycle())
                .map(|entry| Arc::clone(&entry.spec))
                .collect()
        };

        debug!(state = %state, components = followers.len(), "global lifecycle state changed");

        // Every follower is dispatched under the signal lock so fan-outs never
        // interleave; walks that run inline start only after it is released.
        let inline: Vec<Job> = followers
            .iter()
            .filter_map(|spec| spec.dispatch_state(state, Arc::downgrade(&self.shared)))
            .collect();
        drop(signal);

        for job in inline {
            job();
        }
        true
    }

    fn spec_for<T: Component + ?Sized>(&self, component: &T) -> Option<Arc<Spec>> {
        let id = component_id(component);
        self.shared
            .tables
            .lock()
            .components
            .get(&id)
            .map(|entry| Arc::clone(&entry.spec))
    }

    fn spec_by_tag<T: Component>(&self, tag: &str) -> Option<Arc<Spec>> {
        self.shared
            .tables
            .lock()
            .find(TypeId::of::<T>(), tag)
            .map(|entry| Arc::clone(&entry.spec))
    }

    fn specs(&self) -> Vec<Arc<Spec>> {
        self.shared
            .tables
            .lock()
            .components
            .values()
            .map(|entry| Arc::clone(&entry.spec))
            .collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.shared.tables.lock();
        f.debug_struct("Registry")
            .field("components", &tables.components.len())
            .field("providers", &tables.providers.len())
            .field("global_state", &tables.global_state)
            .finish()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let entries = std::mem::take(&mut self.tables.get_mut().components);
        if !entries.is_empty() {
            debug!(
                remaining = entries.len(),
                ui_lane = self.ui_lane.name(),
                "registry dropped with live components"
            );
        }
        drop(entries);
        if let Some(profiler) = &self.profiler {
            // Logs every torn-down object that is still alive.
            let _ = profiler.leaks();
        }
    }
}
