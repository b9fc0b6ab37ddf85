use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rungs::{
    Component, ComponentOptions, HostLifecycle, HostSignal, Mode, ObjectLeak, Params, Registry,
    RuntimeConfig, State,
};

#[derive(Default)]
struct Counter {
    set_ups: AtomicUsize,
    tear_downs: AtomicUsize,
}

impl Component for Counter {
    fn on_set_up(&self, _: &Params) {
        self.set_ups.fetch_add(1, Ordering::SeqCst);
    }

    fn on_tear_down(&self) {
        self.tear_downs.fetch_add(1, Ordering::SeqCst);
    }
}

struct Service {
    origin: &'static str,
}

impl Component for Service {}

fn follower(mode: Mode) -> ComponentOptions {
    ComponentOptions::new()
        .mode(mode)
        .follow_global_lifecycle(true)
}

#[test]
fn set_up_is_idempotent_per_type_and_tag() {
    let registry = Registry::new().unwrap();
    registry.set_global_state(State::Active);

    assert!(registry.set_up::<Counter>("main", follower(Mode::IoAsync)).unwrap());
    assert!(!registry.set_up::<Counter>("main", follower(Mode::IoAsync)).unwrap());
    registry.await_all();

    let counter = registry.lookup::<Counter>("main").unwrap();
    assert_eq!(counter.set_ups.load(Ordering::SeqCst), 1);
    assert_eq!(registry.state_of(counter.as_ref()), State::Active);
    assert_eq!(registry.len(), 1);
}

#[test]
fn set_up_prefers_a_registered_provider() {
    let registry = Registry::new().unwrap();
    registry.provide(|| Service { origin: "provider" });

    let created = registry
        .set_up_with("svc", ComponentOptions::new(), || Service { origin: "fallback" })
        .unwrap();
    assert!(created);
    assert_eq!(registry.lookup::<Service>("svc").unwrap().origin, "provider");

    let other = Registry::new().unwrap();
    other
        .set_up_with("svc", ComponentOptions::new(), || Service { origin: "fallback" })
        .unwrap();
    assert_eq!(other.lookup::<Service>("svc").unwrap().origin, "fallback");
}

#[test]
fn set_up_passes_params_to_the_setup_hooks() {
    struct Configured {
        seen: std::sync::Mutex<Option<u32>>,
    }

    impl Component for Configured {
        fn on_set_up(&self, params: &Params) {
            *self.seen.lock().unwrap() = params.get::<u32>("port").copied();
        }
    }

    let registry = Registry::new().unwrap();
    registry.set_global_state(State::Background);
    registry
        .set_up_with(
            "cfg",
            follower(Mode::UiAsync).params(Params::new().with("port", 8080_u32)),
            || Configured {
                seen: std::sync::Mutex::new(None),
            },
        )
        .unwrap();
    registry.await_all();

    let configured = registry.lookup::<Configured>("cfg").unwrap();
    assert_eq!(*configured.seen.lock().unwrap(), Some(8080));
    assert_eq!(
        registry.params_of(configured.as_ref()).get::<u32>("port"),
        Some(&8080)
    );
}

#[test]
fn tear_down_walks_down_and_unregisters() {
    let registry = Registry::new().unwrap();
    registry.set_global_state(State::Inactive);
    registry.set_up::<Counter>("c", follower(Mode::UiSync)).unwrap();
    registry.await_all();

    let counter = registry.lookup::<Counter>("c").unwrap();
    assert!(registry.tear_down::<Counter>("c"));
    registry.sync(counter.as_ref(), || {});
    registry.await_all();

    assert_eq!(counter.tear_downs.load(Ordering::SeqCst), 1);
    assert!(registry.lookup::<Counter>("c").is_none());
    assert!(registry.is_empty());
    assert_eq!(registry.state_of(counter.as_ref()), State::Down);
}

#[test]
fn tear_down_of_a_component_still_down_releases_it() {
    let registry = Registry::new().unwrap();
    registry.set_up::<Counter>("idle", ComponentOptions::new()).unwrap();
    let counter = registry.lookup::<Counter>("idle").unwrap();

    assert!(registry.tear_down::<Counter>("idle"));
    registry.sync(counter.as_ref(), || {});

    assert!(!registry.contains::<Counter>("idle"));
    assert_eq!(counter.tear_downs.load(Ordering::SeqCst), 0);
}

#[test]
fn tear_down_of_unknown_type_and_tag_is_a_no_op() {
    let registry = Registry::new().unwrap();
    registry.set_up::<Counter>("known", ComponentOptions::new()).unwrap();

    assert!(!registry.tear_down::<Counter>("unknown"));
    assert!(!registry.tear_down::<Service>("known"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn lookup_matches_concrete_type_and_tag() {
    let registry = Registry::new().unwrap();
    registry.set_up::<Counter>("a", ComponentOptions::new()).unwrap();
    registry
        .set_up_with("a", ComponentOptions::new(), || Service { origin: "x" })
        .unwrap();

    assert!(registry.lookup::<Counter>("a").is_some());
    assert!(registry.lookup::<Service>("a").is_some());
    assert!(registry.lookup::<Counter>("b").is_none());
}

#[test]
fn non_followers_ignore_global_state() {
    let registry = Registry::new().unwrap();
    registry.set_up::<Counter>("solo", ComponentOptions::new()).unwrap();

    registry.set_global_state(State::Active);
    registry.await_all();

    let counter = registry.lookup::<Counter>("solo").unwrap();
    assert_eq!(registry.state_of(counter.as_ref()), State::Down);
    assert_eq!(counter.set_ups.load(Ordering::SeqCst), 0);
}

#[test]
fn host_signals_drive_followers() {
    let registry = Registry::new().unwrap();
    let host = HostLifecycle::new(registry.clone());
    registry.set_up::<Counter>("ui", follower(Mode::UiAsync)).unwrap();
    registry.set_up::<Counter>("io", follower(Mode::IoSync)).unwrap();
    let ui = registry.lookup::<Counter>("ui").unwrap();
    let io = registry.lookup::<Counter>("io").unwrap();

    for (signal, expected) in [
        (HostSignal::Started, State::Inactive),
        (HostSignal::Resumed, State::Active),
        (HostSignal::Paused, State::Inactive),
        (HostSignal::Stopped, State::Background),
    ] {
        host.signal(signal);
        registry.await_all();
        assert_eq!(registry.state_of(ui.as_ref()), expected, "{signal:?}");
        assert_eq!(registry.state_of(io.as_ref()), expected, "{signal:?}");
    }

    assert_eq!(ui.set_ups.load(Ordering::SeqCst), 1);
    assert_eq!(io.set_ups.load(Ordering::SeqCst), 1);
}

#[test]
fn profiling_reports_components_kept_alive_past_teardown() {
    let registry = Registry::with_config(RuntimeConfig {
        profile_objects: true,
        ..RuntimeConfig::default()
    })
    .unwrap();

    registry
        .set_up::<Counter>("kept", ComponentOptions::new().mode(Mode::IoAsync))
        .unwrap();
    let kept = registry.lookup::<Counter>("kept").unwrap();
    registry.set_state(kept.as_ref(), State::Active);
    registry.await_all();
    assert!(registry.object_leaks().is_empty());

    registry.tear_down::<Counter>("kept");
    registry.await_all();
    assert!(!registry.contains::<Counter>("kept"));
    assert_eq!(
        registry.object_leaks(),
        vec![ObjectLeak {
            type_name: std::any::type_name::<Counter>(),
            tag: "kept".to_string(),
        }]
    );

    // The lane may still hold the walk's own handle for a moment.
    drop(kept);
    let deadline = Instant::now() + Duration::from_secs(5);
    while !registry.object_leaks().is_empty() {
        assert!(Instant::now() < deadline, "released component still reported");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn profiling_is_off_by_default() {
    let registry = Registry::new().unwrap();
    registry
        .set_up::<Counter>("c", ComponentOptions::new().mode(Mode::IoAsync))
        .unwrap();
    let counter = registry.lookup::<Counter>("c").unwrap();
    registry.set_state(counter.as_ref(), State::Active);
    registry.tear_down::<Counter>("c");
    registry.await_all();

    assert!(!registry.config().profile_objects);
    assert!(registry.object_leaks().is_empty());
}
