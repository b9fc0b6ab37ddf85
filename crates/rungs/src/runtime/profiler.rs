use std::sync::Weak;

use parking_lot::Mutex;
use rungs_core::lifecycle::Component;
use tracing::{debug, warn};

/// A component that reached teardown but is still referenced somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLeak {
    pub type_name: &'static str,
    pub tag: String,
}

struct Tracked {
    type_name: &'static str,
    tag: String,
    component: Weak<dyn Component>,
    torn_down: bool,
}

/// Follows components from their first setup to their teardown.
///
/// Holds only weak handles, so tracking never keeps a component alive.
#[derive(Default)]
pub(crate) struct ObjectProfiler {
    tracked: Mutex<Vec<Tracked>>,
}

impl ObjectProfiler {
    pub(crate) fn did_create(
        &self,
        type_name: &'static str,
        tag: &str,
        component: &Weak<dyn Component>,
    ) {
        let mut tracked = self.tracked.lock();
        if let Some(entry) = tracked
            .iter_mut()
            .find(|entry| entry.component.ptr_eq(component))
        {
            // Set up again after a teardown it survived.
            entry.torn_down = false;
            return;
        }
        tracked.push(Tracked {
            type_name,
            tag: tag.to_string(),
            component: component.clone(),
            torn_down: false,
        });
        debug!(component = type_name, tag, "object created");
    }

    pub(crate) fn will_destroy(
        &self,
        type_name: &'static str,
        tag: &str,
        component: &Weak<dyn Component>,
    ) {
        let mut tracked = self.tracked.lock();
        match tracked
            .iter_mut()
            .find(|entry| entry.component.ptr_eq(component))
        {
            Some(entry) => {
                entry.torn_down = true;
                debug!(component = type_name, tag, "object will be destroyed");
            }
            None => warn!(
                component = type_name,
                tag, "teardown of an object that was never set up"
            ),
        }
    }

    /// Forget dropped objects and report torn-down ones still alive.
    pub(crate) fn leaks(&self) -> Vec<ObjectLeak> {
        let mut tracked = self.tracked.lock();
        tracked.retain(|entry| {
            let alive = entry.component.strong_count() > 0;
            if !alive && entry.torn_down {
                debug!(component = entry.type_name, tag = %entry.tag, "object destroyed");
            }
            alive
        });

        tracked
            .iter()
            .filter(|entry| entry.torn_down)
            .map(|entry| {
                warn!(
                    component = entry.type_name,
                    tag = %entry.tag,
                    strong = entry.component.strong_count(),
                    "object outlived its teardown"
                );
                ObjectLeak {
                    type_name: entry.type_name,
                    tag: entry.tag.clone(),
                }
            })
            .collect()
    }

    pub(crate) fn tracked(&self) -> usize {
        self.tracked.lock().len()
    }
}

impl std::fmt::Debug for ObjectProfiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectProfiler")
            .field("tracked", &self.tracked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Widget;
    impl Component for Widget {}

    fn handle(component: &Arc<dyn Component>) -> Weak<dyn Component> {
        Arc::downgrade(component)
    }

    #[test]
    fn torn_down_object_still_referenced_is_a_leak() {
        let profiler = ObjectProfiler::default();
        let widget: Arc<dyn Component> = Arc::new(Widget);

        profiler.did_create("Widget", "w", &handle(&widget));
        assert!(profiler.leaks().is_empty());

        profiler.will_destroy("Widget", "w", &handle(&widget));
        assert_eq!(
            profiler.leaks(),
            vec![ObjectLeak {
                type_name: "Widget",
                tag: "w".to_string()
            }]
        );

        drop(widget);
        assert!(profiler.leaks().is_empty());
        assert_eq!(profiler.tracked(), 0);
    }

    #[test]
    fn repeated_setup_tracks_one_entry() {
        let profiler = ObjectProfiler::default();
        let widget: Arc<dyn Component> = Arc::new(Widget);

        profiler.did_create("Widget", "w", &handle(&widget));
        profiler.will_destroy("Widget", "w", &handle(&widget));
        profiler.did_create("Widget", "w", &handle(&widget));

        assert_eq!(profiler.tracked(), 1);
        assert!(profiler.leaks().is_empty());
    }

    #[test]
    fn teardown_without_setup_is_not_tracked() {
        let profiler = ObjectProfiler::default();
        let widget: Arc<dyn Component> = Arc::new(Widget);

        profiler.will_destroy("Widget", "w", &handle(&widget));
        assert_eq!(profiler.tracked(), 0);
    }
}
