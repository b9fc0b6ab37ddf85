use super::Params;

/// Hooks invoked while a component walks the lifecycle ladder.
///
/// Every transition runs `will_*`, `on_*`, `did_*` in that order. All hooks
/// default to no-ops so implementors override only the phases they need.
///
/// Hooks take `&self`: the scheduler calls them from the component's lane
/// while other threads may hold the same `Arc`, so mutable state lives behind
/// the implementor's own synchronization. A panic escaping a hook is not
/// caught by the engine.
pub trait Component: Send + Sync + 'static {
    /// Emit lifecycle trace lines for this component.
    fn logs_lifecycle(&self) -> bool {
        false
    }

    fn will_set_up(&self, _params: &Params) {}
    fn on_set_up(&self, _params: &Params) {}
    fn did_set_up(&self, _params: &Params) {}

    fn will_enter_foreground(&self) {}
    fn on_enter_foreground(&self) {}
    fn did_enter_foreground(&self) {}

    fn will_become_active(&self) {}
    fn on_become_active(&self) {}
    fn did_become_active(&self) {}

    fn will_become_inactive(&self) {}
    fn on_become_inactive(&self) {}
    fn did_become_inactive(&self) {}

    fn will_enter_background(&self) {}
    fn on_enter_background(&self) {}
    fn did_enter_background(&self) {}

    fn will_tear_down(&self) {}
    fn on_tear_down(&self) {}
    fn did_tear_down(&self) {}
}
