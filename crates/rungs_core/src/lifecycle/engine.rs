use super::{Component, Params, State, Transaction, Transition};

/// How a [`drive`] call ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriveOutcome {
    /// Already at the target; no hooks ran.
    Unchanged(State),
    /// Walked all the way to the target.
    Reached(State),
    /// A newer transaction superseded this one; the walk halted on this rung.
    Canceled(State),
}

impl DriveOutcome {
    /// The rung the component was left on.
    pub fn state(self) -> State {
        match self {
            DriveOutcome::Unchanged(s) | DriveOutcome::Reached(s) | DriveOutcome::Canceled(s) => s,
        }
    }

    pub fn is_canceled(self) -> bool {
        matches!(self, DriveOutcome::Canceled(_))
    }
}

/// Next transition on the way from `current` toward `target`.
///
/// `None` when they are equal. Never skips a rung.
pub fn next_transition(current: State, target: State) -> Option<Transition> {
    if current < target {
        Transition::up_from(current)
    } else if current > target {
        Transition::down_from(current)
    } else {
        None
    }
}

/// Run one `will -> on -> did` hook triple.
///
/// Panics from hooks propagate to the caller untouched.
pub fn run_hooks(component: &dyn Component, transition: Transition, params: &Params) {
    let logs = component.logs_lifecycle();
    match transition {
        Transition::SetUp => {
            component.will_set_up(params);
            if logs {
                tracing::trace!(?params, "on_set_up");
            }
            component.on_set_up(params);
            component.did_set_up(params);
        }
        Transition::EnterForeground => {
            component.will_enter_foreground();
            if logs {
                tracing::trace!("on_enter_foreground");
            }
            component.on_enter_foreground();
            component.did_enter_foreground();
        }
        Transition::BecomeActive => {
            component.will_become_active();
            if logs {
                tracing::trace!("on_become_active");
            }
            component.on_become_active();
            component.did_become_active();
        }
        Transition::BecomeInactive => {
            component.will_become_inactive();
            if logs {
                tracing::trace!("on_become_inactive");
            }
            component.on_become_inactive();
            component.did_become_inactive();
        }
        Transition::EnterBackground => {
            component.will_enter_background();
            if logs {
                tracing::trace!("on_enter_background");
            }
            component.on_enter_background();
            component.did_enter_background();
        }
        Transition::TearDown => {
            component.will_tear_down();
            if logs {
                tracing::trace!("on_tear_down");
            }
            component.on_tear_down();
            component.did_tear_down();
        }
    }
}

/// Walk a component from `from` toward the transaction's target one rung at a time.
///
/// After each hook triple `on_step(transition, new_state)` is called so the
/// caller can commit the new rung (and unregister on reaching `Down`). The
/// walk stops when the target is reached, or when the transaction has been
/// canceled; cancellation is only looked at between triples, so a triple
/// that has started always completes.
pub fn drive<F>(
    component: &dyn Component,
    params: &Params,
    transaction: &Transaction,
    from: State,
    mut on_step: F,
) -> DriveOutcome
where
    F: FnMut(Transition, State),
{
    let target = transaction.target();
    let mut current = from;

    if current == target {
        return DriveOutcome::Unchanged(current);
    }

    while let Some(transition) = next_transition(current, target) {
        run_hooks(component, transition, params);
        current = transition.goal();
        on_step(transition, current);

        if current == target {
            return DriveOutcome::Reached(current);
        }
        if transaction.is_canceled() {
            return DriveOutcome::Canceled(current);
        }
    }

    DriveOutcome::Reached(current)
}

//
// Tests
//
