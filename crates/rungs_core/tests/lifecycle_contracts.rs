use std::sync::Mutex;

use rungs_core::lifecycle::{
    drive, path, Component, DriveOutcome, Params, State, Transaction, Transition, ALL_STATES,
};

/// Records which transition each hook belongs to, and the phase.
#[derive(Default)]
struct TripleRecorder {
    log: Mutex<Vec<(Transition, &'static str)>>,
}

impl TripleRecorder {
    fn push(&self, transition: Transition, phase: &'static str) {
        self.log.lock().unwrap().push((transition, phase));
    }

    fn take(&self) -> Vec<(Transition, &'static str)> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }
}

impl Component for TripleRecorder {
    fn will_set_up(&self, _: &Params) {
        self.push(Transition::SetUp, "will")
    }
    fn on_set_up(&self, _: &Params) {
        self.push(Transition::SetUp, "on")
    }
    fn did_set_up(&self, _: &Params) {
        self.push(Transition::SetUp, "did")
    }
    fn will_enter_foreground(&self) {
        self.push(Transition::EnterForeground, "will")
    }
    fn on_enter_foreground(&self) {
        self.push(Transition::EnterForeground, "on")
    }
    fn did_enter_foreground(&self) {
        self.push(Transition::EnterForeground, "did")
    }
    fn will_become_active(&self) {
        self.push(Transition::BecomeActive, "will")
    }
    fn on_become_active(&self) {
        self.push(Transition::BecomeActive, "on")
    }
    fn did_become_active(&self) {
        self.push(Transition::BecomeActive, "did")
    }
    fn will_become_inactive(&self) {
        self.push(Transition::BecomeInactive, "will")
    }
    fn on_become_inactive(&self) {
        self.push(Transition::BecomeInactive, "on")
    }
    fn did_become_inactive(&self) {
        self.push(Transition::BecomeInactive, "did")
    }
    fn will_enter_background(&self) {
        self.push(Transition::EnterBackground, "will")
    }
    fn on_enter_background(&self) {
        self.push(Transition::EnterBackground, "on")
    }
    fn did_enter_background(&self) {
        self.push(Transition::EnterBackground, "did")
    }
    fn will_tear_down(&self) {
        self.push(Transition::TearDown, "will")
    }
    fn on_tear_down(&self) {
        self.push(Transition::TearDown, "on")
    }
    fn did_tear_down(&self) {
        self.push(Transition::TearDown, "did")
    }
}

#[test]
fn every_walk_runs_exactly_the_triples_in_between() {
    let recorder = TripleRecorder::default();

    for from in ALL_STATES {
        for to in ALL_STATES {
            if from == to {
                continue;
            }

            let tx = Transaction::new(to);
            let mut landed = Vec::new();
            let outcome = drive(&recorder, &Params::new(), &tx, from, |_, s| landed.push(s));

            assert_eq!(outcome, DriveOutcome::Reached(to), "{from:?} -> {to:?}");

            let expected: Vec<(Transition, &'static str)> = path(from, to)
                .into_iter()
                .flat_map(|t| [(t, "will"), (t, "on"), (t, "did")])
                .collect();
            assert_eq!(recorder.take(), expected, "{from:?} -> {to:?}");

            // One landing per rung crossed, ending on the target.
            assert_eq!(landed.len(), from.id().abs_diff(to.id()) as usize);
            assert_eq!(landed.last(), Some(&to));
        }
    }
}

#[test]
fn descending_walks_use_descending_transitions_only() {
    for from in ALL_STATES {
        for to in ALL_STATES.into_iter().filter(|to| *to < from) {
            assert!(path(from, to).iter().all(|t| !t.is_ascending()));
        }
    }
}

#[test]
fn cancellation_between_steps_halts_on_the_rung_reached() {
    let recorder = TripleRecorder::default();
    let tx = Transaction::new(State::Active);

    let outcome = drive(&recorder, &Params::new(), &tx, State::Background, |transition, _| {
        if transition == Transition::EnterForeground {
            tx.cancel();
        }
    });

    assert_eq!(outcome, DriveOutcome::Canceled(State::Inactive));
    assert_eq!(
        recorder.take(),
        vec![
            (Transition::EnterForeground, "will"),
            (Transition::EnterForeground, "on"),
            (Transition::EnterForeground, "did"),
        ]
    );
}

#[test]
fn pre_canceled_transaction_still_runs_one_triple() {
    let recorder = TripleRecorder::default();
    let tx = Transaction::new(State::Down);
    tx.cancel();

    let outcome = drive(&recorder, &Params::new(), &tx, State::Active, |_, _| {});

    assert_eq!(outcome, DriveOutcome::Canceled(State::Inactive));
    assert_eq!(recorder.take().len(), 3);
}
