use super::{engine::next_transition, State, Transition, ALL_STATES, ALL_TRANSITIONS};

/// Lifecycle ladder graph derived from the state/transition tables.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionGraph {
    pub states: Vec<State>,
    pub transitions: Vec<TransitionEdge>,
}

/// Directed ladder edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransitionEdge {
    pub start: State,
    pub transition: Transition,
    pub goal: State,
}

/// Build the canonical ladder graph.
pub fn transition_graph() -> TransitionGraph {
    let transitions = ALL_TRANSITIONS
        .into_iter()
        .map(|transition| TransitionEdge {
            start: transition.start(),
            transition,
            goal: transition.goal(),
        })
        .collect();

    TransitionGraph {
        states: ALL_STATES.to_vec(),
        transitions,
    }
}

/// Transitions an uncanceled walk from `from` to `to` would run, in order.
pub fn path(from: State, to: State) -> Vec<Transition> {
    let mut steps = Vec::new();
    let mut current = from;
    while let Some(transition) = next_transition(current, to) {
        steps.push(transition);
        current = transition.goal();
    }
    steps
}
