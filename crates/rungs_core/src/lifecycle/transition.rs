use super::State;

/// The six ladder transitions.
///
/// Each one moves a component exactly one rung and runs one `will/on/did`
/// hook triple. The first three climb, the last three descend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Transition {
    SetUp,
    EnterForeground,
    BecomeActive,
    BecomeInactive,
    EnterBackground,
    TearDown,
}

impl Transition {
    pub const fn id(self) -> u8 {
        match self {
            Transition::SetUp => 1,
            Transition::EnterForeground => 2,
            Transition::BecomeActive => 3,
            Transition::BecomeInactive => 4,
            Transition::EnterBackground => 5,
            Transition::TearDown => 6,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Transition::SetUp => "set_up",
            Transition::EnterForeground => "enter_foreground",
            Transition::BecomeActive => "become_active",
            Transition::BecomeInactive => "become_inactive",
            Transition::EnterBackground => "enter_background",
            Transition::TearDown => "tear_down",
        }
    }

    /// Rung the transition leaves.
    pub const fn start(self) -> State {
        match self {
            Transition::SetUp => State::Down,
            Transition::EnterForeground => State::Background,
            Transition::BecomeActive => State::Inactive,
            Transition::BecomeInactive => State::Active,
            Transition::EnterBackground => State::Inactive,
            Transition::TearDown => State::Background,
        }
    }

    /// Rung the transition lands on.
    pub const fn goal(self) -> State {
        match self {
            Transition::SetUp => State::Background,
            Transition::EnterForeground => State::Inactive,
            Transition::BecomeActive => State::Active,
            Transition::BecomeInactive => State::Inactive,
            Transition::EnterBackground => State::Background,
            Transition::TearDown => State::Down,
        }
    }

    pub const fn is_ascending(self) -> bool {
        matches!(
            self,
            Transition::SetUp | Transition::EnterForeground | Transition::BecomeActive
        )
    }

    /// Transition that climbs out of `state`, if any.
    pub const fn up_from(state: State) -> Option<Transition> {
        match state {
            State::Down => Some(Transition::SetUp),
            State::Background => Some(Transition::EnterForeground),
            State::Inactive => Some(Transition::BecomeActive),
            State::Active => None,
        }
    }

    /// Transition that descends out of `state`, if any.
    pub const fn down_from(state: State) -> Option<Transition> {
        match state {
            State::Active => Some(Transition::BecomeInactive),
            State::Inactive => Some(Transition::EnterBackground),
            State::Background => Some(Transition::TearDown),
            State::Down => None,
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical list of all transitions: ascending first, then descending.
pub const ALL_TRANSITIONS: [Transition; 6] = [
    Transition::SetUp,
    Transition::EnterForeground,
    Transition::BecomeActive,
    Transition::BecomeInactive,
    Transition::EnterBackground,
    Transition::TearDown,
];
