/// Rungs of the lifecycle ladder, lowest first.
///
/// The derived ordering is the ladder order and drives the stepping engine:
/// - Down: not instantiated / torn down
/// - Background: set up, not visible
/// - Inactive: in the foreground, not interactive
/// - Active: fully live and interactive
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum State {
    #[default]
    Down,
    Background,
    Inactive,
    Active,
}

/// Internal, compact IDs used for error payloads and transition events.
impl State {
    pub const fn id(self) -> u8 {
        match self {
            State::Down => 0,
            State::Background => 1,
            State::Inactive => 2,
            State::Active => 3,
        }
    }

    pub const fn from_id(id: u8) -> Option<State> {
        match id {
            0 => Some(State::Down),
            1 => Some(State::Background),
            2 => Some(State::Inactive),
            3 => Some(State::Active),
            _ => None,
        }
    }

    /// Stable, human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            State::Down => "Down",
            State::Background => "Background",
            State::Inactive => "Inactive",
            State::Active => "Active",
        }
    }

    /// The rung directly above, or `None` at the top.
    pub const fn next_up(self) -> Option<State> {
        match self {
            State::Down => Some(State::Background),
            State::Background => Some(State::Inactive),
            State::Inactive => Some(State::Active),
            State::Active => None,
        }
    }

    /// The rung directly below, or `None` at the bottom.
    pub const fn next_down(self) -> Option<State> {
        match self {
            State::Down => None,
            State::Background => Some(State::Down),
            State::Inactive => Some(State::Background),
            State::Active => Some(State::Inactive),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical list of all rungs, in ladder order.
pub const ALL_STATES: [State; 4] = [
    State::Down,
    State::Background,
    State::Inactive,
    State::Active,
];
