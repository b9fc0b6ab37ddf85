/// Where a component's transitions execute and how work is dispatched.
///
/// - `Ui*`: one shared single-threaded lane for every UI-mode component
/// - `Io*`: a dedicated worker lane per component instance
/// - `*Sync`: run inline when the caller is already on the target lane
/// - `*Async`: always enqueue, never inline
///
/// Inline execution only happens for `UiSync` in practice: see [`Mode::IoSync`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    #[default]
    UiSync,
    UiAsync,
    /// Behaves like `IoAsync`. The lane belongs to this one component, so
    /// the only caller already on it is the component's own job, and a
    /// request from inside its own job is always posted.
    IoSync,
    IoAsync,
}

impl Mode {
    /// True when the component shares the UI lane.
    pub const fn is_ui(self) -> bool {
        matches!(self, Mode::UiSync | Mode::UiAsync)
    }

    /// True when same-lane callers may run work inline.
    pub const fn is_inline_allowed(self) -> bool {
        matches!(self, Mode::UiSync | Mode::IoSync)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Mode::UiSync => "ui-sync",
            Mode::UiAsync => "ui-async",
            Mode::IoSync => "io-sync",
            Mode::IoAsync => "io-async",
        }
    }

    /// Parse the labels produced by [`Mode::label`] (case-insensitive, `_` accepted).
    pub fn parse(value: &str) -> Option<Mode> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ui-sync" => Some(Mode::UiSync),
            "ui-async" => Some(Mode::UiAsync),
            "io-sync" => Some(Mode::IoSync),
            "io-async" => Some(Mode::IoAsync),
            _ => None,
        }
    }
}
