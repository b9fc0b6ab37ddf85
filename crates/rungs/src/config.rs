use std::env;

use rungs_core::error::{CoreError, Domain, ErrorKind, Payload, Result};

pub const DEFAULT_UI_LANE: &str = "rungs-ui";
pub const DEFAULT_IO_LANE_PREFIX: &str = "rungs-io";
pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// What a lane does when lifecycle work panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicPolicy {
    /// Log the panic and keep serving the lane.
    #[default]
    Isolate,
    /// Log the panic and close the lane; later work on it is dropped.
    Terminate,
}

impl PanicPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "isolate" => Some(Self::Isolate),
            "terminate" => Some(Self::Terminate),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Isolate => "isolate",
            Self::Terminate => "terminate",
        }
    }
}

/// Runtime knobs for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub ui_lane_name: String,
    /// IO lanes are named `{io_lane_prefix}-{n}`.
    pub io_lane_prefix: String,
    pub panic_policy: PanicPolicy,
    /// Buffered transition events per subscriber before the oldest are dropped.
    pub event_capacity: usize,
    /// Log every ladder step at debug, not only for components that ask for it.
    pub log_lifecycle: bool,
    /// Track components from setup to teardown and report those still
    /// alive after teardown. See [`Registry::object_leaks`](crate::Registry::object_leaks).
    pub profile_objects: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ui_lane_name: DEFAULT_UI_LANE.to_string(),
            io_lane_prefix: DEFAULT_IO_LANE_PREFIX.to_string(),
            panic_policy: PanicPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log_lifecycle: false,
            profile_objects: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `RUNGS_*` environment variables.
    ///
    /// Unset variables keep their default; malformed values are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = env::var("RUNGS_UI_LANE") {
            config.ui_lane_name = name;
        }
        if let Ok(prefix) = env::var("RUNGS_IO_LANE_PREFIX") {
            config.io_lane_prefix = prefix;
        }
        if let Ok(policy) = env::var("RUNGS_PANIC_POLICY") {
            config.panic_policy = PanicPolicy::parse(&policy)
                .ok_or_else(|| invalid("RUNGS_PANIC_POLICY", policy))?;
        }
        if let Ok(capacity) = env::var("RUNGS_EVENT_CAPACITY") {
            config.event_capacity = capacity
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| invalid("RUNGS_EVENT_CAPACITY", capacity))?;
        }
        if let Ok(flag) = env::var("RUNGS_LOG_LIFECYCLE") {
            config.log_lifecycle =
                parse_bool(&flag).ok_or_else(|| invalid("RUNGS_LOG_LIFECYCLE", flag))?;
        }
        if let Ok(flag) = env::var("RUNGS_PROFILE_OBJECTS") {
            config.profile_objects =
                parse_bool(&flag).ok_or_else(|| invalid("RUNGS_PROFILE_OBJECTS", flag))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ui_lane_name.trim().is_empty() {
            return Err(invalid("ui_lane_name", String::new()));
        }
        if self.io_lane_prefix.trim().is_empty() {
            return Err(invalid("io_lane_prefix", String::new()));
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "0".to_string()));
        }
        Ok(())
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: String) -> CoreError {
    CoreError::error()
        .domain(Domain::Config)
        .kind(ErrorKind::InvalidArgument)
        .msgf(format_args!("invalid value {value:?} for {key}"))
        .payload(Payload::Context {
            key,
            value: value.into(),
        })
        .build()
}
