use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Convenient result alias for rungs_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Maps onto tracing levels in the runtime crate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Lifecycle,
    Registry,
    Scheduler,
    Config,
    Other,
}

/// Stable error "kind" for matching/branching.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    AlreadyRegistered,
    NotRegistered,
    LaneClosed,
    Io,
    Other,
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Registry-specific context: which (type, tag) pair was involved.
    Component {
        type_name: &'static str,
        tag: Cow<'static, str>,
    },
}

/// The one error type that crosses module boundaries in rungs.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    /// Fully-specified constructor (rarely needed at call sites).
    pub fn new(
        domain: Domain,
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            domain,
            kind,
            severity,
            message: message.into(),
            payload: Payload::None,
        }
    }

    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn trace() -> ErrB {
        ErrB::new(Severity::Trace)
    }
    #[inline]
    pub fn debug() -> ErrB {
        ErrB::new(Severity::Debug)
    }
    #[inline]
    pub fn info() -> ErrB {
        ErrB::new(Severity::Info)
    }
    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }
    #[inline]
    pub fn fatal() -> ErrB {
        ErrB::new(Severity::Fatal)
    }

    /// A component of the same type and tag (or the same instance) is already registered.
    pub fn already_registered(type_name: &'static str, tag: impl Into<Cow<'static, str>>) -> Self {
        let tag = tag.into();
        CoreError::warn()
            .domain(Domain::Registry)
            .kind(ErrorKind::AlreadyRegistered)
            .msgf(format_args!("{type_name} with tag {tag:?} is already registered"))
            .payload(Payload::Component { type_name, tag })
            .build()
    }

    /// A lifecycle request named a component the registry does not hold.
    ///
    /// Expected during teardown races, hence debug severity.
    pub fn not_registered(type_name: &'static str) -> Self {
        CoreError::debug()
            .domain(Domain::Registry)
            .kind(ErrorKind::NotRegistered)
            .msgf(format_args!("{type_name} is not registered"))
            .payload(Payload::Context {
                key: "component",
                value: Cow::Borrowed(type_name),
            })
            .build()
    }

    /// Work could not be posted because the target lane no longer runs.
    pub fn lane_closed(lane: impl Into<Cow<'static, str>>) -> Self {
        CoreError::warn()
            .domain(Domain::Scheduler)
            .kind(ErrorKind::LaneClosed)
            .msg("execution lane is closed; work dropped")
            .payload(Payload::Context {
                key: "lane",
                value: lane.into(),
            })
            .build()
    }

    /// True when this error reports a duplicate registration.
    pub fn is_already_registered(&self) -> bool {
        self.kind == ErrorKind::AlreadyRegistered
    }
}

/// Fluent builder that behaves like iterator chains (takes self, returns Self).
/// Defaults:
/// - domain = Other
/// - kind = Other
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    // -------- Guided setters --------

    /// Set/override the domain (defaults to Domain::Other).
    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    /// Set/override the kind (defaults to ErrorKind::Other).
    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    /// Set/override the message (defaults to "").
    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Formatting-friendly message setter.
    /// Note: still allocates once because we store as Cow<'static, str>.
    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    /// Only one payload: this replaces any previous payload (default is None).
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    // -------- Finish --------
    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<ErrB> for CoreError {
    fn from(b: ErrB) -> Self {
        b.build()
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::error()
            .domain(Domain::Other)
            .kind(ErrorKind::Io)
            .msg("io error")
            .payload(Payload::Context {
                key: "io",
                value: e.to_string().into(),
            })
            .build()
    }
}
