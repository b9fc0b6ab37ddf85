mod events;
mod host;
mod lane;
mod latch;
mod profiler;
mod queue;
mod registry;
mod spec;

pub use events::TransitionEvent;
pub use host::{HostLifecycle, HostSignal};
pub use profiler::ObjectLeak;
pub use registry::Registry;
pub use spec::ComponentOptions;
