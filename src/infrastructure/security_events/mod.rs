mod in_memory_recorder;
mod tracing_logger;

pub use in_memory_recorder::{InMemorySecurityEventRecorder, DEFAULT_RECORDER_CAPACITY};
pub use tracing_logger::{FanOutSecurityEventLogger, TracingSecurityEventLogger};
