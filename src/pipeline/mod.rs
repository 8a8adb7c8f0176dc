// src/pipeline/mod.rs

pub mod event_bus;
pub mod frame_history;
pub mod metrics;
pub mod sampler;
pub mod session;
pub mod sink;

pub use session::{Session, SessionReport};
pub use sink::LogSink;
