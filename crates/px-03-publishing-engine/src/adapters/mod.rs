//! # Adapters
//!
//! In-memory implementations of the engine's outbound ports, for testing
//! and for embedders that keep the graph in process memory.

pub mod clock;
pub mod event_handler;
pub mod graph_store;

pub use clock::{FixedTimeSource, SystemTimeSource};
pub use event_handler::{RecordingNotificationSink, TracingNotificationSink};
pub use graph_store::InMemoryGraphStore;
