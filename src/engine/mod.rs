pub mod engine;
pub mod events;
pub mod handle;
pub mod inject;
pub mod queue;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub use engine::LoaderEngine;
pub use events::{LoaderCommand, LoaderEvent};
pub use handle::LoaderHandle;
pub use queue::{BatchCallback, LoadBatch, Payload, ResourceKind, StyleEntry};
