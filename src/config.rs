use std::time::Duration;

use crate::engine::DEFAULT_CHANNEL_CAPACITY;

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delay between attempts of the polling detection strategies.
    pub poll_interval: Duration,
    /// Maximum polling attempts before a watcher gives up and finishes anyway.
    pub poll_ceiling: u32,
    /// Extra wait before finishing on engine generations that report a script
    /// as loaded before it has actually executed.
    pub ready_state_defer: Duration,
    /// Capacity of the engine's command channel.
    pub channel_capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            poll_ceiling: 200, // ~10s worst case at the default interval
            ready_state_defer: Duration::from_millis(4),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
