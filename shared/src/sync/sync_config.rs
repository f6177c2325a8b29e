use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the Frame Synchronizer
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Simulation frames executed per second
    pub frame_rate: u16,
    /// Frames a command is scheduled into the future at session start, and
    /// the lower bound for MaxAhead afterwards
    pub lookahead: u32,
    /// Upper bound for MaxAhead
    pub max_lookahead: u32,
    /// Frames added on top of the worst round trip when recalculating MaxAhead
    pub safety_margin: u32,
    /// How often MaxAhead is recalculated
    pub recalculate_interval: Duration,
}

impl SyncConfig {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / u32::from(self.frame_rate.max(1))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            frame_rate: 15,
            lookahead: 3,
            max_lookahead: 15,
            safety_margin: 1,
            recalculate_interval: Duration::from_secs(2),
        }
    }
}
