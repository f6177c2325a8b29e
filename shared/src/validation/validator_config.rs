use std::default::Default;

/// Contains Config properties which will be used by the Consistency Validator
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Frames of fingerprints retained while waiting for every peer to
    /// report; older unmatched frames are discarded as unresolved
    pub window: u32,
    /// Recent local fingerprints kept for logging when a desync is detected
    pub diagnostic_ring_len: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            window: 64,
            diagnostic_ring_len: 16,
        }
    }
}
