use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the Transport Buffer
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Transmissions of one entry before its peer is declared lost
    pub max_attempts: u32,
    /// Smallest wait before an unacknowledged entry is retransmitted
    pub min_retry_timeout: Duration,
    /// Ceiling for the exponentially backed-off retry timeout
    pub max_retry_timeout: Duration,
    /// Multiple of the mean round trip used as an entry's first retry
    /// timeout, when that exceeds `min_retry_timeout`
    pub rtt_resend_factor: f32,
    /// Largest payload a single packet may carry
    pub max_payload_len: usize,
    /// Largest datagram assembled when coalescing packets
    pub max_datagram_len: usize,
    /// How far ahead of the next expected sequence an inbound packet may
    /// be before it is discarded unacknowledged
    pub max_receive_window: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            min_retry_timeout: Duration::from_millis(100),
            max_retry_timeout: Duration::from_secs(1),
            rtt_resend_factor: 1.5,
            max_payload_len: 512,
            max_datagram_len: 1200,
            max_receive_window: 1024,
        }
    }
}
