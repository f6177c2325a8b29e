use std::time::{Duration, Instant};

use crate::connection::packet_type::PacketType;

/// A reliable packet awaiting acknowledgment
#[derive(Clone, Debug)]
pub struct PendingSendEntry {
    pub packet_type: PacketType,
    pub payload_bytes: Vec<u8>,
    /// None until the first transmission
    pub first_sent_at: Option<Instant>,
    pub last_sent_at: Option<Instant>,
    pub attempt_count: u32,
    pub retry_timeout: Duration,
    pub acknowledged: bool,
}

impl PendingSendEntry {
    pub fn new(packet_type: PacketType, payload_bytes: Vec<u8>) -> Self {
        Self {
            packet_type,
            payload_bytes,
            first_sent_at: None,
            last_sent_at: None,
            attempt_count: 0,
            retry_timeout: Duration::ZERO,
            acknowledged: false,
        }
    }

    /// Whether the entry should be put on the wire at `now`
    pub fn is_due(&self, now: &Instant) -> bool {
        if self.acknowledged {
            return false;
        }
        match self.last_sent_at {
            None => true,
            Some(last_sent_at) => now.saturating_duration_since(last_sent_at) > self.retry_timeout,
        }
    }
}

/// A packet received but not yet consumed by the Frame Synchronizer
#[derive(Clone, Debug)]
pub struct PendingReceiveEntry {
    pub packet_type: PacketType,
    pub payload_bytes: Vec<u8>,
    pub acknowledgment_sent: bool,
    pub consumed: bool,
}

impl PendingReceiveEntry {
    pub fn new(packet_type: PacketType, payload_bytes: Vec<u8>) -> Self {
        Self {
            packet_type,
            payload_bytes,
            acknowledgment_sent: false,
            consumed: false,
        }
    }
}
