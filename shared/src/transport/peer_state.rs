use std::time::Duration;

use crate::types::{FrameNumber, PeerId};

/// Liveness of a remote participant
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeerStatus {
    Alive,
    /// Exceeded retransmission attempts
    Lost,
    /// Left the session with a graceful disconnect
    Departed,
}

/// Connection diagnostics for one remote participant
#[derive(Clone, Debug)]
pub struct PeerState {
    peer_id: PeerId,
    /// Highest frame through which every contribution from this peer has arrived
    last_ack_frame: Option<FrameNumber>,
    mean_round_trip: Duration,
    max_round_trip: Duration,
    has_round_trip_sample: bool,
    status: PeerStatus,
}

impl PeerState {
    pub fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            last_ack_frame: None,
            mean_round_trip: Duration::ZERO,
            max_round_trip: Duration::ZERO,
            has_round_trip_sample: false,
            status: PeerStatus::Alive,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn last_ack_frame(&self) -> Option<FrameNumber> {
        self.last_ack_frame
    }

    pub fn mean_round_trip(&self) -> Duration {
        self.mean_round_trip
    }

    pub fn max_round_trip(&self) -> Duration {
        self.max_round_trip
    }

    pub fn has_round_trip_sample(&self) -> bool {
        self.has_round_trip_sample
    }

    pub fn status(&self) -> PeerStatus {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status == PeerStatus::Alive
    }

    pub(crate) fn set_status(&mut self, status: PeerStatus) {
        self.status = status;
    }

    pub(crate) fn set_last_ack_frame(&mut self, frame: FrameNumber) {
        self.last_ack_frame = Some(frame);
    }

    /// Folds one round-trip sample into the running statistics.
    ///
    /// The mean is an exponentially weighted average (weight 1/8). The max
    /// jumps straight up to a larger sample and decays by 1/16 of the gap
    /// toward smaller ones, so a single spike ages out gradually.
    pub(crate) fn record_round_trip(&mut self, sample: Duration) {
        if !self.has_round_trip_sample {
            self.mean_round_trip = sample;
            self.max_round_trip = sample;
            self.has_round_trip_sample = true;
            return;
        }

        if sample >= self.mean_round_trip {
            self.mean_round_trip += (sample - self.mean_round_trip) / 8;
        } else {
            self.mean_round_trip -= (self.mean_round_trip - sample) / 8;
        }

        if sample >= self.max_round_trip {
            self.max_round_trip = sample;
        } else {
            self.max_round_trip -= (self.max_round_trip - sample) / 16;
        }
    }
}
