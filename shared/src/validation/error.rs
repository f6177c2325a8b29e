use thiserror::Error;

use crate::types::{FrameNumber, PeerId};

/// Faults raised by the Consistency Validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorFault {
    /// Fingerprints for the same frame differ; the simulations have diverged
    #[error("Desync detected at frame {frame} with peer {peer_id}: local fingerprint {local:#010x}, remote {remote:#010x}")]
    DesyncDetected {
        frame: FrameNumber,
        peer_id: PeerId,
        local: u32,
        remote: u32,
    },
}
