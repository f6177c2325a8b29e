use crate::{events::Event, types::FrameNumber};

/// The game simulation driven by a [`crate::Session`].
///
/// Implementations must be deterministic: no wall-clock reads, no
/// unseeded randomness, no floating point in fingerprinted state and no
/// iteration over containers with unspecified order.
pub trait Simulation {
    /// Applies one frame's events, in the order given, and returns a
    /// fingerprint of the resulting state.
    fn execute_frame(&mut self, frame: FrameNumber, events: &[Event]) -> u32;
}
