use crate::{
    session::SessionFault,
    types::{FrameNumber, PeerId},
};

/// Notifications queued for the host by [`crate::Session::update`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Every peer's setup matched; frame 0 is under way
    Started,
    FrameExecuted { frame: FrameNumber, fingerprint: u32 },
    /// The peer stopped acknowledging and was removed from the barrier
    PeerLost(PeerId),
    /// The peer left with a graceful disconnect
    PeerDisconnected(PeerId),
    Fault(SessionFault),
}
