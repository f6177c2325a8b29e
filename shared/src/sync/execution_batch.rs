use crate::{
    events::Event,
    types::{FrameNumber, PeerId},
};

/// Everything the simulation needs to execute one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionBatch {
    pub frame: FrameNumber,
    /// Game-visible events, ordered by origin peer then event kind
    pub events: Vec<Event>,
    /// Peers whose contribution for this frame arrived
    pub contributors: Vec<PeerId>,
    /// Peers treated as contributing nothing because they are gone
    pub lost: Vec<PeerId>,
}
