/// Identity of a participant within a session, carried in every packet header
pub type PeerId = u8;
/// Simulation frame counter
pub type FrameNumber = u32;
/// Per-sender packet sequence counter
pub type SequenceNumber = u32;
/// Handle returned when a payload is queued for reliable delivery
pub type EntryId = SequenceNumber;
