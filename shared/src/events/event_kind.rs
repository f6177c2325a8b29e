use crate::events::MalformedEvent;

/// The closed vocabulary of lockstep commands.
///
/// The discriminant is the wire tag, and its ascending order is the
/// tie-break used when several events of one peer share a frame.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Explicit "nothing this frame" marker that fills a peer's barrier slot
    NoCommand = 0,
    Ally = 1,
    Move = 2,
    Attack = 3,
    Idle = 4,
    Scatter = 5,
    Deploy = 6,
    Place = 7,
    Produce = 8,
    Suspend = 9,
    Abandon = 10,
    Sell = 11,
    Repair = 12,
    Primary = 13,
    Special = 14,
    GameSpeed = 15,
    ResponseTime = 16,
    Timing = 17,
    Message = 18,
    /// Reserved heartbeat kind carrying a frame fingerprint
    FrameInfo = 19,
}

/// Longest chat text a Message event may carry
pub const MAX_MESSAGE_LEN: usize = 64;

impl EventKind {
    pub const ALL: [EventKind; 20] = [
        EventKind::NoCommand,
        EventKind::Ally,
        EventKind::Move,
        EventKind::Attack,
        EventKind::Idle,
        EventKind::Scatter,
        EventKind::Deploy,
        EventKind::Place,
        EventKind::Produce,
        EventKind::Suspend,
        EventKind::Abandon,
        EventKind::Sell,
        EventKind::Repair,
        EventKind::Primary,
        EventKind::Special,
        EventKind::GameSpeed,
        EventKind::ResponseTime,
        EventKind::Timing,
        EventKind::Message,
        EventKind::FrameInfo,
    ];

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Largest payload, in bytes, an event of this kind may carry
    pub fn max_payload_len(self) -> usize {
        match self {
            EventKind::NoCommand => 0,
            EventKind::Ally | EventKind::GameSpeed | EventKind::ResponseTime => 1,
            EventKind::Produce | EventKind::Suspend | EventKind::Abandon => 3,
            EventKind::Idle
            | EventKind::Scatter
            | EventKind::Deploy
            | EventKind::Sell
            | EventKind::Repair
            | EventKind::Primary
            | EventKind::Special
            | EventKind::Timing => 4,
            EventKind::Place => 7,
            EventKind::Move | EventKind::Attack | EventKind::FrameInfo => 8,
            EventKind::Message => 1 + MAX_MESSAGE_LEN,
        }
    }

    /// Whether the simulation ever sees events of this kind
    pub fn is_game_visible(self) -> bool {
        !matches!(self, EventKind::NoCommand | EventKind::FrameInfo)
    }
}

impl TryFrom<u8> for EventKind {
    type Error = MalformedEvent;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        EventKind::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(MalformedEvent::UnknownKind {
                value,
                max: EventKind::FrameInfo.to_u8(),
            })
    }
}
