mod error;
mod packet_queues;
mod peer_channel;
mod peer_state;
mod pending;
mod transport_buffer;
mod transport_config;

pub use error::{TransportError, TransportFault};
pub use packet_queues::{OutgoingDatagram, ReceivedDatagram, TransportHandle};
pub use peer_state::{PeerState, PeerStatus};
pub use pending::{PendingReceiveEntry, PendingSendEntry};
pub use transport_buffer::{ControlMessage, TransportBuffer};
pub use transport_config::TransportConfig;
