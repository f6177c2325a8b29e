mod error;
mod setup_handshake;
mod setup_info;

pub use error::{HandshakeError, SetupField};
pub use setup_handshake::{SetupHandshake, SetupStatus};
pub use setup_info::{SetupInfo, PROTOCOL_VERSION};
