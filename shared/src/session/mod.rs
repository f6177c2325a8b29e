mod error;
mod session;
mod session_config;
mod session_event;
mod simulation;

pub use error::{SessionError, SessionFault};
pub use session::Session;
pub use session_config::SessionConfig;
pub use session_event::SessionEvent;
pub use simulation::Simulation;
