use std::{net::SocketAddr, time::Instant};

use log::info;

use lockstep_shared::{
    EventKind, EventPayload, FrameNumber, PeerId, Session, SessionEvent, Simulation,
};

use crate::{
    transport::{PacketSocket, UdpPacketSocket},
    IoThread, PeerConfig, PeerError,
};

/// One participant of a lockstep session, connected to the others over a
/// [`PacketSocket`]
pub struct Peer {
    session: Session,
    io_thread: IoThread,
    local_address: Option<SocketAddr>,
}

impl Peer {
    /// Creates a Peer exchanging datagrams over `socket`
    pub fn new<S: PacketSocket + 'static>(config: PeerConfig, socket: S) -> Result<Self, PeerError> {
        let session = Session::new(config.session);
        let io_thread = IoThread::spawn(socket, session.handle(), config.poll_interval)
            .map_err(PeerError::Spawn)?;

        Ok(Self {
            session,
            io_thread,
            local_address: None,
        })
    }

    /// Binds a UDP socket at `config.bind_address` and creates a Peer using
    /// it. Every remote peer of the session must have an address.
    pub fn bind_udp(config: PeerConfig) -> Result<Self, PeerError> {
        let address = config.bind_address;
        let mut socket =
            UdpPacketSocket::bind(address).map_err(|source| PeerError::Bind { address, source })?;

        for peer_id in &config.session.remote_peers {
            let remote = config
                .peer_addresses
                .iter()
                .find(|(other, _)| other == peer_id)
                .map(|(_, address)| *address)
                .ok_or(PeerError::MissingAddress { peer_id: *peer_id })?;
            socket.add_peer(*peer_id, remote);
        }

        let local_address = socket
            .local_addr()
            .map_err(|source| PeerError::Bind { address, source })?;
        info!(
            "Peer {} listening on {}",
            config.session.local_peer, local_address
        );

        let mut peer = Self::new(config, socket)?;
        peer.local_address = Some(local_address);
        Ok(peer)
    }

    /// Must be called regularly, at least once per frame
    pub fn update<S: Simulation>(&mut self, simulation: &mut S) {
        self.session.update(&Instant::now(), simulation);
    }

    pub fn submit(&mut self, kind: EventKind, payload: EventPayload) -> Result<(), PeerError> {
        self.session.submit(kind, payload)?;
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.session.take_events()
    }

    pub fn quit(&mut self) {
        self.session.quit(&Instant::now());
    }

    pub fn is_quit_complete(&self) -> bool {
        self.session.is_quit_complete(&Instant::now())
    }

    pub fn local_peer(&self) -> PeerId {
        self.session.local_peer()
    }

    pub fn frame(&self) -> FrameNumber {
        self.session.frame()
    }

    /// Address of the bound UDP socket, if the Peer was created with
    /// [`Peer::bind_udp`]
    pub fn local_address(&self) -> Option<SocketAddr> {
        self.local_address
    }

    pub fn is_io_running(&self) -> bool {
        self.io_thread.is_running()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
