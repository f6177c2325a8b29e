use std::{
    collections::HashMap,
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
};

use log::{debug, warn};

use lockstep_shared::PeerId;

use super::{PacketSocket, RecvError, SendError};

const RECV_BUFFER_LEN: usize = 2048;

/// A non-blocking UDP socket with an address book mapping peer ids to
/// addresses. Datagrams from unknown addresses are discarded.
pub struct UdpPacketSocket {
    socket: UdpSocket,
    addresses: HashMap<PeerId, SocketAddr>,
    peers: HashMap<SocketAddr, PeerId>,
    buffer: Box<[u8; RECV_BUFFER_LEN]>,
}

impl UdpPacketSocket {
    pub fn bind(address: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(address)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            addresses: HashMap::new(),
            peers: HashMap::new(),
            buffer: Box::new([0; RECV_BUFFER_LEN]),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn add_peer(&mut self, peer_id: PeerId, address: SocketAddr) {
        if let Some(previous) = self.addresses.insert(peer_id, address) {
            self.peers.remove(&previous);
        }
        self.peers.insert(address, peer_id);
    }

    pub fn peer_address(&self, peer_id: PeerId) -> Option<SocketAddr> {
        self.addresses.get(&peer_id).copied()
    }
}

impl PacketSocket for UdpPacketSocket {
    fn send_to(&mut self, peer_id: PeerId, payload: &[u8]) -> Result<(), SendError> {
        let address = self.addresses.get(&peer_id).ok_or(SendError { peer_id })?;
        match self.socket.send_to(payload, address) {
            Ok(_) => Ok(()),
            // a full send buffer is just another lost datagram
            Err(error) if error.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(error) => {
                warn!("UDP send to {} failed: {}", address, error);
                Err(SendError { peer_id })
            }
        }
    }

    fn receive(&mut self) -> Result<Option<(PeerId, &[u8])>, RecvError> {
        loop {
            match self.socket.recv_from(&mut self.buffer[..]) {
                Ok((len, address)) => match self.peers.get(&address) {
                    Some(peer_id) => return Ok(Some((*peer_id, &self.buffer[..len]))),
                    None => debug!("Discarding {} bytes from unknown address {}", len, address),
                },
                Err(error) if error.kind() == ErrorKind::WouldBlock => return Ok(None),
                // ICMP port unreachable from a peer that has gone away
                Err(error) if error.kind() == ErrorKind::ConnectionReset => continue,
                Err(error) => {
                    warn!("UDP receive failed: {}", error);
                    return Err(RecvError);
                }
            }
        }
    }
}
