use smol::channel::{self, Receiver, Sender, TryRecvError};

use lockstep_shared::PeerId;

use super::{PacketSocket, RecvError, SendError};

type Datagram = (PeerId, Box<[u8]>);

/// An in-process datagram socket. Every socket of a mesh can reach every
/// other; nothing is ever lost.
pub struct ChannelSocket {
    peer_id: PeerId,
    senders: Vec<(PeerId, Sender<Datagram>)>,
    receiver: Receiver<Datagram>,
    current_payload: Option<Box<[u8]>>,
}

impl ChannelSocket {
    /// Builds a fully connected set of sockets, one per peer id
    pub fn mesh(peer_ids: &[PeerId]) -> Vec<ChannelSocket> {
        let (senders, receivers): (Vec<_>, Vec<_>) = peer_ids
            .iter()
            .map(|peer_id| {
                let (sender, receiver) = channel::unbounded();
                ((*peer_id, sender), receiver)
            })
            .unzip();

        peer_ids
            .iter()
            .zip(receivers)
            .map(|(peer_id, receiver)| ChannelSocket {
                peer_id: *peer_id,
                senders: senders
                    .iter()
                    .filter(|(other, _)| other != peer_id)
                    .cloned()
                    .collect(),
                receiver,
                current_payload: None,
            })
            .collect()
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }
}

impl PacketSocket for ChannelSocket {
    fn send_to(&mut self, peer_id: PeerId, payload: &[u8]) -> Result<(), SendError> {
        let (_, sender) = self
            .senders
            .iter()
            .find(|(other, _)| *other == peer_id)
            .ok_or(SendError { peer_id })?;
        sender
            .send_blocking((self.peer_id, payload.into()))
            .map_err(|_| SendError { peer_id })
    }

    fn receive(&mut self) -> Result<Option<(PeerId, &[u8])>, RecvError> {
        match self.receiver.try_recv() {
            Ok((peer_id, payload)) => {
                let payload = self.current_payload.insert(payload);
                Ok(Some((peer_id, &payload[..])))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(RecvError),
        }
    }
}
