use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use crate::types::PeerId;

/// A datagram handed over by the I/O context
#[derive(Clone, Debug)]
pub struct ReceivedDatagram {
    pub peer_id: PeerId,
    pub bytes: Vec<u8>,
    pub received_at: Instant,
}

/// A datagram waiting for the I/O context to put it on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingDatagram {
    pub peer_id: PeerId,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct PacketQueues {
    inbound: Mutex<VecDeque<ReceivedDatagram>>,
    outbound: Mutex<VecDeque<OutgoingDatagram>>,
}

// A poisoned lock only means another thread panicked mid-push; the
// queue itself is still a valid VecDeque.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PacketQueues {
    pub(crate) fn take_inbound(&self) -> Vec<ReceivedDatagram> {
        lock(&self.inbound).drain(..).collect()
    }

    pub(crate) fn push_outbound(&self, datagrams: impl IntoIterator<Item = OutgoingDatagram>) {
        lock(&self.outbound).extend(datagrams);
    }
}

/// The I/O context's view of a Transport Buffer.
///
/// It may only append inbound datagrams and take outbound ones; every
/// access is serialized behind the queue locks, so the simulation thread
/// never observes a partially written queue.
#[derive(Clone)]
pub struct TransportHandle {
    queues: Arc<PacketQueues>,
}

impl TransportHandle {
    pub(crate) fn new(queues: Arc<PacketQueues>) -> Self {
        Self { queues }
    }

    pub fn push_inbound(&self, peer_id: PeerId, bytes: Vec<u8>, received_at: Instant) {
        lock(&self.queues.inbound).push_back(ReceivedDatagram {
            peer_id,
            bytes,
            received_at,
        });
    }

    pub fn pop_outbound(&self) -> Option<OutgoingDatagram> {
        lock(&self.queues.outbound).pop_front()
    }

    pub fn take_outbound(&self) -> Vec<OutgoingDatagram> {
        lock(&self.queues.outbound).drain(..).collect()
    }

    pub fn has_outbound(&self) -> bool {
        !lock(&self.queues.outbound).is_empty()
    }
}
