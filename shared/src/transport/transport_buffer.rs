use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
    time::Instant,
};

use log::{debug, warn};

use crate::{
    connection::{
        error::PacketError,
        packet::{decode_ack_payload, encode_ack_payload, split_datagram, Packet},
        packet_type::PacketType,
    },
    events::Event,
    handshake::SetupInfo,
    session_state::SessionState,
    transport::{
        packet_queues::{OutgoingDatagram, PacketQueues},
        peer_channel::{PeerChannel, ReceiveOutcome},
        PeerStatus, TransportConfig, TransportError, TransportFault, TransportHandle,
    },
    types::{EntryId, PeerId},
};

/// Non-event traffic delivered in sequence order alongside events
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    Setup { peer_id: PeerId, info: SetupInfo },
    Disconnect { peer_id: PeerId },
}

/// Reliable, ordered, deduplicated delivery of packets between the local
/// peer and every remote peer, on top of an unreliable datagram service.
///
/// All state lives on the simulation thread. The I/O context only sees the
/// inbound and outbound datagram queues, through a [`TransportHandle`].
pub struct TransportBuffer {
    config: TransportConfig,
    local_peer: PeerId,
    channels: BTreeMap<PeerId, PeerChannel>,
    queues: Arc<PacketQueues>,
    control: VecDeque<ControlMessage>,
}

impl TransportBuffer {
    pub fn new(config: TransportConfig, state: &SessionState) -> Self {
        let channels = state
            .remote_peer_ids()
            .map(|peer_id| (peer_id, PeerChannel::new(peer_id)))
            .collect();
        Self {
            config,
            local_peer: state.local_peer(),
            channels,
            queues: Arc::new(PacketQueues::default()),
            control: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Handle the I/O context uses to exchange datagrams with this buffer
    pub fn handle(&self) -> TransportHandle {
        TransportHandle::new(self.queues.clone())
    }

    // Outgoing

    /// Queues an event payload for reliable delivery to `peer_id`.
    pub fn enqueue_send(
        &mut self,
        state: &SessionState,
        peer_id: PeerId,
        bytes: Vec<u8>,
    ) -> Result<EntryId, TransportError> {
        self.enqueue_packet(state, peer_id, PacketType::Event, bytes)
    }

    pub fn enqueue_packet(
        &mut self,
        state: &SessionState,
        peer_id: PeerId,
        packet_type: PacketType,
        bytes: Vec<u8>,
    ) -> Result<EntryId, TransportError> {
        self.check_outgoing(packet_type, &bytes)?;
        let channel = self
            .channels
            .get_mut(&peer_id)
            .ok_or(TransportError::UnknownPeer { peer_id })?;
        if !state.is_alive(peer_id) {
            return Err(TransportError::PeerNotAlive { peer_id });
        }
        Ok(channel.enqueue(packet_type, bytes))
    }

    /// Queues the same payload for every alive remote peer
    pub fn broadcast(
        &mut self,
        state: &SessionState,
        packet_type: PacketType,
        bytes: Vec<u8>,
    ) -> Result<Vec<(PeerId, EntryId)>, TransportError> {
        self.check_outgoing(packet_type, &bytes)?;
        let mut output = Vec::new();
        for peer_id in state.alive_peer_ids() {
            if let Some(channel) = self.channels.get_mut(&peer_id) {
                output.push((peer_id, channel.enqueue(packet_type, bytes.clone())));
            }
        }
        Ok(output)
    }

    fn check_outgoing(&self, packet_type: PacketType, bytes: &[u8]) -> Result<(), TransportError> {
        if !packet_type.is_reliable() {
            return Err(TransportError::NotReliable { packet_type });
        }
        if bytes.len() > self.config.max_payload_len {
            return Err(TransportError::PayloadTooLarge {
                len: bytes.len(),
                max: self.config.max_payload_len,
            });
        }
        Ok(())
    }

    /// Transmits every due entry, retransmits the ones whose timeout has
    /// elapsed, and flushes pending ACKs. Datagrams land in the outbound
    /// queue for the I/O context.
    ///
    /// A peer whose entry is due after `max_attempts` transmissions is
    /// marked lost and reported.
    pub fn service_send_queue(
        &mut self,
        state: &mut SessionState,
        now: &Instant,
    ) -> Vec<TransportFault> {
        let mut faults = Vec::new();
        let mut datagrams = Vec::new();

        for (peer_id, channel) in self.channels.iter_mut() {
            let peer_id = *peer_id;
            let Some(peer) = state.peer(peer_id) else {
                continue;
            };

            let mut packets = Vec::new();
            match peer.status() {
                PeerStatus::Lost => continue,
                PeerStatus::Departed => {}
                PeerStatus::Alive => {
                    let mean_round_trip = peer
                        .has_round_trip_sample()
                        .then(|| peer.mean_round_trip());
                    match channel.collect_due(self.local_peer, now, mean_round_trip, &self.config)
                    {
                        Ok(due) => packets = due,
                        Err(attempts) => {
                            warn!(
                                "Peer {} lost after {} unacknowledged transmissions",
                                peer_id, attempts
                            );
                            state.retire_peer(peer_id, PeerStatus::Lost);
                            channel.clear();
                            faults.push(TransportFault::PeerLost { peer_id, attempts });
                            continue;
                        }
                    }
                }
            }

            let ack_packets = Self::ack_packets(self.local_peer, channel, &self.config);
            for bytes in coalesce(ack_packets.iter().chain(packets.iter()), &self.config) {
                datagrams.push(OutgoingDatagram { peer_id, bytes });
            }
        }

        self.queues.push_outbound(datagrams);
        faults
    }

    fn ack_packets(local_peer: PeerId, channel: &mut PeerChannel, config: &TransportConfig) -> Vec<Packet> {
        if !channel.has_pending_acks() {
            return Vec::new();
        }
        let per_packet = (config.max_payload_len / 4).max(1);
        let sequence = channel.current_sequence();
        channel
            .take_pending_acks()
            .chunks(per_packet)
            .filter_map(|chunk| {
                Packet::new(local_peer, sequence, PacketType::Ack, encode_ack_payload(chunk)).ok()
            })
            .collect()
    }

    // Incoming

    /// Processes every datagram the I/O context has queued since the last call
    pub fn receive_datagrams(&mut self, state: &mut SessionState) -> Vec<TransportError> {
        let mut errors = Vec::new();
        for datagram in self.queues.take_inbound() {
            if let Err(error) =
                self.on_packet_received(state, datagram.peer_id, &datagram.bytes, &datagram.received_at)
            {
                errors.push(error);
            }
        }
        errors
    }

    /// Processes one datagram from `peer_id`.
    ///
    /// Every salvageable packet in the datagram is handled; the first
    /// problem encountered is returned. Rejected packets are not
    /// acknowledged, so their sender will retransmit them.
    pub fn on_packet_received(
        &mut self,
        state: &mut SessionState,
        peer_id: PeerId,
        bytes: &[u8],
        now: &Instant,
    ) -> Result<(), TransportError> {
        let status = state
            .peer(peer_id)
            .map(|peer| peer.status())
            .ok_or(TransportError::UnknownPeer { peer_id })?;
        if status == PeerStatus::Lost {
            debug!("Ignoring datagram from lost peer {}", peer_id);
            return Ok(());
        }
        let Some(channel) = self.channels.get_mut(&peer_id) else {
            return Err(TransportError::UnknownPeer { peer_id });
        };

        let mut first_error = None;
        let mut report = |error: TransportError| {
            warn!("{}", error);
            if first_error.is_none() {
                first_error = Some(error);
            }
        };

        let (packets, split_error) = split_datagram(bytes);
        for packet in packets {
            if packet.header.peer_id != peer_id {
                report(TransportError::MalformedPacket {
                    peer_id,
                    error: PacketError::SenderMismatch {
                        claimed: packet.header.peer_id,
                        actual: peer_id,
                    },
                });
                continue;
            }

            if packet.packet_type() == PacketType::Ack {
                match decode_ack_payload(&packet.payload) {
                    Ok(sequences) => {
                        for sequence in sequences {
                            if let Some(sample) = channel.acknowledge(sequence, now) {
                                if let Some(peer) = state.peer_mut(peer_id) {
                                    peer.record_round_trip(sample);
                                }
                            }
                        }
                    }
                    Err(error) => report(TransportError::MalformedPacket { peer_id, error }),
                }
                continue;
            }

            if let Err(error) = validate_payload(peer_id, packet.packet_type(), &packet.payload) {
                report(error);
                continue;
            }

            let sequence = packet.sequence();
            match channel.receive(
                sequence,
                packet.packet_type(),
                packet.payload,
                self.config.max_receive_window,
            ) {
                ReceiveOutcome::Stored => {}
                ReceiveOutcome::Duplicate => {
                    debug!("Duplicate sequence {} from peer {}", sequence, peer_id);
                }
                ReceiveOutcome::OutsideWindow => {
                    report(TransportError::OutsideReceiveWindow { peer_id, sequence });
                }
            }
        }

        if let Some(error) = split_error {
            report(TransportError::MalformedPacket { peer_id, error });
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Returns the events that are next in sequence from every peer, in
    /// ascending peer order, and marks them consumed. Setup and disconnect
    /// packets encountered on the way are queued for [`Self::drain_control`].
    ///
    /// Entries behind a gap stay buffered until the gap is filled.
    pub fn drain_received(&mut self, state: &SessionState) -> Vec<Event> {
        let mut output = Vec::new();
        for (peer_id, channel) in self.channels.iter_mut() {
            let peer_id = *peer_id;
            let entries = channel.drain_contiguous();
            if !state.is_alive(peer_id) {
                if !entries.is_empty() {
                    debug!(
                        "Discarding {} packets from departed peer {}",
                        entries.len(),
                        peer_id
                    );
                }
                continue;
            }
            for entry in entries {
                match entry.packet_type {
                    PacketType::Event | PacketType::Heartbeat => {
                        // validated on receipt
                        match Event::decode_all(&entry.payload_bytes) {
                            Ok(events) => output.extend(events),
                            Err(error) => warn!("Dropping events from peer {}: {}", peer_id, error),
                        }
                    }
                    PacketType::Setup => match SetupInfo::decode(&entry.payload_bytes) {
                        Ok(info) => self.control.push_back(ControlMessage::Setup { peer_id, info }),
                        Err(error) => warn!("Dropping setup from peer {}: {}", peer_id, error),
                    },
                    PacketType::Disconnect => {
                        self.control.push_back(ControlMessage::Disconnect { peer_id });
                    }
                    PacketType::Ack => {}
                }
            }
        }
        output
    }

    pub fn drain_control(&mut self) -> Vec<ControlMessage> {
        self.control.drain(..).collect()
    }

    /// Takes a peer out of the active set. Lost peers are forgotten
    /// entirely; departed peers keep receiving ACKs for retransmissions.
    pub fn retire_peer(&mut self, state: &mut SessionState, peer_id: PeerId, status: PeerStatus) -> bool {
        let retired = state.retire_peer(peer_id, status);
        if let Some(channel) = self.channels.get_mut(&peer_id) {
            match status {
                PeerStatus::Lost => channel.clear(),
                PeerStatus::Departed => channel.clear_outbound(),
                PeerStatus::Alive => {}
            }
        }
        retired
    }

    /// Number of entries to `peer_id` not yet acknowledged
    pub fn outstanding(&self, peer_id: PeerId) -> usize {
        self.channels
            .get(&peer_id)
            .map_or(0, |channel| channel.outstanding())
    }

    pub fn all_acknowledged(&self) -> bool {
        self.channels.values().all(|channel| channel.outstanding() == 0)
    }
}

fn validate_payload(
    peer_id: PeerId,
    packet_type: PacketType,
    payload: &[u8],
) -> Result<(), TransportError> {
    match packet_type {
        PacketType::Event | PacketType::Heartbeat => {
            let events = Event::decode_all(payload)
                .map_err(|error| TransportError::MalformedEvent { peer_id, error })?;
            if let Some(event) = events.iter().find(|event| event.origin() != peer_id) {
                return Err(TransportError::OriginMismatch {
                    peer_id,
                    origin: event.origin(),
                });
            }
            Ok(())
        }
        PacketType::Setup => SetupInfo::decode(payload)
            .map(|_| ())
            .map_err(|error| TransportError::MalformedSetup { peer_id, error }),
        PacketType::Disconnect | PacketType::Ack => Ok(()),
    }
}

/// Packs packets back to back into datagrams no larger than
/// `max_datagram_len`. A packet larger than the limit travels alone.
fn coalesce<'p>(packets: impl Iterator<Item = &'p Packet>, config: &TransportConfig) -> Vec<Vec<u8>> {
    let mut datagrams = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    for packet in packets {
        if !current.is_empty() && current.len() + packet.byte_length() > config.max_datagram_len {
            datagrams.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(&packet.to_bytes());
    }
    if !current.is_empty() {
        datagrams.push(current);
    }
    datagrams
}
