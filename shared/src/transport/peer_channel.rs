use std::time::{Duration, Instant};

use log::debug;

use crate::{
    connection::{packet::Packet, packet_type::PacketType},
    sequence_less_than,
    transport::{PendingReceiveEntry, PendingSendEntry, TransportConfig},
    types::{PeerId, SequenceNumber},
    wrapping_diff, SequenceList,
};

/// What happened to an inbound reliable packet
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReceiveOutcome {
    Stored,
    Duplicate,
    OutsideWindow,
}

/// Per-remote-peer delivery state owned by the Transport Buffer
pub(crate) struct PeerChannel {
    peer_id: PeerId,
    next_send_sequence: SequenceNumber,
    outbound: SequenceList<PendingSendEntry>,
    pending_acks: Vec<SequenceNumber>,
    inbound: SequenceList<PendingReceiveEntry>,
    next_delivery: SequenceNumber,
}

impl PeerChannel {
    pub(crate) fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            next_send_sequence: 0,
            outbound: SequenceList::new(),
            pending_acks: Vec::new(),
            inbound: SequenceList::new(),
            next_delivery: 0,
        }
    }

    // Outgoing

    pub(crate) fn enqueue(&mut self, packet_type: PacketType, payload: Vec<u8>) -> SequenceNumber {
        let sequence = self.next_send_sequence;
        self.next_send_sequence = self.next_send_sequence.wrapping_add(1);
        // sequences are allocated in increasing order, so this is an append
        if self
            .outbound
            .try_insert_scan_from_back(sequence, PendingSendEntry::new(packet_type, payload))
            .is_err()
        {
            debug!("Sequence {} to peer {} already queued", sequence, self.peer_id);
        }
        sequence
    }

    /// Sequence stamped on unreliable ACK packets; never tracked
    pub(crate) fn current_sequence(&self) -> SequenceNumber {
        self.next_send_sequence
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outbound
            .iter()
            .filter(|(_, entry)| !entry.acknowledged)
            .count()
    }

    pub(crate) fn pending_send_entries(&self) -> impl Iterator<Item = &(SequenceNumber, PendingSendEntry)> {
        self.outbound.iter()
    }

    /// Collects every packet that must go on the wire at `now`.
    ///
    /// Returns Err with the attempt count if an entry is due again after
    /// exhausting `max_attempts`.
    pub(crate) fn collect_due(
        &mut self,
        local_peer: PeerId,
        now: &Instant,
        mean_round_trip: Option<Duration>,
        config: &TransportConfig,
    ) -> Result<Vec<Packet>, u32> {
        self.outbound.retain(|_, entry| !entry.acknowledged);

        let mut initial_timeout = config.min_retry_timeout;
        if let Some(rtt) = mean_round_trip {
            initial_timeout = initial_timeout.max(rtt.mul_f32(config.rtt_resend_factor));
        }
        let initial_timeout = initial_timeout.min(config.max_retry_timeout);

        let mut output = Vec::new();
        for (sequence, entry) in self.outbound.iter_mut() {
            if !entry.is_due(now) {
                continue;
            }
            if entry.attempt_count == 0 {
                entry.first_sent_at = Some(*now);
                entry.retry_timeout = initial_timeout;
            } else {
                if entry.attempt_count >= config.max_attempts {
                    return Err(entry.attempt_count);
                }
                entry.retry_timeout = (entry.retry_timeout * 2).min(config.max_retry_timeout);
                debug!(
                    "Retransmitting sequence {} to peer {} (attempt {}, next timeout {:?})",
                    sequence,
                    self.peer_id,
                    entry.attempt_count + 1,
                    entry.retry_timeout
                );
            }
            entry.last_sent_at = Some(*now);
            entry.attempt_count += 1;

            // payload length was checked at enqueue time
            if let Ok(packet) = Packet::new(
                local_peer,
                *sequence,
                entry.packet_type,
                entry.payload_bytes.clone(),
            ) {
                output.push(packet);
            }
        }
        Ok(output)
    }

    /// Marks an entry acknowledged and returns the round-trip sample, if the
    /// entry was only ever transmitted once (an ACK for a retransmitted
    /// entry cannot be matched to a particular transmission).
    pub(crate) fn acknowledge(&mut self, sequence: SequenceNumber, now: &Instant) -> Option<Duration> {
        let entry = self.outbound.get_mut_scan_from_back(&sequence)?;
        if entry.acknowledged {
            return None;
        }
        entry.acknowledged = true;
        if entry.attempt_count != 1 {
            return None;
        }
        entry
            .last_sent_at
            .map(|sent_at| now.saturating_duration_since(sent_at))
    }

    pub(crate) fn take_pending_acks(&mut self) -> Vec<SequenceNumber> {
        let acks = std::mem::take(&mut self.pending_acks);
        for sequence in &acks {
            if let Some(entry) = self.inbound.get_mut_scan_from_back(sequence) {
                entry.acknowledgment_sent = true;
            }
        }
        acks
    }

    pub(crate) fn has_pending_acks(&self) -> bool {
        !self.pending_acks.is_empty()
    }

    // Incoming

    pub(crate) fn receive(
        &mut self,
        sequence: SequenceNumber,
        packet_type: PacketType,
        payload: Vec<u8>,
        max_receive_window: u32,
    ) -> ReceiveOutcome {
        let ahead = wrapping_diff(self.next_delivery, sequence);
        if ahead >= 0 && ahead.unsigned_abs() >= max_receive_window {
            return ReceiveOutcome::OutsideWindow;
        }

        // Duplicates are acknowledged again: the first ACK may have been lost
        self.schedule_ack(sequence);

        if sequence_less_than(sequence, self.next_delivery)
            || self.inbound.contains_scan_from_back(&sequence)
        {
            return ReceiveOutcome::Duplicate;
        }

        if self
            .inbound
            .try_insert_scan_from_back(sequence, PendingReceiveEntry::new(packet_type, payload))
            .is_err()
        {
            return ReceiveOutcome::Duplicate;
        }
        ReceiveOutcome::Stored
    }

    fn schedule_ack(&mut self, sequence: SequenceNumber) {
        if !self.pending_acks.contains(&sequence) {
            self.pending_acks.push(sequence);
        }
    }

    /// Removes the contiguous run of entries starting at the next expected
    /// sequence, marking each consumed. Later entries wait for the gap.
    pub(crate) fn drain_contiguous(&mut self) -> Vec<PendingReceiveEntry> {
        let mut output = Vec::new();
        while let Some((sequence, _)) = self.inbound.front() {
            if *sequence != self.next_delivery {
                break;
            }
            let Some((_, mut entry)) = self.inbound.pop_front() else {
                break;
            };
            entry.consumed = true;
            output.push(entry);
            self.next_delivery = self.next_delivery.wrapping_add(1);
        }
        output
    }

    /// Stops retransmitting; inbound dedup state is kept so late
    /// duplicates are still acknowledged
    pub(crate) fn clear_outbound(&mut self) {
        self.outbound.clear();
    }

    /// Drops everything queued in either direction
    pub(crate) fn clear(&mut self) {
        self.outbound.clear();
        self.inbound.clear();
    }
}
