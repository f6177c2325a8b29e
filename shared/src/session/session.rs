use std::{collections::VecDeque, time::Instant};

use log::{debug, info, warn};

use crate::{
    connection::packet_type::PacketType,
    events::{Event, EventKind, EventPayload},
    handshake::{SetupHandshake, SetupInfo},
    session::{SessionConfig, SessionError, SessionEvent, SessionFault, Simulation},
    session_state::SessionState,
    sync::{FrameSynchronizer, SyncError, SyncState},
    transport::{
        ControlMessage, PeerState, PeerStatus, TransportBuffer, TransportFault, TransportHandle,
    },
    types::{FrameNumber, PeerId},
    validation::ConsistencyValidator,
};

struct QueuedCommand {
    kind: EventKind,
    payload: EventPayload,
    authored_frame: FrameNumber,
}

/// One participant's lockstep session.
///
/// Owns the Transport Buffer, Frame Synchronizer, Consistency Validator and
/// setup handshake, and threads a single [`SessionState`] through them. The
/// host calls [`Session::update`] regularly; datagrams are exchanged with
/// the network through the [`TransportHandle`].
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    transport: TransportBuffer,
    synchronizer: FrameSynchronizer,
    validator: ConsistencyValidator,
    handshake: SetupHandshake,
    queued: VecDeque<QueuedCommand>,
    /// Highest frame whose local contribution has been sent
    sealed_through: Option<FrameNumber>,
    next_frame_at: Option<Instant>,
    setup_sent: bool,
    fault_reported: bool,
    quit_started_at: Option<Instant>,
    events: VecDeque<SessionEvent>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let state = SessionState::new(
            config.local_peer,
            config.remote_peers.iter().copied(),
            config.sync.lookahead,
        );
        let setup = SetupInfo::new(
            config.content_checksum,
            u16::try_from(config.sync.lookahead).unwrap_or(u16::MAX),
            config.sync.frame_rate,
        )
        .with_max_ahead(
            u16::try_from(config.sync.max_lookahead).unwrap_or(u16::MAX),
            u16::try_from(config.sync.safety_margin).unwrap_or(u16::MAX),
        );
        let handshake = SetupHandshake::new(setup, state.remote_peer_ids());
        let transport = TransportBuffer::new(config.transport.clone(), &state);
        let synchronizer = FrameSynchronizer::new(config.sync.clone());
        let validator = ConsistencyValidator::new(config.validator.clone(), &state);

        Self {
            config,
            state,
            transport,
            synchronizer,
            validator,
            handshake,
            queued: VecDeque::new(),
            sealed_through: None,
            next_frame_at: None,
            setup_sent: false,
            fault_reported: false,
            quit_started_at: None,
            events: VecDeque::new(),
        }
    }

    pub fn handle(&self) -> TransportHandle {
        self.transport.handle()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn local_peer(&self) -> PeerId {
        self.state.local_peer()
    }

    /// Next frame to execute
    pub fn frame(&self) -> FrameNumber {
        self.state.frame()
    }

    pub fn max_ahead(&self) -> u32 {
        self.state.max_ahead()
    }

    pub fn peer(&self, peer_id: PeerId) -> Option<&PeerState> {
        self.state.peer(peer_id)
    }

    pub fn sync_state(&self) -> SyncState {
        self.synchronizer.sync_state()
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.synchronizer
    }

    pub fn validator(&self) -> &ConsistencyValidator {
        &self.validator
    }

    pub fn transport(&self) -> &TransportBuffer {
        &self.transport
    }

    pub fn is_halted(&self) -> bool {
        self.synchronizer.is_halted()
    }

    pub fn is_quitting(&self) -> bool {
        self.quit_started_at.is_some()
    }

    /// Commands submitted but not yet scheduled onto a frame
    pub fn queued_commands(&self) -> usize {
        self.queued.len()
    }

    /// Queues a local command. It is scheduled onto the furthest frame the
    /// lookahead allows the next time the session seals a contribution.
    pub fn submit(&mut self, kind: EventKind, payload: EventPayload) -> Result<(), SessionError> {
        if self.is_halted() {
            return Err(SessionError::Halted);
        }
        if self.is_quitting() {
            return Err(SessionError::Quitting);
        }
        if !kind.is_game_visible() {
            return Err(SessionError::ReservedKind { kind });
        }

        // validate now so the host hears about it, not the seal
        let authored_frame = self.state.frame();
        let lookahead = self.config.sync.lookahead;
        Event::create(
            self.state.local_peer(),
            kind,
            payload.clone(),
            authored_frame,
            self.state.max_ahead().max(lookahead),
        )?;

        self.queued.push_back(QueuedCommand {
            kind,
            payload,
            authored_frame,
        });
        Ok(())
    }

    /// Drives the session: exchanges packets, starts the session once setup
    /// completes, sends the local contribution for upcoming frames and
    /// executes at most one frame on `simulation`.
    pub fn update<S: Simulation>(&mut self, now: &Instant, simulation: &mut S) {
        if !self.setup_sent {
            self.setup_sent = true;
            let setup = self.handshake.local().encode();
            if let Err(error) = self.transport.broadcast(&self.state, PacketType::Setup, setup) {
                warn!("Unable to send setup: {}", error);
            }
        }

        let errors = self.transport.receive_datagrams(&mut self.state);
        if !errors.is_empty() {
            debug!("{} inbound datagrams were rejected", errors.len());
        }
        self.service_transport(now);
        self.process_received();

        if self.synchronizer.sync_state() == SyncState::AwaitingSetup {
            self.try_start(now);
        }

        if !self.is_halted() && !self.is_quitting() {
            self.synchronizer.recalculate_max_ahead(&mut self.state, now);
            self.seal_local_contributions();
            if self.execute_next_frame(now, simulation) {
                self.seal_local_contributions();
            }
        }

        self.service_transport(now);
    }

    /// Takes every notification queued since the last call
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    /// Begins a graceful departure: every alive peer is sent a disconnect.
    /// Keep calling [`Session::update`] until [`Session::is_quit_complete`].
    pub fn quit(&mut self, now: &Instant) {
        if self.quit_started_at.is_some() {
            return;
        }
        info!("Peer {} leaving the session", self.state.local_peer());
        self.quit_started_at = Some(*now);
        if let Err(error) = self
            .transport
            .broadcast(&self.state, PacketType::Disconnect, Vec::new())
        {
            warn!("Unable to send disconnect: {}", error);
        }
        self.service_transport(now);
    }

    /// True once the disconnect has been acknowledged by every peer, or the
    /// disconnect timeout has passed
    pub fn is_quit_complete(&self, now: &Instant) -> bool {
        let Some(started) = self.quit_started_at else {
            return false;
        };
        self.transport.all_acknowledged()
            || now.saturating_duration_since(started) >= self.config.disconnect_timeout
    }

    fn service_transport(&mut self, now: &Instant) {
        let faults = self.transport.service_send_queue(&mut self.state, now);
        for fault in faults {
            match fault {
                TransportFault::PeerLost { peer_id, .. } => self.on_peer_lost(peer_id),
            }
        }
    }

    fn on_peer_lost(&mut self, peer_id: PeerId) {
        self.events.push_back(SessionEvent::PeerLost(peer_id));
        self.handshake.forget_peer(peer_id);
        self.validator.forget_peer(&self.state, peer_id);
        if !self.synchronizer.mark_peer_lost(&self.state, peer_id) {
            self.raise_fault(SessionFault::AllPeersLost);
        }
    }

    fn process_received(&mut self) {
        let received = self.transport.drain_received(&self.state);
        let mut commands = Vec::with_capacity(received.len());
        for event in received {
            if let EventPayload::FrameInfo { frame, fingerprint } = *event.payload() {
                if let Some(fault) =
                    self.validator
                        .on_remote(&self.state, event.origin(), frame, fingerprint)
                {
                    self.raise_fault(fault.into());
                }
                continue;
            }
            commands.push(event);
        }
        self.synchronizer.ingest(&mut self.state, commands);

        for message in self.transport.drain_control() {
            match message {
                ControlMessage::Setup { peer_id, info } => self.handshake.receive(peer_id, info),
                ControlMessage::Disconnect { peer_id } => {
                    if self
                        .transport
                        .retire_peer(&mut self.state, peer_id, PeerStatus::Departed)
                    {
                        info!("Peer {} disconnected", peer_id);
                        self.handshake.forget_peer(peer_id);
                        self.validator.forget_peer(&self.state, peer_id);
                        self.synchronizer.remove_peer(&self.state, peer_id);
                        self.events.push_back(SessionEvent::PeerDisconnected(peer_id));
                    }
                }
            }
        }
    }

    fn try_start(&mut self, now: &Instant) {
        match self
            .synchronizer
            .start(&self.handshake, &mut self.state, now)
        {
            Ok(()) => {
                self.next_frame_at = Some(*now);
                self.events.push_back(SessionEvent::Started);
            }
            Err(SyncError::SetupPending { .. }) => {}
            Err(SyncError::Setup(error)) => self.raise_fault(error.into()),
            Err(error) => warn!("Unable to start session: {}", error),
        }
    }

    /// Sends the local contribution for every frame up to frame + MaxAhead
    /// not yet covered, as a single packet. Queued commands go into the last
    /// of those frames; the others carry NoCommand.
    fn seal_local_contributions(&mut self) {
        match self.synchronizer.sync_state() {
            SyncState::AwaitingSetup | SyncState::Halted => return,
            _ => {}
        }

        let lookahead = self.config.sync.lookahead;
        let first = self
            .sealed_through
            .map_or(lookahead, |frame| frame.wrapping_add(1));
        let last = self.state.frame().saturating_add(self.state.max_ahead());
        if first > last {
            return;
        }

        let local_peer = self.state.local_peer();
        let mut events: Vec<Event> = (first..last)
            .map(|frame| Event::no_command(local_peer, frame))
            .collect();
        let mut size: usize = events.iter().map(Event::byte_length).sum();
        let max_payload_len = self.transport.config().max_payload_len;

        let mut scheduled = 0;
        while let Some(command) = self.queued.front() {
            let event = match Event::scheduled(
                local_peer,
                command.kind,
                command.payload.clone(),
                command.authored_frame,
                last,
                lookahead,
            ) {
                Ok(event) => event,
                Err(error) => {
                    warn!("Dropping {:?} command: {}", command.kind, error);
                    self.queued.pop_front();
                    continue;
                }
            };
            if size + event.byte_length() > max_payload_len {
                break;
            }
            size += event.byte_length();
            events.push(event);
            self.queued.pop_front();
            scheduled += 1;
        }
        if scheduled == 0 {
            events.push(Event::no_command(local_peer, last));
        }
        if !self.queued.is_empty() {
            debug!("{} commands deferred past frame {}", self.queued.len(), last);
        }

        let bytes = Event::encode_all(events.iter());
        if let Err(error) = self
            .transport
            .broadcast(&self.state, PacketType::Event, bytes)
        {
            warn!("Unable to send contribution for frames {}..={}: {}", first, last, error);
            return;
        }
        self.synchronizer.ingest(&mut self.state, events);
        self.sealed_through = Some(last);
    }

    /// Executes the next frame if the barrier allows it and the frame is
    /// due. Returns true if a frame was executed.
    fn execute_next_frame<S: Simulation>(&mut self, now: &Instant, simulation: &mut S) -> bool {
        if let Some(due) = self.next_frame_at {
            if *now < due {
                return false;
            }
        }
        let Some(batch) = self.synchronizer.advance(&self.state, now) else {
            return false;
        };

        let fingerprint = simulation.execute_frame(batch.frame, &batch.events);
        match self.synchronizer.record_fingerprint(
            &mut self.state,
            batch.frame,
            fingerprint,
            &mut self.validator,
        ) {
            Ok((heartbeat, faults)) => {
                if let Err(error) = self.transport.broadcast(
                    &self.state,
                    PacketType::Heartbeat,
                    heartbeat.encode(),
                ) {
                    warn!("Unable to send fingerprint for frame {}: {}", batch.frame, error);
                }
                self.events.push_back(SessionEvent::FrameExecuted {
                    frame: batch.frame,
                    fingerprint,
                });
                for fault in faults {
                    self.raise_fault(fault.into());
                }
            }
            Err(error) => {
                warn!("Fingerprint for frame {} rejected: {}", batch.frame, error);
                return false;
            }
        }

        let frame_duration = self.config.sync.frame_duration();
        self.next_frame_at = Some(match self.next_frame_at {
            // fall behind by at most one frame rather than bursting to catch up
            Some(due) if due + frame_duration >= *now => due + frame_duration,
            _ => *now,
        });
        true
    }

    fn raise_fault(&mut self, fault: SessionFault) {
        if self.fault_reported {
            debug!("Suppressing fault after halt: {}", fault);
            return;
        }
        self.fault_reported = true;
        warn!("Session halted: {}", fault);
        self.synchronizer.halt();
        self.events.push_back(SessionEvent::Fault(fault));
    }
}
