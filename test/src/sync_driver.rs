use std::time::Instant;

use lockstep_shared::{
    ConsistencyValidator, Event, EventKind, EventPayload, ExecutionBatch, FrameNumber,
    FrameSynchronizer, PeerId, PeerStatus, SessionState, SetupHandshake, SetupInfo, Simulation,
    SyncConfig, TransportBuffer, TransportConfig, ValidatorConfig, ValidatorFault,
};

use crate::{ExecutedFrame, TestSimulation};

/// One peer's Frame Synchronizer and Consistency Validator, fed events by
/// hand. Exercises the barrier without any transport in the way.
pub struct SyncDriver {
    state: SessionState,
    synchronizer: FrameSynchronizer,
    validator: ConsistencyValidator,
    simulation: TestSimulation,
    batches: Vec<ExecutionBatch>,
    executed: Vec<ExecutedFrame>,
    faults: Vec<ValidatorFault>,
}

impl SyncDriver {
    /// A started synchronizer for `local` among `remotes`, using the
    /// default configuration
    pub fn started(local: PeerId, remotes: &[PeerId], now: &Instant) -> Self {
        let config = SyncConfig::default();
        let mut state = SessionState::new(local, remotes.iter().copied(), config.lookahead);
        let setup = SetupInfo::new(0, 3, config.frame_rate);
        let mut handshake = SetupHandshake::new(setup, remotes.iter().copied());
        for peer_id in remotes {
            handshake.receive(*peer_id, setup);
        }

        let mut synchronizer = FrameSynchronizer::new(config);
        // an identical handshake cannot fail
        let _ = synchronizer.start(&handshake, &mut state, now);
        let validator = ConsistencyValidator::new(ValidatorConfig::default(), &state);

        Self {
            state,
            synchronizer,
            validator,
            simulation: TestSimulation::new(),
            batches: Vec::new(),
            executed: Vec::new(),
            faults: Vec::new(),
        }
    }

    pub fn with_simulation(mut self, simulation: TestSimulation) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.synchronizer
    }

    pub fn simulation(&self) -> &TestSimulation {
        &self.simulation
    }

    pub fn batches(&self) -> &[ExecutionBatch] {
        &self.batches
    }

    pub fn executed(&self) -> &[ExecutedFrame] {
        &self.executed
    }

    pub fn faults(&self) -> &[ValidatorFault] {
        &self.faults
    }

    /// Hands a packet's worth of events to the barrier
    pub fn deliver(&mut self, events: Vec<Event>) {
        self.synchronizer.ingest(&mut self.state, events);
    }

    /// Reports a remote fingerprint to the validator
    pub fn deliver_fingerprint(&mut self, peer_id: PeerId, frame: FrameNumber, value: u32) {
        if let Some(fault) = self.validator.on_remote(&self.state, peer_id, frame, value) {
            self.faults.push(fault);
        }
    }

    /// Executes one frame if the barrier releases it
    pub fn step(&mut self, now: &Instant) -> Option<ExecutedFrame> {
        let batch = self.synchronizer.advance(&self.state, now)?;
        let fingerprint = self.simulation.execute_frame(batch.frame, &batch.events);
        let (_, faults) = self
            .synchronizer
            .record_fingerprint(&mut self.state, batch.frame, fingerprint, &mut self.validator)
            .ok()?;
        self.faults.extend(faults);

        let executed = ExecutedFrame {
            frame: batch.frame,
            fingerprint,
        };
        self.batches.push(batch);
        self.executed.push(executed);
        Some(executed)
    }

    /// Executes frames until the barrier holds
    pub fn run(&mut self, now: &Instant) -> usize {
        let mut count = 0;
        while self.step(now).is_some() {
            count += 1;
        }
        count
    }

    /// Marks a remote peer lost the way the transport does when its retries
    /// run out. Returns false if no remote peer is left alive.
    pub fn lose_peer(&mut self, peer_id: PeerId) -> bool {
        let mut transport = TransportBuffer::new(TransportConfig::default(), &self.state);
        transport.retire_peer(&mut self.state, peer_id, PeerStatus::Lost);
        self.validator.forget_peer(&self.state, peer_id);
        self.synchronizer.mark_peer_lost(&self.state, peer_id)
    }
}

/// The contribution `origin` seals for `frame`: the given commands, or a
/// NoCommand marker when there are none. Commands are authored `lookahead`
/// frames earlier.
pub fn contribution(
    origin: PeerId,
    frame: FrameNumber,
    lookahead: u32,
    commands: &[(EventKind, EventPayload)],
) -> Vec<Event> {
    if commands.is_empty() {
        return vec![Event::no_command(origin, frame)];
    }
    commands
        .iter()
        .filter_map(|(kind, payload)| {
            let authored = frame.checked_sub(lookahead)?;
            Event::create(origin, *kind, payload.clone(), authored, lookahead).ok()
        })
        .collect()
}
