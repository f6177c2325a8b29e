use std::collections::BTreeMap;

use lockstep_shared::{Event, EventKind, EventPayload, FingerprintHasher, FrameNumber, Simulation};

/// 16.16 fixed point
pub const FIXED_ONE: i32 = 1 << 16;
/// Cells per row of the map; a cell index is `y * GRID_WIDTH + x`
pub const GRID_WIDTH: u32 = 64;

const SPEED: i32 = FIXED_ONE / 4;
const START_HEALTH: i32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub owner: u8,
    pub x: i32,
    pub y: i32,
    pub destination: Option<(i32, i32)>,
    pub health: i32,
}

/// A small deterministic world driven purely by the events it executes:
/// units walk toward the cell they were sent to, attacks cost health, and
/// every other command is tallied. Integer arithmetic only.
#[derive(Clone, Debug, Default)]
pub struct TestSimulation {
    units: BTreeMap<u32, Unit>,
    tallies: BTreeMap<EventKind, u32>,
    executed: Vec<(FrameNumber, Vec<Event>)>,
    diverge_at: Option<FrameNumber>,
}

impl TestSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Corrupts local state while executing `frame`, so this simulation's
    /// fingerprints differ from that frame on
    pub fn diverge_at(mut self, frame: FrameNumber) -> Self {
        self.diverge_at = Some(frame);
        self
    }

    pub fn unit(&self, unit_id: u32) -> Option<&Unit> {
        self.units.get(&unit_id)
    }

    pub fn tally(&self, kind: EventKind) -> u32 {
        self.tallies.get(&kind).copied().unwrap_or(0)
    }

    /// Every frame executed so far with the events it was handed
    pub fn executed(&self) -> &[(FrameNumber, Vec<Event>)] {
        &self.executed
    }

    pub fn events_for(&self, frame: FrameNumber) -> Option<&[Event]> {
        self.executed
            .iter()
            .find(|(executed, _)| *executed == frame)
            .map(|(_, events)| events.as_slice())
    }

    fn apply(&mut self, event: &Event) {
        *self.tallies.entry(event.kind()).or_insert(0) += 1;
        match *event.payload() {
            EventPayload::Move { unit, destination } => {
                let target = cell_position(destination);
                self.unit_entry(unit, event.origin()).destination = Some(target);
            }
            EventPayload::Attack { unit, target } => {
                self.unit_entry(unit, event.origin());
                let victim = self.unit_entry(target, event.origin());
                victim.health -= 10;
            }
            EventPayload::Idle { unit } | EventPayload::Scatter { unit } => {
                self.unit_entry(unit, event.origin()).destination = None;
            }
            _ => {}
        }
    }

    fn unit_entry(&mut self, unit_id: u32, owner: u8) -> &mut Unit {
        self.units.entry(unit_id).or_insert_with(|| Unit {
            owner,
            x: 0,
            y: 0,
            destination: None,
            health: START_HEALTH,
        })
    }

    fn step_units(&mut self) {
        self.units.retain(|_, unit| unit.health > 0);
        for unit in self.units.values_mut() {
            let Some((tx, ty)) = unit.destination else {
                continue;
            };
            unit.x += (tx - unit.x).clamp(-SPEED, SPEED);
            unit.y += (ty - unit.y).clamp(-SPEED, SPEED);
            if unit.x == tx && unit.y == ty {
                unit.destination = None;
            }
        }
    }

    fn fingerprint(&self, frame: FrameNumber) -> u32 {
        let mut hasher = FingerprintHasher::new();
        hasher.write_u32(frame);
        for (unit_id, unit) in &self.units {
            hasher.write_u32(*unit_id);
            hasher.write_u8(unit.owner);
            hasher.write_i32(unit.x);
            hasher.write_i32(unit.y);
            hasher.write_i32(unit.health);
        }
        for (kind, count) in &self.tallies {
            hasher.write_u8(kind.to_u8());
            hasher.write_u32(*count);
        }
        hasher.finish()
    }
}

fn cell_position(cell: u32) -> (i32, i32) {
    let x = i32::try_from(cell % GRID_WIDTH).unwrap_or(0);
    let y = i32::try_from(cell / GRID_WIDTH).unwrap_or(0);
    (x * FIXED_ONE, y * FIXED_ONE)
}

impl Simulation for TestSimulation {
    fn execute_frame(&mut self, frame: FrameNumber, events: &[Event]) -> u32 {
        for event in events {
            self.apply(event);
        }
        self.step_units();
        if self.diverge_at == Some(frame) {
            self.unit_entry(u32::MAX, 0).health += 1;
        }
        self.executed.push((frame, events.to_vec()));
        self.fingerprint(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_to(origin: u8, unit: u32, destination: u32, frame: FrameNumber) -> Event {
        Event::create(
            origin,
            EventKind::Move,
            EventPayload::Move { unit, destination },
            frame - 1,
            1,
        )
        .unwrap()
    }

    #[test]
    fn units_walk_to_their_destination() {
        let mut sim = TestSimulation::new();
        sim.execute_frame(1, &[move_to(0, 1, 1, 1)]);
        for frame in 2..6 {
            sim.execute_frame(frame, &[]);
        }
        let unit = sim.unit(1).unwrap();
        assert_eq!((unit.x, unit.y), (FIXED_ONE, 0));
        assert_eq!(unit.destination, None);
        assert_eq!(sim.tally(EventKind::Move), 1);
    }

    #[test]
    fn divergence_changes_the_fingerprint() {
        let mut honest = TestSimulation::new();
        let mut faulty = TestSimulation::new().diverge_at(2);
        for frame in 0..2 {
            assert_eq!(honest.execute_frame(frame, &[]), faulty.execute_frame(frame, &[]));
        }
        assert_ne!(honest.execute_frame(2, &[]), faulty.execute_frame(2, &[]));
    }
}
