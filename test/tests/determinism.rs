/// Every peer must execute the same frames with the same events and produce
/// the same fingerprints, however the packets carrying those events arrive.
use std::{collections::BTreeMap, time::Instant};

use fastrand::Rng;
use proptest::prelude::*;

use lockstep_shared::{Event, EventKind, EventPayload, FrameNumber, PeerId, Simulation};
use lockstep_test::{contribution, SyncDriver, TestSimulation};

const PEERS: [PeerId; 3] = [0, 1, 2];
const LOOKAHEAD: u32 = 3;
const LAST_FRAME: FrameNumber = 24;

type Command = (EventKind, EventPayload);

fn command(variant: u8, unit: u32, value: u32) -> Command {
    match variant {
        0 => (EventKind::Move, EventPayload::Move { unit, destination: value }),
        1 => (EventKind::Attack, EventPayload::Attack { unit, target: value % 8 }),
        _ => (EventKind::Idle, EventPayload::Idle { unit }),
    }
}

fn command_log() -> impl Strategy<Value = Vec<(PeerId, FrameNumber, Command)>> {
    prop::collection::vec(
        (0u8..3, LOOKAHEAD..=LAST_FRAME, 0u8..3, 0u32..8, 0u32..512)
            .prop_map(|(origin, frame, variant, unit, value)| (origin, frame, command(variant, unit, value))),
        0..40,
    )
}

/// One packet per (peer, frame), in the order each peer sealed them
fn packets(log: &[(PeerId, FrameNumber, Command)]) -> Vec<Vec<Event>> {
    let mut by_slot: BTreeMap<(PeerId, FrameNumber), Vec<Command>> = BTreeMap::new();
    for (origin, frame, command) in log {
        by_slot.entry((*origin, *frame)).or_default().push(command.clone());
    }
    let mut output = Vec::new();
    for origin in PEERS {
        for frame in LOOKAHEAD..=LAST_FRAME {
            let commands = by_slot.get(&(origin, frame)).map_or(&[][..], |c| c.as_slice());
            output.push(contribution(origin, frame, LOOKAHEAD, commands));
        }
    }
    output
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arrival_order_does_not_change_fingerprints(log in command_log(), seed in any::<u64>()) {
        let now = Instant::now();
        let packets = packets(&log);
        let rng = Rng::with_seed(seed);

        let mut drivers: Vec<SyncDriver> = PEERS
            .iter()
            .map(|local| {
                let remotes: Vec<PeerId> = PEERS.iter().copied().filter(|p| p != local).collect();
                SyncDriver::started(*local, &remotes, &now)
            })
            .collect();

        for driver in drivers.iter_mut() {
            let mut arrival = packets.clone();
            rng.shuffle(&mut arrival);
            for packet in arrival {
                driver.deliver(packet);
                driver.run(&now);
            }
        }

        let reference = drivers[0].executed().to_vec();
        prop_assert_eq!(reference.len(), LAST_FRAME as usize + 1);
        for driver in &drivers[1..] {
            prop_assert_eq!(driver.executed(), &reference[..]);
            prop_assert_eq!(driver.batches(), drivers[0].batches());
        }
    }

    #[test]
    fn identical_logs_give_identical_fingerprints(log in command_log()) {
        let mut by_frame: BTreeMap<FrameNumber, Vec<Event>> = BTreeMap::new();
        for packet in packets(&log) {
            for event in packet.into_iter().filter(Event::is_game_visible) {
                by_frame.entry(event.target_frame()).or_default().push(event);
            }
        }

        let mut first = TestSimulation::new();
        let mut second = TestSimulation::new();
        for frame in 0..=LAST_FRAME {
            let events = by_frame.get(&frame).map_or(&[][..], |e| e.as_slice());
            prop_assert_eq!(first.execute_frame(frame, events), second.execute_frame(frame, events));
        }
    }
}

#[test]
fn different_commands_give_different_fingerprints() {
    let now = Instant::now();
    let mut honest = SyncDriver::started(0, &[1], &now);
    let mut other = SyncDriver::started(0, &[1], &now);

    for frame in LOOKAHEAD..=6 {
        honest.deliver(contribution(0, frame, LOOKAHEAD, &[]));
        honest.deliver(contribution(1, frame, LOOKAHEAD, &[]));
        other.deliver(contribution(0, frame, LOOKAHEAD, &[]));
        let commands = if frame == 5 { vec![command(0, 1, 70)] } else { vec![] };
        other.deliver(contribution(1, frame, LOOKAHEAD, &commands));
    }
    honest.run(&now);
    other.run(&now);

    assert_eq!(honest.executed()[..5], other.executed()[..5]);
    assert_ne!(honest.executed()[5], other.executed()[5]);
}
