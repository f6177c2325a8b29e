/// Batches come out in strictly increasing frame order with no gaps or
/// repeats, and carry only the events that target their frame.
use std::time::{Duration, Instant};

use proptest::prelude::*;

use lockstep_shared::{EventKind, EventPayload, PeerId};
use lockstep_test::{contribution, Harness, LinkConditioner, SyncDriver};

const PEERS: [PeerId; 3] = [0, 1, 2];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn sessions_execute_every_frame_once_in_order(
        seed in any::<u64>(),
        submissions in prop::collection::vec((0u8..3, 0u32..8, 0u32..512), 1..20),
    ) {
        let mut harness = Harness::new(3, seed);
        harness
            .network_mut()
            .set_default_link(LinkConditioner::average_condition());

        for (peer_id, unit, destination) in &submissions {
            harness
                .submit(*peer_id, EventKind::Move, EventPayload::Move { unit: *unit, destination: *destination })
                .unwrap();
            harness.run_for(Duration::from_millis(50));
        }
        prop_assert!(harness.run_frames(&PEERS, 40, Duration::from_secs(30)));

        for peer_id in PEERS {
            prop_assert!(harness.faults(peer_id).is_empty());
            let executed = harness.simulation(peer_id).executed();
            for (index, (frame, events)) in executed.iter().enumerate() {
                prop_assert_eq!(*frame as usize, index);
                for event in events {
                    prop_assert_eq!(event.target_frame(), *frame);
                }
            }
            let moves = harness.simulation(peer_id).tally(EventKind::Move) as usize;
            prop_assert_eq!(moves, submissions.len());
        }

        let common = PEERS
            .iter()
            .map(|peer_id| harness.executed(*peer_id).len())
            .min()
            .unwrap();
        for peer_id in &PEERS[1..] {
            prop_assert_eq!(&harness.executed(*peer_id)[..common], &harness.executed(0)[..common]);
        }
    }
}

#[test]
fn events_are_held_until_their_frame() {
    let now = Instant::now();
    let mut driver = SyncDriver::started(0, &[1], &now);
    let idle = (EventKind::Idle, EventPayload::Idle { unit: 2 });

    // frame 8 arrives complete long before frames 3..8
    driver.deliver(contribution(0, 8, 5, &[idle.clone()]));
    driver.deliver(contribution(1, 8, 5, &[]));
    assert_eq!(driver.run(&now), 3);

    for frame in 3..8 {
        driver.deliver(contribution(0, frame, 3, &[]));
        driver.deliver(contribution(1, frame, 3, &[]));
    }
    assert_eq!(driver.run(&now), 6);

    let frames: Vec<u32> = driver.batches().iter().map(|batch| batch.frame).collect();
    assert_eq!(frames, (0..=8).collect::<Vec<_>>());
    for batch in driver.batches() {
        let expected = usize::from(batch.frame == 8);
        assert_eq!(batch.events.len(), expected, "frame {}", batch.frame);
    }
}

#[test]
fn same_frame_events_sort_by_origin_then_kind() {
    let now = Instant::now();
    let mut driver = SyncDriver::started(1, &[0, 2], &now);
    let scatter = (EventKind::Scatter, EventPayload::Scatter { unit: 1 });
    let moves = (EventKind::Move, EventPayload::Move { unit: 1, destination: 9 });
    let sell = (EventKind::Sell, EventPayload::Sell { building: 4 });

    driver.deliver(contribution(2, 3, 3, &[scatter.clone(), moves.clone()]));
    driver.deliver(contribution(1, 3, 3, &[sell]));
    driver.deliver(contribution(0, 3, 3, &[scatter, moves]));
    driver.run(&now);

    let order: Vec<(PeerId, EventKind)> = driver.batches()[3]
        .events
        .iter()
        .map(|event| (event.origin(), event.kind()))
        .collect();
    assert_eq!(
        order,
        vec![
            (0, EventKind::Move),
            (0, EventKind::Scatter),
            (1, EventKind::Sell),
            (2, EventKind::Move),
            (2, EventKind::Scatter),
        ]
    );
}
