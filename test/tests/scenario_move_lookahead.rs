/// A MOVE authored at frame 10 with lookahead 3 executes at frame 13 on
/// both peers, and nowhere else.
use std::time::{Duration, Instant};

use lockstep_shared::{Event, EventKind, EventPayload, FrameNumber};
use lockstep_test::{contribution, Harness, SyncDriver, FIXED_ONE, GRID_WIDTH};

const UNIT: u32 = 7;
const DESTINATION: u32 = 2 * GRID_WIDTH + 5;

#[test]
fn move_runs_on_the_target_frame_on_both_peers() {
    let now = Instant::now();
    let order = Event::create(
        0,
        EventKind::Move,
        EventPayload::Move {
            unit: UNIT,
            destination: DESTINATION,
        },
        10,
        3,
    )
    .unwrap();
    assert_eq!(order.target_frame(), 13);

    let mut peers = [
        SyncDriver::started(0, &[1], &now),
        SyncDriver::started(1, &[0], &now),
    ];
    for frame in 3..=13 {
        let from_a = if frame == 13 {
            vec![order.clone()]
        } else {
            contribution(0, frame, 3, &[])
        };
        let from_b = contribution(1, frame, 3, &[]);
        // the wire round trip does not change the events
        let from_a = Event::decode_all(&Event::encode_all(from_a.iter())).unwrap();
        for peer in peers.iter_mut() {
            peer.deliver(from_a.clone());
            peer.deliver(from_b.clone());
        }
    }

    for peer in peers.iter_mut() {
        assert_eq!(peer.run(&now), 14);
        let simulation = peer.simulation();
        for frame in 10..13 {
            assert_eq!(simulation.events_for(frame), Some(&[][..]));
        }
        assert_eq!(simulation.events_for(13), Some(&[order.clone()][..]));
        let unit = simulation.unit(UNIT).unwrap();
        assert_eq!(unit.destination, Some((5 * FIXED_ONE, 2 * FIXED_ONE)));
    }

    assert_eq!(peers[0].executed()[13], peers[1].executed()[13]);
    assert_eq!(peers[0].executed()[13].frame, 13);
}

#[test]
fn submitted_move_lands_on_one_frame_for_everyone() {
    env_logger::builder().is_test(true).try_init().ok();

    let mut harness = Harness::new(2, 13);
    assert!(harness.run_until(Duration::from_secs(5), |harness| {
        harness.session(0).frame() >= 10
    }));
    let authored = harness.session(0).frame();
    let lookahead = harness.session(0).config().sync.lookahead;
    harness
        .submit(
            0,
            EventKind::Move,
            EventPayload::Move {
                unit: UNIT,
                destination: DESTINATION,
            },
        )
        .unwrap();
    assert!(harness.run_frames(&[0, 1], 30, Duration::from_secs(10)));

    let landed: Vec<Vec<FrameNumber>> = (0..2)
        .map(|peer_id| {
            harness
                .simulation(peer_id)
                .executed()
                .iter()
                .filter(|(_, events)| events.iter().any(|event| event.kind() == EventKind::Move))
                .map(|(frame, _)| *frame)
                .collect()
        })
        .collect();
    assert_eq!(landed[0].len(), 1);
    assert_eq!(landed[0], landed[1]);
    let target = landed[0][0];
    assert!(target >= authored + lookahead);

    let index = target as usize;
    assert_eq!(harness.executed(0)[index], harness.executed(1)[index]);
}
