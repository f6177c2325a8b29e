/// A peer that stops responding is declared lost once retransmissions run
/// out. The barrier stops waiting on it, and losing the last remote peer
/// halts the session.
use std::time::Duration;

use lockstep_shared::{PeerStatus, SessionEvent, SessionFault};
use lockstep_test::Harness;

#[test]
fn crashed_peer_is_dropped_from_the_barrier() {
    env_logger::builder().is_test(true).try_init().ok();

    let mut harness = Harness::new(3, 11);
    assert!(harness.run_frames(&[0, 1, 2], 10, Duration::from_secs(5)));
    harness.freeze(2);

    assert!(harness.run_until(Duration::from_secs(20), |harness| {
        (0..2).all(|peer_id| {
            harness
                .events(peer_id)
                .contains(&SessionEvent::PeerLost(2))
        })
    }));
    let stalled_at = harness.executed(0).len();
    assert!(harness.run_frames(&[0, 1], stalled_at + 20, Duration::from_secs(10)));

    for peer_id in 0..2 {
        assert!(harness.faults(peer_id).is_empty());
        assert_eq!(
            harness.session(peer_id).peer(2).map(|peer| peer.status()),
            Some(PeerStatus::Lost)
        );
        assert!(!harness.session(peer_id).is_halted());
    }
    let common = stalled_at + 20;
    assert_eq!(harness.executed(0)[..common], harness.executed(1)[..common]);
}

#[test]
fn losing_the_only_remote_peer_halts() {
    let mut harness = Harness::new(2, 12);
    assert!(harness.run_frames(&[0, 1], 5, Duration::from_secs(5)));
    harness.freeze(1);

    assert!(harness.run_until(Duration::from_secs(20), |harness| {
        harness.session(0).is_halted()
    }));
    let events = harness.events(0);
    let lost = events
        .iter()
        .position(|event| *event == SessionEvent::PeerLost(1))
        .unwrap();
    assert_eq!(
        events[lost + 1..]
            .iter()
            .filter(|event| matches!(event, SessionEvent::Fault(_)))
            .collect::<Vec<_>>(),
        vec![&SessionEvent::Fault(SessionFault::AllPeersLost)]
    );
}
