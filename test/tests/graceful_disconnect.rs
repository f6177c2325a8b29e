/// A peer that quits is released from the barrier without a fault; the
/// others keep playing.
use std::time::Duration;

use lockstep_shared::{EventKind, EventPayload, PeerStatus, SessionError, SessionEvent};
use lockstep_test::Harness;

#[test]
fn remaining_peers_continue_after_a_quit() {
    env_logger::builder().is_test(true).try_init().ok();

    let mut harness = Harness::new(3, 9);
    assert!(harness.run_frames(&[0, 1, 2], 10, Duration::from_secs(5)));

    harness.quit(2);
    assert_eq!(
        harness.submit(2, EventKind::Idle, EventPayload::Idle { unit: 1 }),
        Err(SessionError::Quitting)
    );
    assert!(harness.run_until(Duration::from_secs(2), |harness| {
        harness.session(2).is_quit_complete(&harness.now())
    }));
    assert!(harness.session(2).transport().all_acknowledged());
    harness.freeze(2);

    let before = harness.executed(0).len();
    assert!(harness.run_frames(&[0, 1], before + 30, Duration::from_secs(10)));

    for peer_id in 0..2 {
        assert!(harness.faults(peer_id).is_empty());
        assert!(harness
            .events(peer_id)
            .contains(&SessionEvent::PeerDisconnected(2)));
        assert!(!harness
            .events(peer_id)
            .iter()
            .any(|event| matches!(event, SessionEvent::PeerLost(_))));
        assert_eq!(
            harness.session(peer_id).peer(2).map(|peer| peer.status()),
            Some(PeerStatus::Departed)
        );
    }
    let common = before + 30;
    assert_eq!(harness.executed(0)[..common], harness.executed(1)[..common]);
}

#[test]
fn unanswered_quit_completes_after_the_timeout() {
    let mut harness = Harness::new(2, 10);
    assert!(harness.run_frames(&[0, 1], 3, Duration::from_secs(5)));

    harness.freeze(1);
    harness.quit(0);
    let timeout = harness.session(0).config().disconnect_timeout;
    harness.run_for(timeout / 2);
    assert!(!harness.session(0).is_quit_complete(&harness.now()));
    harness.run_for(timeout);
    assert!(harness.session(0).is_quit_complete(&harness.now()));
}
