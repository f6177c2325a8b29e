/// Peer 1's link drops everything for 2 seconds in a 15 frames/s session.
/// Retransmission carries every event across once the link recovers, and
/// the barrier holds both peers during the outage instead of running ahead.
use std::time::Duration;

use lockstep_shared::{EventKind, EventPayload, SessionEvent};
use lockstep_test::{Harness, Outage};

#[test]
fn outage_stalls_then_recovers_without_loss() {
    env_logger::builder().is_test(true).try_init().ok();

    let mut harness = Harness::new(2, 21);
    assert_eq!(harness.session(0).config().sync.frame_rate, 15);
    assert!(harness.run_frames(&[0, 1], 10, Duration::from_secs(5)));

    let outage_start = harness.now();
    harness
        .network_mut()
        .isolate(1, Outage::new(outage_start, Duration::from_secs(2)));
    let frames_at_outage = [harness.session(0).frame(), harness.session(1).frame()];
    let max_ahead = harness.session(0).max_ahead().max(harness.session(1).max_ahead());

    // commands issued on both sides while the link is down
    for unit in 0..4 {
        harness
            .submit(0, EventKind::Move, EventPayload::Move { unit, destination: 40 })
            .unwrap();
        harness
            .submit(1, EventKind::Attack, EventPayload::Attack { unit: unit + 10, target: unit })
            .unwrap();
        harness.run_for(Duration::from_millis(400));
    }
    harness.run_for(outage_start + Duration::from_secs(2) - harness.now());

    // 2 s at 15 frames/s would be 30 frames; the barrier allows a handful
    for (peer_id, before) in frames_at_outage.iter().enumerate() {
        let after = harness.session(peer_id as u8).frame();
        assert!(
            after <= before + max_ahead + 2,
            "peer {peer_id} ran from {before} to {after} during the outage"
        );
    }

    assert!(harness.run_frames(&[0, 1], 80, Duration::from_secs(15)));
    for peer_id in 0..2 {
        assert!(harness.faults(peer_id).is_empty());
        assert!(!harness
            .events(peer_id)
            .iter()
            .any(|event| matches!(event, SessionEvent::PeerLost(_))));
        let simulation = harness.simulation(peer_id);
        assert_eq!(simulation.tally(EventKind::Move), 4);
        assert_eq!(simulation.tally(EventKind::Attack), 4);
    }
    assert_eq!(harness.executed(0)[..80], harness.executed(1)[..80]);
    assert!(harness.network().stats().dropped > 0);
}
