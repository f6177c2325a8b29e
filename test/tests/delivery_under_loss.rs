/// Under heavy packet loss every event still reaches its peer exactly once
/// and in order, and sessions stay in step.
use std::time::{Duration, Instant};

use fastrand::Rng;
use proptest::prelude::*;

use lockstep_shared::{
    Event, EventKind, EventPayload, SessionEvent, SessionState, TransportBuffer, TransportConfig,
};
use lockstep_test::{Harness, LinkConditioner};

fn move_event(unit: u32) -> Event {
    Event::create(
        0,
        EventKind::Move,
        EventPayload::Move {
            unit,
            destination: unit * 3,
        },
        0,
        3,
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_event_is_drained_exactly_once(seed in any::<u64>(), count in 1u32..60) {
        let config = TransportConfig {
            max_attempts: 40,
            ..TransportConfig::default()
        };
        let mut a_state = SessionState::new(0, [1], 3);
        let mut b_state = SessionState::new(1, [0], 3);
        let mut a = TransportBuffer::new(config.clone(), &a_state);
        let mut b = TransportBuffer::new(config, &b_state);
        let mut rng = Rng::with_seed(seed);
        let link = LinkConditioner::perfect_condition().with_loss(0.3);

        let sent: Vec<Event> = (0..count).map(move_event).collect();
        for event in &sent {
            a.enqueue_send(&a_state, 1, event.encode()).unwrap();
        }

        let start = Instant::now();
        let mut received = Vec::new();
        for step in 0..6_000u32 {
            let now = start + Duration::from_millis(10) * step;

            prop_assert!(a.service_send_queue(&mut a_state, &now).is_empty());
            for datagram in a.handle().take_outbound() {
                if link.schedule(&now, &mut rng).is_some() {
                    let _ = b.on_packet_received(&mut b_state, 0, &datagram.bytes, &now);
                }
            }
            received.extend(b.drain_received(&b_state));

            b.service_send_queue(&mut b_state, &now);
            for datagram in b.handle().take_outbound() {
                if link.schedule(&now, &mut rng).is_some() {
                    let _ = a.on_packet_received(&mut a_state, 1, &datagram.bytes, &now);
                }
            }

            if a.all_acknowledged() {
                break;
            }
        }

        prop_assert!(a.all_acknowledged());
        prop_assert_eq!(received, sent);
    }
}

#[test]
fn sessions_agree_under_thirty_percent_loss() {
    env_logger::builder().is_test(true).try_init().ok();

    let mut harness = Harness::with_config(2, 0x5EED, |config| {
        config.transport.max_attempts = 40;
    });
    harness
        .network_mut()
        .set_default_link(LinkConditioner::perfect_condition().with_loss(0.3));

    for unit in 0..10 {
        harness
            .submit(
                unit as u8 % 2,
                EventKind::Move,
                EventPayload::Move {
                    unit,
                    destination: 100 + unit,
                },
            )
            .unwrap();
        harness.run_for(Duration::from_millis(200));
    }
    assert!(harness.run_frames(&[0, 1], 60, Duration::from_secs(120)));

    for peer_id in 0..2 {
        assert!(harness.faults(peer_id).is_empty());
        assert!(!harness
            .events(peer_id)
            .iter()
            .any(|event| matches!(event, SessionEvent::PeerLost(_))));
        assert_eq!(harness.simulation(peer_id).tally(EventKind::Move), 10);
    }
    assert_eq!(harness.executed(0)[..60], harness.executed(1)[..60]);
    assert!(harness.network().stats().dropped > 0);
}
