use std::time::{Duration, Instant};

use fastrand::Rng;

/// A window during which a link drops everything
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outage {
    pub start: Instant,
    pub end: Instant,
}

impl Outage {
    pub fn new(start: Instant, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    pub fn contains(&self, now: &Instant) -> bool {
        self.start <= *now && *now < self.end
    }
}

/// Conditions applied to every datagram crossing one direction of a link
#[derive(Clone, Debug)]
pub struct LinkConditioner {
    /// Delay before a datagram arrives
    pub latency: Duration,
    /// Extra random delay, uniformly distributed in `[0, jitter]`
    pub jitter: Duration,
    /// Probability in `[0, 1]` that a datagram is dropped
    pub loss: f32,
    pub outages: Vec<Outage>,
}

impl LinkConditioner {
    pub fn perfect_condition() -> Self {
        Self {
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            loss: 0.0,
            outages: Vec::new(),
        }
    }

    pub fn average_condition() -> Self {
        Self {
            latency: Duration::from_millis(40),
            jitter: Duration::from_millis(10),
            loss: 0.02,
            outages: Vec::new(),
        }
    }

    pub fn poor_condition() -> Self {
        Self {
            latency: Duration::from_millis(100),
            jitter: Duration::from_millis(40),
            loss: 0.3,
            outages: Vec::new(),
        }
    }

    pub fn with_loss(mut self, loss: f32) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_outage(mut self, outage: Outage) -> Self {
        self.outages.push(outage);
        self
    }

    /// When a datagram sent at `now` arrives, or `None` if it is dropped
    pub fn schedule(&self, now: &Instant, rng: &mut Rng) -> Option<Instant> {
        if self.outages.iter().any(|outage| outage.contains(now)) {
            return None;
        }
        if self.loss > 0.0 && rng.f32() < self.loss {
            return None;
        }
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rng.u64(0..=jitter_ms))
        };
        Some(*now + self.latency + jitter)
    }
}

impl Default for LinkConditioner {
    fn default() -> Self {
        Self::perfect_condition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outage_drops_everything_inside_the_window() {
        let start = Instant::now();
        let link = LinkConditioner::perfect_condition()
            .with_outage(Outage::new(start + Duration::from_secs(1), Duration::from_secs(2)));
        let mut rng = Rng::with_seed(1);

        assert_eq!(link.schedule(&start, &mut rng), Some(start));
        let inside = start + Duration::from_millis(2500);
        assert_eq!(link.schedule(&inside, &mut rng), None);
        let after = start + Duration::from_secs(3);
        assert_eq!(link.schedule(&after, &mut rng), Some(after));
    }

    #[test]
    fn loss_rate_is_roughly_honoured() {
        let now = Instant::now();
        let link = LinkConditioner::perfect_condition().with_loss(0.3);
        let mut rng = Rng::with_seed(7);
        let delivered = (0..10_000)
            .filter(|_| link.schedule(&now, &mut rng).is_some())
            .count();
        assert!((6_500..7_500).contains(&delivered), "{delivered}");
    }
}
