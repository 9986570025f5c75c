//! Scroll-driven "load more" signals

use crate::config::ScrollConfig;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One scroll position sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollObservation {
    /// Scroll offset from the top of the content
    pub offset: f64,
    /// Total content height
    pub content_height: f64,
}

/// Edge-triggered load-more detector.
///
/// The trigger zone is `[threshold, threshold + zone_height]` with
/// `threshold = max(content_height / 2, content_height - bottom_margin)`.
/// A signal fires once per entry into the zone, however many samples
/// land inside it.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    bottom_margin: f64,
    zone_height: f64,
    inside: bool,
}

impl ScrollTrigger {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            bottom_margin: config.bottom_margin,
            zone_height: config.zone_height,
            inside: false,
        }
    }

    /// Zone bounds for a given content height
    pub fn zone(&self, content_height: f64) -> (f64, f64) {
        let threshold = (content_height / 2.0).max(content_height - self.bottom_margin);
        (threshold, threshold + self.zone_height)
    }

    /// Feed a sample; true when the sample enters the zone
    pub fn observe(&mut self, obs: ScrollObservation) -> bool {
        let (low, high) = self.zone(obs.content_height);
        let inside = obs.offset >= low && obs.offset <= high;
        let fire = inside && !self.inside;
        self.inside = inside;
        fire
    }

    pub fn reset(&mut self) {
        self.inside = false;
    }
}

/// Source of scroll samples (a viewport, a test script, ...)
#[async_trait]
pub trait ScrollSource: Send {
    /// Next sample, or `None` once the source is closed
    async fn next_observation(&mut self) -> Option<ScrollObservation>;
}

#[async_trait]
impl ScrollSource for mpsc::Receiver<ScrollObservation> {
    async fn next_observation(&mut self) -> Option<ScrollObservation> {
        self.recv().await
    }
}

#[async_trait]
impl ScrollSource for mpsc::UnboundedReceiver<ScrollObservation> {
    async fn next_observation(&mut self) -> Option<ScrollObservation> {
        self.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: f64) -> ScrollObservation {
        ScrollObservation {
            offset,
            content_height: 10_000.0,
        }
    }

    #[test]
    fn test_zone() {
        let trigger = ScrollTrigger::new(&ScrollConfig::default());
        assert_eq!(trigger.zone(10_000.0), (8_000.0, 8_500.0));
        // Short content: half the height wins
        assert_eq!(trigger.zone(3_000.0), (1_500.0, 2_000.0));
    }

    #[test]
    fn test_fires_once_per_entry() {
        let mut trigger = ScrollTrigger::new(&ScrollConfig::default());
        let fired: Vec<bool> = [7_000.0, 8_000.0, 8_100.0, 8_200.0, 8_499.0, 8_500.0]
            .into_iter()
            .map(|y| trigger.observe(at(y)))
            .collect();
        assert_eq!(fired, vec![false, true, false, false, false, false]);
    }

    #[test]
    fn test_reentry_fires_again() {
        let mut trigger = ScrollTrigger::new(&ScrollConfig::default());
        assert!(trigger.observe(at(8_100.0)));
        assert!(!trigger.observe(at(9_000.0)));
        assert!(trigger.observe(at(8_400.0)));
        assert!(!trigger.observe(at(1_000.0)));
        assert!(trigger.observe(at(8_000.0)));
    }

    #[test]
    fn test_growing_content_moves_zone() {
        let mut trigger = ScrollTrigger::new(&ScrollConfig::default());
        assert!(trigger.observe(at(8_200.0)));

        // A page landed: same offset is now above the zone
        let grown = ScrollObservation {
            offset: 8_200.0,
            content_height: 14_000.0,
        };
        assert!(!trigger.observe(grown));
        assert!(trigger.observe(ScrollObservation {
            offset: 12_000.0,
            content_height: 14_000.0,
        }));
    }

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(at(1.0)).await.unwrap();
        drop(tx);
        assert_eq!(rx.next_observation().await, Some(at(1.0)));
        assert_eq!(rx.next_observation().await, None);
    }
}
