//! Head-nod detection.
//!
//! The detector is a latch over consecutive nose positions. A nod fires on
//! the first downward step larger than the threshold, then stays latched
//! until a step falls back under the threshold. Upward steps larger than the
//! threshold leave the latch untouched.
//!
//! Positions must arrive in sampled-frame order. Frames without a face are
//! not fed at all; they neither advance nor reset the state.

use engagelens_models::utils::{mean, round2};
use engagelens_models::{NodEvent, NodIntervalStats, NodSummary};

/// Latch/reset nod detector for one recording.
#[derive(Debug, Clone)]
pub struct NodDetector {
    /// Minimum step in normalized image units
    threshold: f64,
    last_y: Option<f64>,
    in_nod: bool,
    history: Vec<NodEvent>,
}

impl NodDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_y: None,
            in_nod: false,
            history: Vec::new(),
        }
    }

    /// Feed the normalized nose position of the next face-bearing frame.
    ///
    /// Image `y` grows downward, so a positive step is a downward movement.
    pub fn observe(&mut self, timestamp: f64, y: f64) -> Option<NodEvent> {
        let mut event = None;

        if let Some(last_y) = self.last_y {
            let movement = y - last_y;
            let nodding = movement.abs() > self.threshold;

            if nodding && movement > 0.0 && !self.in_nod {
                let nod = NodEvent::new(timestamp);
                self.history.push(nod);
                self.in_nod = true;
                event = Some(nod);
            } else if !nodding {
                self.in_nod = false;
            }
        }

        self.last_y = Some(y);
        event
    }

    pub fn nod_count(&self) -> u32 {
        self.history.len() as u32
    }

    pub fn history(&self) -> &[NodEvent] {
        &self.history
    }

    pub fn summary(&self, total_duration: f64, fps: f64) -> NodSummary {
        NodSummary {
            nod_count: self.nod_count(),
            nod_history: self.history.clone(),
            total_duration,
            fps,
            intervals: nod_intervals(&self.history),
        }
    }
}

/// Gap statistics between consecutive nods, rounded to 2 decimals.
/// Needs at least two nods.
pub fn nod_intervals(nods: &[NodEvent]) -> Option<NodIntervalStats> {
    let gaps: Vec<f64> = nods
        .windows(2)
        .map(|pair| pair[1].timestamp - pair[0].timestamp)
        .collect();

    let average = mean(gaps.iter().copied())?;
    let shortest = gaps.iter().copied().fold(f64::INFINITY, f64::min);
    let longest = gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(NodIntervalStats {
        average: round2(average),
        shortest: round2(shortest),
        longest: round2(longest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ys: &[f64]) -> Vec<f64> {
        let mut detector = NodDetector::new(0.01);
        for (i, y) in ys.iter().enumerate() {
            detector.observe(i as f64 + 1.0, *y);
        }
        detector.history().iter().map(|n| n.timestamp).collect()
    }

    #[test]
    fn test_constant_position_never_nods() {
        assert!(run(&[0.5; 10]).is_empty());
    }

    #[test]
    fn test_single_descent_then_plateau() {
        // rises past threshold, keeps moving down, then plateaus
        let nods = run(&[0.50, 0.52, 0.55, 0.58, 0.58, 0.58]);
        assert_eq!(nods, vec![2.0]);
    }

    #[test]
    fn test_two_nods_separated_by_reset() {
        let nods = run(&[0.50, 0.53, 0.53, 0.50, 0.50, 0.54]);
        // the large upward step at t=4 neither fires nor resets
        assert_eq!(nods, vec![2.0, 6.0]);
    }

    #[test]
    fn test_upward_motion_keeps_latch() {
        // down (nod), up (latched, no reset), down again: still one nod
        let nods = run(&[0.50, 0.53, 0.50, 0.53]);
        assert_eq!(nods, vec![2.0]);
    }

    #[test]
    fn test_upward_motion_never_nods() {
        assert!(run(&[0.60, 0.55, 0.50, 0.45]).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut detector = NodDetector::new(0.25);
        detector.observe(1.0, 0.25);
        assert!(detector.observe(2.0, 0.5).is_none());
        assert!(detector.observe(3.0, 0.76).is_some());
    }

    #[test]
    fn test_first_observation_only_primes() {
        let mut detector = NodDetector::new(0.01);
        assert!(detector.observe(1.0, 0.9).is_none());
        assert_eq!(detector.nod_count(), 0);
    }

    #[test]
    fn test_intervals() {
        let nods = [NodEvent::new(1.0), NodEvent::new(3.5), NodEvent::new(4.5)];
        let stats = nod_intervals(&nods).unwrap();
        assert_eq!(stats.average, 1.75);
        assert_eq!(stats.shortest, 1.0);
        assert_eq!(stats.longest, 2.5);

        assert!(nod_intervals(&nods[..1]).is_none());
        assert!(nod_intervals(&[]).is_none());
    }

    #[test]
    fn test_summary_counts_history() {
        let mut detector = NodDetector::new(0.01);
        for (t, y) in [(1.0, 0.4), (2.0, 0.45), (3.0, 0.45), (4.0, 0.5)] {
            detector.observe(t, y);
        }
        let summary = detector.summary(5.0, 30.0);
        assert_eq!(summary.nod_count, 2);
        assert_eq!(summary.nod_history.len(), 2);
        assert_eq!(summary.intervals.unwrap().average, 2.0);
    }
}
