//! Fusion of the emotion timeline with nod events.

use engagelens_models::utils::{mean, round2};
use engagelens_models::{
    CombinedEngagement, CombinedEntry, EngagementSummary, FrameEngagement, NodEvent, MAX_SCORE,
};

use crate::config::{AnalysisConfig, NodMatchPolicy};

/// Boost applied to a frame when one of its `num_people` faces nods.
///
/// The nodding person is assumed to be fully engaged while everyone else
/// keeps the frame's score. Zero people means no boost.
pub fn group_nod_boost(score: u32, num_people: u32) -> f64 {
    if num_people == 0 {
        return 0.0;
    }
    let score = f64::from(score);
    let people = f64::from(num_people);
    let group_score = (MAX_SCORE + score * (people - 1.0)) / people;
    (group_score - score).max(0.0)
}

/// Merges nods into the emotion timeline.
#[derive(Debug, Clone, Copy)]
pub struct EngagementCombiner {
    window_secs: f64,
    policy: NodMatchPolicy,
}

impl Default for EngagementCombiner {
    fn default() -> Self {
        Self::new(1.0, NodMatchPolicy::default())
    }
}

impl EngagementCombiner {
    pub fn new(window_secs: f64, policy: NodMatchPolicy) -> Self {
        Self {
            window_secs,
            policy,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.coincidence_window_secs, config.nod_match_policy)
    }

    /// Combine both signals into the fused timeline and its summary.
    ///
    /// `total_nods` is every nod in `nods`, matched or not.
    pub fn combine(&self, history: &[FrameEngagement], nods: &[NodEvent]) -> CombinedEngagement {
        let combined_history: Vec<CombinedEntry> = history
            .iter()
            .map(|entry| self.combine_entry(entry, nods))
            .collect();

        let finals = || combined_history.iter().map(|e| e.final_score);

        let summary = EngagementSummary {
            average_score: mean(finals()).unwrap_or(0.0),
            max_score: finals().reduce(f64::max).unwrap_or(0.0),
            min_score: finals().reduce(f64::min).unwrap_or(0.0),
            total_nods: nods.len() as u32,
            average_people: round2(
                mean(history.iter().map(|e| f64::from(e.num_people))).unwrap_or(0.0),
            ),
        };

        CombinedEngagement {
            combined_history,
            summary,
        }
    }

    fn combine_entry(&self, entry: &FrameEngagement, nods: &[NodEvent]) -> CombinedEntry {
        let (nod_timestamp, boost) = match self.matching_nod(entry, nods) {
            Some(nod) => (Some(nod.timestamp), group_nod_boost(entry.score, entry.num_people)),
            None => (None, 0.0),
        };

        let base = f64::from(entry.score);
        CombinedEntry {
            timestamp: entry.timestamp,
            base_score: entry.score,
            nod_boost: round2(boost),
            final_score: round2((base + boost).min(MAX_SCORE)),
            num_people: entry.num_people,
            nod_timestamp,
        }
    }

    /// The nod attributed to `entry` under the configured policy.
    fn matching_nod<'a>(&self, entry: &FrameEngagement, nods: &'a [NodEvent]) -> Option<&'a NodEvent> {
        let mut matches = nods
            .iter()
            .filter(|nod| (nod.timestamp - entry.timestamp).abs() <= self.window_secs);

        match self.policy {
            NodMatchPolicy::FirstMatch => matches.next(),
            NodMatchPolicy::LastMatch => matches.last(),
            // Every match yields the same group boost, so the earliest one
            // wins the tie.
            NodMatchPolicy::MaxBoost => matches.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nods(ts: &[f64]) -> Vec<NodEvent> {
        ts.iter().copied().map(NodEvent::new).collect()
    }

    #[test]
    fn test_single_person_nod_reaches_max() {
        let history = [FrameEngagement::new(1.0, 40, 1)];
        let result = EngagementCombiner::default().combine(&history, &nods(&[1.2]));

        let entry = &result.combined_history[0];
        assert_eq!(entry.nod_boost, 60.0);
        assert_eq!(entry.final_score, 100.0);
        assert_eq!(entry.base_score, 40);
    }

    #[test]
    fn test_two_people_nod_splits_boost() {
        let history = [FrameEngagement::new(1.0, 40, 2)];
        let result = EngagementCombiner::default().combine(&history, &nods(&[1.0]));

        let entry = &result.combined_history[0];
        assert_eq!(entry.nod_boost, 30.0);
        assert_eq!(entry.final_score, 70.0);
    }

    #[test]
    fn test_boost_is_rounded() {
        let history = [FrameEngagement::new(0.0, 50, 3)];
        let result = EngagementCombiner::default().combine(&history, &nods(&[0.5]));

        // (100 + 50 * 2) / 3 = 66.666.. -> boost 16.666..
        let entry = &result.combined_history[0];
        assert_eq!(entry.nod_boost, 16.67);
        assert_eq!(entry.final_score, 66.67);
    }

    #[test]
    fn test_no_nod_in_window_leaves_score() {
        let history = [FrameEngagement::new(5.0, 42, 1)];
        let result = EngagementCombiner::default().combine(&history, &nods(&[3.9, 6.01]));

        let entry = &result.combined_history[0];
        assert_eq!(entry.nod_boost, 0.0);
        assert_eq!(entry.final_score, 42.0);
        assert!(!entry.is_boosted());
        assert_eq!(result.summary.total_nods, 2);
    }

    #[test]
    fn test_window_is_inclusive() {
        let history = [FrameEngagement::new(2.0, 0, 1)];
        let result = EngagementCombiner::default().combine(&history, &nods(&[3.0]));
        assert_eq!(result.combined_history[0].final_score, 100.0);
    }

    #[test]
    fn test_zero_people_gets_no_boost() {
        assert_eq!(group_nod_boost(40, 0), 0.0);

        let history = [FrameEngagement::new(1.0, 40, 0)];
        let result = EngagementCombiner::default().combine(&history, &nods(&[1.0]));
        assert_eq!(result.combined_history[0].final_score, 40.0);
    }

    #[test]
    fn test_final_score_never_exceeds_max() {
        for score in [0, 1, 50, 99, 100] {
            for people in 0..6 {
                let history = [FrameEngagement::new(1.0, score, people)];
                let result = EngagementCombiner::default().combine(&history, &nods(&[1.0]));
                let final_score = result.combined_history[0].final_score;
                assert!((0.0..=100.0).contains(&final_score));
            }
        }
    }

    #[test]
    fn test_match_policy_attribution() {
        let history = [FrameEngagement::new(2.0, 40, 2)];
        let events = nods(&[1.5, 2.5, 9.0]);

        let first = EngagementCombiner::new(1.0, NodMatchPolicy::FirstMatch).combine(&history, &events);
        let last = EngagementCombiner::new(1.0, NodMatchPolicy::LastMatch).combine(&history, &events);
        let max = EngagementCombiner::new(1.0, NodMatchPolicy::MaxBoost).combine(&history, &events);

        assert_eq!(first.combined_history[0].nod_timestamp, Some(1.5));
        assert_eq!(last.combined_history[0].nod_timestamp, Some(2.5));
        assert_eq!(max.combined_history[0].nod_timestamp, Some(1.5));

        // the boost does not depend on which nod matched
        for result in [&first, &last, &max] {
            assert_eq!(result.combined_history[0].final_score, 70.0);
        }
    }

    #[test]
    fn test_summary() {
        let history = [
            FrameEngagement::new(1.0, 40, 1),
            FrameEngagement::new(2.0, 20, 3),
            FrameEngagement::new(5.0, 30, 2),
        ];
        let result = EngagementCombiner::default().combine(&history, &nods(&[1.0]));

        // nod at 1.0 boosts t=1 (to 100) and t=2 (to 46.67)
        assert_eq!(result.summary.max_score, 100.0);
        assert_eq!(result.summary.min_score, 30.0);
        assert!((result.summary.average_score - (100.0 + 46.67 + 30.0) / 3.0).abs() < 1e-9);
        assert_eq!(result.summary.total_nods, 1);
        assert_eq!(result.summary.average_people, 2.0);
    }

    #[test]
    fn test_empty_inputs() {
        let result = EngagementCombiner::default().combine(&[], &[]);
        assert!(result.combined_history.is_empty());
        assert_eq!(result.summary, EngagementSummary::default());
    }
}
