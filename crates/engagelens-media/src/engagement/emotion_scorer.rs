//! Emotion-based frame scoring.

use engagelens_models::utils::{mean, round2};
use engagelens_models::{EmotionDistribution, EmotionSummary, FrameEngagement, MAX_SCORE};

/// Focus and engagement of a single face, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceScore {
    pub focus: f64,
    pub engagement: f64,
}

impl FaceScore {
    /// Score one face.
    ///
    /// Engagement rewards happiness and surprise and penalises sadness.
    /// Focus rewards a neutral expression and penalises anger, fear and
    /// surprise. Raw engagement is doubled before clamping.
    pub fn from_distribution(emotions: &EmotionDistribution) -> Self {
        let engagement_raw = emotions.happy + emotions.surprise - 0.5 * emotions.sad;
        let focus_raw =
            1.5 * emotions.neutral - 0.5 * (emotions.angry + emotions.fear + emotions.surprise);

        Self {
            focus: clamp_score(focus_raw),
            engagement: clamp_score(engagement_raw * 2.0),
        }
    }

    /// Mean of focus and engagement.
    pub fn combined(&self) -> f64 {
        (self.focus + self.engagement) / 2.0
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_SCORE)
}

/// Aggregate the faces of one frame.
///
/// Returns `None` when no face was detected, so the frame leaves no entry.
pub fn score_frame(timestamp: f64, faces: &[EmotionDistribution]) -> Option<FrameEngagement> {
    if faces.is_empty() {
        return None;
    }

    let total: f64 = faces
        .iter()
        .map(FaceScore::from_distribution)
        .map(|face| face.focus + face.engagement)
        .sum();
    let people = faces.len() as u32;
    let score = (total / (2.0 * people as f64)).floor() as u32;

    Some(FrameEngagement::new(timestamp, score, people))
}

/// Accumulates the emotion timeline of one recording.
#[derive(Debug, Default)]
pub struct EmotionScorer {
    history: Vec<FrameEngagement>,
}

impl EmotionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a frame and append it to the timeline. Frames without faces are
    /// dropped.
    pub fn record(
        &mut self,
        timestamp: f64,
        faces: &[EmotionDistribution],
    ) -> Option<&FrameEngagement> {
        let entry = score_frame(timestamp, faces)?;
        self.history.push(entry);
        self.history.last()
    }

    pub fn history(&self) -> &[FrameEngagement] {
        &self.history
    }

    /// Summary statistics over the base scores. Empty timelines yield zeros.
    pub fn summary(&self, total_duration: f64, fps: f64) -> EmotionSummary {
        let scores = self.history.iter().map(|e| e.score);

        EmotionSummary {
            total_duration,
            fps,
            average_score: mean(scores.clone().map(f64::from)).unwrap_or(0.0),
            min_score: scores.clone().min().unwrap_or(0),
            max_score: scores.max().unwrap_or(0),
            average_people: round2(
                mean(self.history.iter().map(|e| f64::from(e.num_people))).unwrap_or(0.0),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagelens_models::EmotionLabel;

    fn face(pairs: &[(EmotionLabel, f64)]) -> EmotionDistribution {
        pairs
            .iter()
            .fold(EmotionDistribution::default(), |d, (label, v)| d.with(*label, *v))
    }

    #[test]
    fn test_neutral_face_is_fully_focused() {
        let score = FaceScore::from_distribution(&face(&[(EmotionLabel::Neutral, 100.0)]));
        assert_eq!(score.focus, 100.0);
        assert_eq!(score.engagement, 0.0);
        assert_eq!(score.combined(), 50.0);
    }

    #[test]
    fn test_happy_face_is_fully_engaged() {
        let score = FaceScore::from_distribution(&face(&[
            (EmotionLabel::Happy, 60.0),
            (EmotionLabel::Neutral, 40.0),
        ]));
        // engagement 60 * 2 clamps to 100, focus 40 * 1.5 = 60
        assert_eq!(score.engagement, 100.0);
        assert_eq!(score.focus, 60.0);
    }

    #[test]
    fn test_negative_emotions_clamp_to_zero() {
        let score = FaceScore::from_distribution(&face(&[
            (EmotionLabel::Sad, 50.0),
            (EmotionLabel::Angry, 30.0),
            (EmotionLabel::Fear, 20.0),
        ]));
        assert_eq!(score.focus, 0.0);
        assert_eq!(score.engagement, 0.0);
    }

    #[test]
    fn test_face_scores_stay_in_range() {
        let extremes = [0.0, 25.0, 50.0, 100.0, 250.0, -40.0];
        for &a in &extremes {
            for &b in &extremes {
                for label in EmotionLabel::ALL {
                    let d = face(&[(label, a), (EmotionLabel::Neutral, b)]);
                    let s = FaceScore::from_distribution(&d);
                    assert!((0.0..=100.0).contains(&s.focus));
                    assert!((0.0..=100.0).contains(&s.engagement));
                    assert!((0.0..=100.0).contains(&s.combined()));
                }
            }
        }
    }

    #[test]
    fn test_frame_score_floors_mean() {
        let faces = [
            face(&[(EmotionLabel::Neutral, 100.0)]),
            face(&[(EmotionLabel::Happy, 10.0), (EmotionLabel::Neutral, 90.0)]),
        ];
        // (100 + 0 + 100 + 20) / 4 = 55
        let entry = score_frame(2.0, &faces).unwrap();
        assert_eq!(entry.score, 55);
        assert_eq!(entry.num_people, 2);

        let odd = [face(&[(EmotionLabel::Neutral, 67.0)])];
        // focus 100.5 clamps to 100 -> 50
        assert_eq!(score_frame(0.0, &odd).unwrap().score, 50);

        let fractional = [face(&[(EmotionLabel::Neutral, 33.0)])];
        // focus 49.5 -> 24.75 floors to 24
        assert_eq!(score_frame(0.0, &fractional).unwrap().score, 24);
    }

    #[test]
    fn test_frames_without_faces_leave_no_entry() {
        let mut scorer = EmotionScorer::new();
        assert!(scorer.record(1.0, &[]).is_none());
        assert!(scorer.history().is_empty());

        scorer.record(2.0, &[face(&[(EmotionLabel::Neutral, 100.0)])]);
        assert_eq!(scorer.history().len(), 1);
    }

    #[test]
    fn test_summary() {
        let mut scorer = EmotionScorer::new();
        let neutral = face(&[(EmotionLabel::Neutral, 100.0)]);
        let sad = face(&[(EmotionLabel::Sad, 100.0)]);
        scorer.record(1.0, &[neutral]);
        scorer.record(2.0, &[sad, neutral, neutral]);

        let summary = scorer.summary(3.0, 30.0);
        assert_eq!(summary.max_score, 50);
        assert_eq!(summary.min_score, 33);
        assert_eq!(summary.average_score, 41.5);
        assert_eq!(summary.average_people, 2.0);
        assert_eq!(summary.total_duration, 3.0);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = EmotionScorer::new().summary(0.0, 30.0);
        assert_eq!(summary.average_score, 0.0);
        assert_eq!(summary.min_score, 0);
        assert_eq!(summary.max_score, 0);
        assert_eq!(summary.average_people, 0.0);
    }
}
