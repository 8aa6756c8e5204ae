//! Pillar score arithmetic behind the radar chart.
//!
//! Scores arrive on a 0–5 scale and are shown as percentages.  The "projected" series is an
//! illustrative target state: the current series shifted uniformly so its mean lands on
//! [`PROJECTION_TARGET_MEAN`], then clamped to `[0, PROJECTION_CEILING]`.  It is not derived from
//! the work plan.

use crate::assessment::PillarScore;

/// Upper bound of the input score scale.
pub const MAX_SCORE: f64 = 5.0;
/// Mean the projected series is shifted to.
pub const PROJECTION_TARGET_MEAN: f64 = 68.0;
/// Largest projected percentage; keeps the projection off the outer ring.
pub const PROJECTION_CEILING: f64 = 95.0;

/// Scales a 0–5 score to a percentage clamped to `[0, 100]`.
pub fn score_to_percent(score: f64) -> f64 {
    (score / MAX_SCORE * 100.0).clamp(0.0, 100.0)
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Shift that moves the mean of `current` onto [`PROJECTION_TARGET_MEAN`].
pub fn projection_shift(current: &[f64]) -> f64 {
    PROJECTION_TARGET_MEAN - mean(current)
}

/// Projected series before clamping; its mean is exactly the target for non-empty input.
pub fn unclamped_projection(current: &[f64]) -> Vec<f64> {
    let shift = projection_shift(current);
    current.iter().map(|value| value + shift).collect()
}

/// Projected series: [`unclamped_projection`] clamped to `[0, PROJECTION_CEILING]`.
pub fn project(current: &[f64]) -> Vec<f64> {
    unclamped_projection(current)
        .into_iter()
        .map(|value| value.clamp(0.0, PROJECTION_CEILING))
        .collect()
}

/// Labels plus current and projected percentages, index-aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PillarSeries {
    pub labels: Vec<String>,
    pub current: Vec<f64>,
    pub projected: Vec<f64>,
}

impl PillarSeries {
    /// Builds the series from pillar records.  Missing or non-numeric scores count as zero.
    pub fn from_pillars(pillars: &[PillarScore]) -> Self {
        let labels = pillars.iter().map(|pillar| pillar.name.clone()).collect();
        let current: Vec<f64> = pillars
            .iter()
            .map(|pillar| {
                let score = pillar.score.unwrap_or_else(|| {
                    if !pillar.score_text.is_empty() {
                        log::warn!(
                            "pillar '{}' has non-numeric score '{}'; charting it as 0",
                            pillar.name,
                            pillar.score_text
                        );
                    }
                    0.0
                });
                score_to_percent(score)
            })
            .collect();
        let projected = project(&current);

        Self {
            labels,
            current,
            projected,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar(name: &str, score: Option<f64>) -> PillarScore {
        PillarScore {
            name: name.to_owned(),
            score_text: score.map(|s| s.to_string()).unwrap_or_default(),
            score,
            observations: String::new(),
        }
    }

    #[test]
    fn percent_is_linear_in_range() {
        for step in 0..=50 {
            let score = step as f64 / 10.0;
            let expected = score / 5.0 * 100.0;
            assert!((score_to_percent(score) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(score_to_percent(-1.0), 0.0);
        assert_eq!(score_to_percent(7.5), 100.0);
    }

    #[test]
    fn empty_mean_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn unclamped_projection_centres_on_target() {
        let current = [20.0, 40.0, 60.0, 100.0];
        let projected = unclamped_projection(&current);
        assert!((mean(&projected) - PROJECTION_TARGET_MEAN).abs() < 1e-9);

        let shift = projection_shift(&current);
        for (before, after) in current.iter().zip(&projected) {
            assert!((after - before - shift).abs() < 1e-9);
        }
    }

    #[test]
    fn projection_without_clamping_keeps_target_mean() {
        let projected = project(&[40.0, 50.0, 60.0]);
        assert_eq!(projected, vec![58.0, 68.0, 78.0]);
        assert!((mean(&projected) - PROJECTION_TARGET_MEAN).abs() < 1e-9);
    }

    #[test]
    fn projection_is_clamped_to_ceiling_and_floor() {
        // mean 50 -> shift +18
        let projected = project(&[100.0, 0.0, 50.0]);
        assert_eq!(projected, vec![95.0, 18.0, 68.0]);

        // mean 90 -> shift -22
        let projected = project(&[100.0, 100.0, 70.0]);
        assert_eq!(projected, vec![78.0, 78.0, 48.0]);

        // a single far-off value can drop below zero before clamping
        let projected = project(&[0.0, 100.0, 100.0, 100.0, 100.0]);
        assert!(projected.iter().all(|v| (0.0..=PROJECTION_CEILING).contains(v)));
    }

    #[test]
    fn series_counts_missing_scores_as_zero() {
        let series = PillarSeries::from_pillars(&[
            pillar("Seguridad", Some(2.0)),
            pillar("Costos", None),
        ]);

        assert_eq!(series.labels, vec!["Seguridad", "Costos"]);
        assert_eq!(series.current, vec![40.0, 0.0]);
        // mean 20 -> shift 48
        assert_eq!(series.projected, vec![88.0, 48.0]);
    }

    #[test]
    fn empty_series_is_empty() {
        let series = PillarSeries::from_pillars(&[]);
        assert!(series.is_empty());
        assert!(series.projected.is_empty());
    }
}
