// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Single-frame fall scoring.
//!
//! Combines the trunk and leg angles of one pose into a fall likelihood in `[0, 1]`.
//! A missing angle contributes nothing; its weight is not redistributed to the other
//! signal.

use serde::{Deserialize, Serialize};

use crate::config::FallConfig;
use crate::geometry::{self, PoseGeometry};
use crate::pose::Pose;

/// Single-frame fall assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAssessment {
    /// Angles the score was computed from.
    pub geometry: PoseGeometry,
    /// Fall likelihood for this frame, in `[0, 1]`.
    pub score: f64,
    /// Whether `score` is strictly above the frame threshold.
    pub exceeds_threshold: bool,
}

/// Analyze a pose and score it.
pub fn assess(pose: &Pose, config: &FallConfig) -> FrameAssessment {
    score(geometry::analyze(pose), config)
}

/// Score precomputed pose geometry.
pub fn score(geometry: PoseGeometry, config: &FallConfig) -> FrameAssessment {
    let trunk = geometry
        .trunk_angle
        .map_or(0.0, |angle| trunk_contribution(angle, config));
    let leg = geometry
        .leg_angle
        .map_or(0.0, |angle| leg_contribution(angle, config));

    // f64::max drops NaN, so the result is always a number.
    let score = (trunk + leg).max(0.0).min(1.0);
    FrameAssessment {
        geometry,
        score,
        exceeds_threshold: score > config.frame_threshold,
    }
}

fn trunk_contribution(angle: f64, config: &FallConfig) -> f64 {
    (angle / config.trunk_full_scale_deg).min(1.0) * config.trunk_weight
}

fn leg_contribution(angle: f64, config: &FallConfig) -> f64 {
    let deviation = (angle - config.leg_reference_deg).abs() / config.leg_full_scale_deg;
    let normal = 1.0 - deviation.min(1.0);
    (1.0 - normal) * config.leg_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::fixtures::{prone_bent, prone_straight, standing};
    use crate::pose::Landmark;

    const EPS: f64 = 1e-9;

    fn geometry(trunk: Option<f64>, leg: Option<f64>) -> PoseGeometry {
        PoseGeometry {
            trunk_angle: trunk,
            leg_angle: leg,
        }
    }

    #[test]
    fn test_no_geometry_scores_zero() {
        let result = score(PoseGeometry::default(), &FallConfig::default());
        assert!(result.score.abs() < EPS);
        assert!(!result.exceeds_threshold);
    }

    #[test]
    fn test_low_confidence_pose_scores_zero() {
        let mut builder = Pose::builder();
        for landmark in Landmark::ALL {
            builder = builder.point(landmark, 0.3, 0.9, 0.5);
        }
        let result = assess(&builder.build(), &FallConfig::default());
        assert!(result.score.abs() < EPS);
        assert!(!result.exceeds_threshold);
    }

    #[test]
    fn test_standing_scores_zero() {
        let result = assess(&standing(), &FallConfig::default());
        assert!(result.score.abs() < 1e-6, "got {}", result.score);
        assert!(!result.exceeds_threshold);
    }

    #[test]
    fn test_prone_bent_scores_trunk_weight_only() {
        let result = assess(&prone_bent(), &FallConfig::default());
        assert!(result.score >= 0.6 - 1e-6, "got {}", result.score);
        // Exactly the trunk weight, which does not exceed 0.7 on its own.
        assert!(!result.exceeds_threshold);
    }

    #[test]
    fn test_prone_straight_exceeds_threshold() {
        let result = assess(&prone_straight(), &FallConfig::default());
        let expected = 0.6 + (30.0 / 70.0) * 0.4;
        assert!((result.score - expected).abs() < 1e-6, "got {}", result.score);
        assert!(result.exceeds_threshold);
    }

    #[test]
    fn test_trunk_contribution_saturates() {
        let config = FallConfig::default();
        let at_scale = score(geometry(Some(75.0), None), &config).score;
        let beyond = score(geometry(Some(120.0), None), &config).score;
        assert!((at_scale - 0.6).abs() < EPS);
        assert!((beyond - 0.6).abs() < EPS);
        let half = score(geometry(Some(37.5), None), &config).score;
        assert!((half - 0.3).abs() < EPS);
    }

    #[test]
    fn test_leg_deviation_is_symmetric() {
        let config = FallConfig::default();
        let low = score(geometry(None, Some(115.0)), &config).score;
        let high = score(geometry(None, Some(185.0)), &config).score;
        assert!((low - 0.2).abs() < EPS);
        assert!((high - 0.2).abs() < EPS);
        let max = score(geometry(None, Some(40.0)), &config).score;
        assert!((max - 0.4).abs() < EPS);
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = FallConfig::default().with_frame_threshold(0.6);
        let result = score(geometry(Some(90.0), Some(150.0)), &config);
        assert!((result.score - 0.6).abs() < EPS);
        assert!(!result.exceeds_threshold);
    }

    #[test]
    fn test_score_clamped_with_heavy_weights() {
        let config = FallConfig::default().with_weights(0.9, 0.9);
        let result = score(geometry(Some(90.0), Some(10.0)), &config);
        assert!((result.score - 1.0).abs() < EPS);
        assert!(result.exceeds_threshold);
    }
}
