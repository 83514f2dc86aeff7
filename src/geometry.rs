// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose geometry: trunk tilt and leg flex angles.
//!
//! Every function here is pure. An angle is `None` whenever a required keypoint is not
//! usable or the vectors involved are degenerate (zero length).

use serde::{Deserialize, Serialize};

use crate::pose::{Keypoint, Landmark, Pose};

/// Vectors shorter than this are treated as zero length.
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// Angles derived from one pose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseGeometry {
    /// Deviation of the neck-to-mid-hip vector from vertical, in degrees.
    pub trunk_angle: Option<f64>,
    /// Mean interior knee angle over the usable legs, in degrees.
    pub leg_angle: Option<f64>,
}

/// Compute both angles for a pose.
pub fn analyze(pose: &Pose) -> PoseGeometry {
    PoseGeometry {
        trunk_angle: trunk_angle(pose),
        leg_angle: leg_angle(pose),
    }
}

/// Trunk tilt: `0°` upright, `90°` horizontal.
///
/// Needs a usable neck and both hips usable.
pub fn trunk_angle(pose: &Pose) -> Option<f64> {
    let neck = pose.usable(Landmark::Neck)?;
    let mid_hip = pose.mid_hip()?;

    let dx = mid_hip.x - neck.x;
    let dy = mid_hip.y - neck.y;
    if dx.hypot(dy) < MIN_SEGMENT_LENGTH {
        return None;
    }
    Some(dx.atan2(dy).to_degrees().abs())
}

/// Leg flex angle at the knee, averaged over whichever sides are usable.
pub fn leg_angle(pose: &Pose) -> Option<f64> {
    let left = side_leg_angle(pose, Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle);
    let right = side_leg_angle(pose, Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle);

    match (left, right) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (l, r) => l.or(r),
    }
}

fn side_leg_angle(pose: &Pose, hip: Landmark, knee: Landmark, ankle: Landmark) -> Option<f64> {
    joint_angle(pose.usable(hip)?, pose.usable(knee)?, pose.usable(ankle)?)
}

/// Unsigned interior angle at `joint` between the segments to `a` and `c`, in `[0°, 180°]`.
///
/// Returns `None` if either segment has zero length.
pub fn joint_angle(a: Keypoint, joint: Keypoint, c: Keypoint) -> Option<f64> {
    let (v1x, v1y) = (a.x - joint.x, a.y - joint.y);
    let (v2x, v2y) = (c.x - joint.x, c.y - joint.y);
    if v1x.hypot(v1y) < MIN_SEGMENT_LENGTH || v2x.hypot(v2y) < MIN_SEGMENT_LENGTH {
        return None;
    }

    let dot = v1x.mul_add(v2x, v1y * v2y);
    let cross = v1x.mul_add(v2y, -(v1y * v2x));
    Some(cross.atan2(dot).to_degrees().abs())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::pose::{Landmark, Pose, PoseBuilder};

    fn legs(builder: PoseBuilder, hip_y: f64, knee: (f64, f64), ankle: (f64, f64)) -> PoseBuilder {
        builder
            .point(Landmark::LeftHip, 0.45, hip_y, 0.9)
            .point(Landmark::RightHip, 0.55, hip_y, 0.9)
            .point(Landmark::LeftKnee, 0.45 + knee.0, knee.1, 0.9)
            .point(Landmark::RightKnee, 0.55 + knee.0, knee.1, 0.9)
            .point(Landmark::LeftAnkle, 0.45 + ankle.0, ankle.1, 0.9)
            .point(Landmark::RightAnkle, 0.55 + ankle.0, ankle.1, 0.9)
    }

    /// Upright trunk, knees flexed to exactly 150°.
    pub fn standing() -> Pose {
        // Thigh straight down, shin rotated 30° off the thigh's extension.
        let shin = 0.2;
        let (sx, sy) = (shin * 30f64.to_radians().sin(), shin * 30f64.to_radians().cos());
        let builder = Pose::builder().point(Landmark::Neck, 0.5, 0.2, 0.9);
        legs(builder, 0.5, (0.0, 0.7), (sx, 0.7 + sy)).build()
    }

    /// Horizontal trunk with straight legs (knee angle 180°).
    pub fn prone_straight() -> Pose {
        Pose::builder()
            .point(Landmark::Neck, 0.2, 0.8, 0.9)
            .point(Landmark::LeftHip, 0.5, 0.78, 0.9)
            .point(Landmark::RightHip, 0.5, 0.82, 0.9)
            .point(Landmark::LeftKnee, 0.7, 0.78, 0.9)
            .point(Landmark::RightKnee, 0.7, 0.82, 0.9)
            .point(Landmark::LeftAnkle, 0.9, 0.78, 0.9)
            .point(Landmark::RightAnkle, 0.9, 0.82, 0.9)
            .build()
    }

    /// Horizontal trunk with knees at 150°.
    pub fn prone_bent() -> Pose {
        let shin = 0.2;
        let (sx, sy) = (shin * 30f64.to_radians().cos(), shin * 30f64.to_radians().sin());
        Pose::builder()
            .point(Landmark::Neck, 0.2, 0.8, 0.9)
            .point(Landmark::LeftHip, 0.5, 0.78, 0.9)
            .point(Landmark::RightHip, 0.5, 0.82, 0.9)
            .point(Landmark::LeftKnee, 0.7, 0.78, 0.9)
            .point(Landmark::RightKnee, 0.7, 0.82, 0.9)
            .point(Landmark::LeftAnkle, 0.7 + sx, 0.78 + sy, 0.9)
            .point(Landmark::RightAnkle, 0.7 + sx, 0.82 + sy, 0.9)
            .build()
    }
}
