// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint and pose value types.
//!
//! A [`Pose`] is the set of anatomical landmarks detected for one subject in one frame.
//! Coordinates are normalized image coordinates (origin top-left, y increasing downward).
//! A [`Keypoint`] is only *usable* when its confidence exceeds
//! [`MIN_KEYPOINT_CONFIDENCE`]; unusable keypoints are reported as absent by
//! [`Pose::usable`] and never stand in as `(0, 0)`.

use std::fmt;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Keypoints at or below this confidence are treated as absent.
pub const MIN_KEYPOINT_CONFIDENCE: f64 = 0.5;

/// Number of rows in a COCO-pose keypoint array.
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// One detected anatomical landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Normalized x coordinate.
    pub x: f64,
    /// Normalized y coordinate (increasing downward).
    pub y: f64,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Keypoint {
    /// Create a keypoint.
    pub const fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the keypoint may feed geometry.
    ///
    /// Requires a confidence above [`MIN_KEYPOINT_CONFIDENCE`] and finite values.
    pub fn is_valid(&self) -> bool {
        self.confidence > MIN_KEYPOINT_CONFIDENCE
            && self.x.is_finite()
            && self.y.is_finite()
            && self.confidence.is_finite()
    }

    /// Midpoint of two keypoints, present only when both are usable.
    ///
    /// The midpoint's confidence is the weaker of the two inputs.
    pub fn midpoint(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        let a = a.filter(Self::is_valid)?;
        let b = b.filter(Self::is_valid)?;
        Some(Self::new(
            (a.x + b.x) / 2.0,
            (a.y + b.y) / 2.0,
            a.confidence.min(b.confidence),
        ))
    }
}

/// Named anatomical landmarks carried by a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    Nose,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
}

impl Landmark {
    /// Every landmark, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::Nose,
        Self::Neck,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
    ];

    /// COCO-pose row order (17 keypoints, no neck).
    pub const COCO17: [Self; COCO_KEYPOINT_COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Snake-case name, matching the serialized field name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Neck => "neck",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The keypoints of one subject in one frame.
///
/// Immutable once built; construct with [`Pose::builder`] or [`Pose::from_coco17`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pose {
    nose: Option<Keypoint>,
    neck: Option<Keypoint>,
    left_shoulder: Option<Keypoint>,
    right_shoulder: Option<Keypoint>,
    left_elbow: Option<Keypoint>,
    right_elbow: Option<Keypoint>,
    left_wrist: Option<Keypoint>,
    right_wrist: Option<Keypoint>,
    left_hip: Option<Keypoint>,
    right_hip: Option<Keypoint>,
    left_knee: Option<Keypoint>,
    right_knee: Option<Keypoint>,
    left_ankle: Option<Keypoint>,
    right_ankle: Option<Keypoint>,
    left_eye: Option<Keypoint>,
    right_eye: Option<Keypoint>,
    left_ear: Option<Keypoint>,
    right_ear: Option<Keypoint>,
}

impl Pose {
    /// Start building a pose.
    pub fn builder() -> PoseBuilder {
        PoseBuilder::default()
    }

    /// The raw keypoint for a landmark, regardless of confidence.
    pub fn get(&self, landmark: Landmark) -> Option<Keypoint> {
        *self.slot(landmark)
    }

    /// The keypoint for a landmark if it is usable.
    pub fn usable(&self, landmark: Landmark) -> Option<Keypoint> {
        self.get(landmark).filter(Keypoint::is_valid)
    }

    /// Midpoint of both hips, present only when both hips are usable.
    pub fn mid_hip(&self) -> Option<Keypoint> {
        Keypoint::midpoint(self.left_hip, self.right_hip)
    }

    /// Number of usable keypoints.
    pub fn usable_count(&self) -> usize {
        Landmark::ALL
            .iter()
            .filter(|&&lm| self.usable(lm).is_some())
            .count()
    }

    /// Build a pose from a COCO-pose keypoint array in normalized coordinates.
    ///
    /// `keypoints` has shape `(17, 2)` or `(17, 3)`; the optional third column is the
    /// keypoint confidence (rows without it get confidence `1.0`). COCO carries no neck,
    /// so it is synthesized as the shoulder midpoint with the weaker shoulder confidence,
    /// and left absent unless both shoulders are usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidKeypoints`] if the array shape is not `(17, 2|3)`.
    pub fn from_coco17(keypoints: ArrayView2<'_, f32>) -> Result<Self> {
        Self::from_coco17_scaled(keypoints, 1.0, 1.0)
    }

    /// Build a pose from a COCO-pose keypoint array in pixel coordinates.
    ///
    /// Coordinates are divided by the original image size `(height, width)`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidKeypoints`] for a bad shape or an empty image size.
    pub fn from_coco17_pixels(
        keypoints: ArrayView2<'_, f32>,
        orig_shape: (u32, u32),
    ) -> Result<Self> {
        let (h, w) = orig_shape;
        if h == 0 || w == 0 {
            return Err(EngineError::InvalidKeypoints(format!(
                "image size must be non-zero, got {h}x{w}"
            )));
        }
        Self::from_coco17_scaled(keypoints, f64::from(w), f64::from(h))
    }

    fn from_coco17_scaled(keypoints: ArrayView2<'_, f32>, w: f64, h: f64) -> Result<Self> {
        let (rows, cols) = keypoints.dim();
        if rows != COCO_KEYPOINT_COUNT || !(2..=3).contains(&cols) {
            return Err(EngineError::InvalidKeypoints(format!(
                "expected shape ({COCO_KEYPOINT_COUNT}, 2|3), got ({rows}, {cols})"
            )));
        }

        let mut builder = Self::builder();
        for (landmark, row) in Landmark::COCO17.iter().zip(keypoints.rows()) {
            let confidence = if cols == 3 { f64::from(row[2]) } else { 1.0 };
            builder = builder.with(
                *landmark,
                Keypoint::new(f64::from(row[0]) / w, f64::from(row[1]) / h, confidence),
            );
        }

        let pose = builder.build();
        let neck = Keypoint::midpoint(pose.left_shoulder, pose.right_shoulder);
        Ok(Self { neck, ..pose })
    }

    fn slot(&self, landmark: Landmark) -> &Option<Keypoint> {
        match landmark {
            Landmark::Nose => &self.nose,
            Landmark::Neck => &self.neck,
            Landmark::LeftShoulder => &self.left_shoulder,
            Landmark::RightShoulder => &self.right_shoulder,
            Landmark::LeftElbow => &self.left_elbow,
            Landmark::RightElbow => &self.right_elbow,
            Landmark::LeftWrist => &self.left_wrist,
            Landmark::RightWrist => &self.right_wrist,
            Landmark::LeftHip => &self.left_hip,
            Landmark::RightHip => &self.right_hip,
            Landmark::LeftKnee => &self.left_knee,
            Landmark::RightKnee => &self.right_knee,
            Landmark::LeftAnkle => &self.left_ankle,
            Landmark::RightAnkle => &self.right_ankle,
            Landmark::LeftEye => &self.left_eye,
            Landmark::RightEye => &self.right_eye,
            Landmark::LeftEar => &self.left_ear,
            Landmark::RightEar => &self.right_ear,
        }
    }

    fn slot_mut(&mut self, landmark: Landmark) -> &mut Option<Keypoint> {
        match landmark {
            Landmark::Nose => &mut self.nose,
            Landmark::Neck => &mut self.neck,
            Landmark::LeftShoulder => &mut self.left_shoulder,
            Landmark::RightShoulder => &mut self.right_shoulder,
            Landmark::LeftElbow => &mut self.left_elbow,
            Landmark::RightElbow => &mut self.right_elbow,
            Landmark::LeftWrist => &mut self.left_wrist,
            Landmark::RightWrist => &mut self.right_wrist,
            Landmark::LeftHip => &mut self.left_hip,
            Landmark::RightHip => &mut self.right_hip,
            Landmark::LeftKnee => &mut self.left_knee,
            Landmark::RightKnee => &mut self.right_knee,
            Landmark::LeftAnkle => &mut self.left_ankle,
            Landmark::RightAnkle => &mut self.right_ankle,
            Landmark::LeftEye => &mut self.left_eye,
            Landmark::RightEye => &mut self.right_eye,
            Landmark::LeftEar => &mut self.left_ear,
            Landmark::RightEar => &mut self.right_ear,
        }
    }
}

/// Builder for [`Pose`].
#[derive(Debug, Clone, Default)]
pub struct PoseBuilder {
    pose: Pose,
}

impl PoseBuilder {
    /// Set the keypoint for a landmark.
    #[must_use]
    pub fn with(mut self, landmark: Landmark, keypoint: Keypoint) -> Self {
        *self.pose.slot_mut(landmark) = Some(keypoint);
        self
    }

    /// Set a landmark from raw `(x, y, confidence)` values.
    #[must_use]
    pub fn point(self, landmark: Landmark, x: f64, y: f64, confidence: f64) -> Self {
        self.with(landmark, Keypoint::new(x, y, confidence))
    }

    /// Finish the pose.
    pub fn build(self) -> Pose {
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_keypoint_validity() {
        assert!(Keypoint::new(0.5, 0.5, 0.51).is_valid());
        assert!(!Keypoint::new(0.5, 0.5, 0.5).is_valid());
        assert!(!Keypoint::new(f64::NAN, 0.5, 0.9).is_valid());
        assert!(!Keypoint::new(0.5, 0.5, f64::NAN).is_valid());
    }

    #[test]
    fn test_midpoint_takes_weaker_confidence() {
        let mid = Keypoint::midpoint(
            Some(Keypoint::new(0.4, 0.6, 0.9)),
            Some(Keypoint::new(0.6, 0.8, 0.7)),
        )
        .unwrap();
        assert!((mid.x - 0.5).abs() < 1e-12);
        assert!((mid.y - 0.7).abs() < 1e-12);
        assert!((mid.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_requires_both_usable() {
        let good = Some(Keypoint::new(0.4, 0.6, 0.9));
        assert!(Keypoint::midpoint(good, None).is_none());
        assert!(Keypoint::midpoint(good, Some(Keypoint::new(0.6, 0.6, 0.2))).is_none());
    }

    #[test]
    fn test_usable_filters_low_confidence() {
        let pose = Pose::builder()
            .point(Landmark::Neck, 0.5, 0.2, 0.9)
            .point(Landmark::Nose, 0.5, 0.1, 0.3)
            .build();
        assert!(pose.usable(Landmark::Neck).is_some());
        assert!(pose.usable(Landmark::Nose).is_none());
        assert!(pose.get(Landmark::Nose).is_some());
        assert_eq!(pose.usable_count(), 1);
    }

    #[test]
    fn test_from_coco17_synthesizes_neck() {
        let mut data = Array2::<f32>::zeros((17, 3));
        data[[5, 0]] = 0.4;
        data[[5, 1]] = 0.3;
        data[[5, 2]] = 0.9;
        data[[6, 0]] = 0.6;
        data[[6, 1]] = 0.3;
        data[[6, 2]] = 0.8;

        let pose = Pose::from_coco17(data.view()).unwrap();
        let neck = pose.usable(Landmark::Neck).unwrap();
        assert!((neck.x - 0.5).abs() < 1e-6);
        assert!((neck.y - 0.3).abs() < 1e-6);
        assert!((neck.confidence - 0.8).abs() < 1e-6);
        assert!(pose.usable(Landmark::Nose).is_none());
    }

    #[test]
    fn test_from_coco17_neck_needs_both_shoulders() {
        for weak in [f32::NAN, 0.5, 0.2] {
            let mut data = Array2::<f32>::zeros((17, 3));
            data[[5, 0]] = 0.4;
            data[[5, 1]] = 0.3;
            data[[5, 2]] = 0.9;
            data[[6, 0]] = 0.6;
            data[[6, 1]] = 0.3;
            data[[6, 2]] = weak;

            let pose = Pose::from_coco17(data.view()).unwrap();
            assert!(pose.usable(Landmark::RightShoulder).is_none());
            assert!(pose.get(Landmark::Neck).is_none(), "shoulder confidence {weak}");
        }
    }

    #[test]
    fn test_from_coco17_without_confidence_column() {
        let data = Array2::<f32>::from_elem((17, 2), 0.5);
        let pose = Pose::from_coco17(data.view()).unwrap();
        assert_eq!(pose.usable_count(), 18);
    }

    #[test]
    fn test_from_coco17_pixels_normalizes() {
        let mut data = Array2::<f32>::zeros((17, 3));
        data[[0, 0]] = 320.0;
        data[[0, 1]] = 120.0;
        data[[0, 2]] = 1.0;
        let pose = Pose::from_coco17_pixels(data.view(), (480, 640)).unwrap();
        let nose = pose.usable(Landmark::Nose).unwrap();
        assert!((nose.x - 0.5).abs() < 1e-9);
        assert!((nose.y - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_from_coco17_rejects_bad_shape() {
        let data = Array2::<f32>::zeros((18, 3));
        assert!(matches!(
            Pose::from_coco17(data.view()),
            Err(EngineError::InvalidKeypoints(_))
        ));
        let data = Array2::<f32>::zeros((17, 4));
        assert!(Pose::from_coco17(data.view()).is_err());
        let data = Array2::<f32>::zeros((17, 3));
        assert!(Pose::from_coco17_pixels(data.view(), (0, 640)).is_err());
    }

    #[test]
    fn test_pose_serde_uses_landmark_names() {
        let pose = Pose::builder().point(Landmark::LeftHip, 0.4, 0.6, 0.9).build();
        let json = serde_json::to_string(&pose).unwrap();
        assert!(json.contains("\"left_hip\""));
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);

        let sparse: Pose =
            serde_json::from_str(r#"{"neck": {"x": 0.5, "y": 0.2, "confidence": 0.9}}"#).unwrap();
        assert!(sparse.usable(Landmark::Neck).is_some());
        assert!(sparse.get(Landmark::LeftHip).is_none());
    }
}
