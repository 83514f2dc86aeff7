// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Fallwatch Event Detection Engine
//!
//! Turns per-frame body-pose keypoints (plus an independent object-classifier signal) into
//! debounced fall events, and turns recognized text (plus a sentiment score) into emotion
//! classifications. The engine consumes the outputs of pose estimators, object detectors,
//! speech recognizers and sentiment models; it runs none of them itself.
//!
//! ## Features
//!
//! - **Pose geometry** - Trunk tilt and knee flex angles, with low-confidence keypoints treated as absent
//! - **Fall scoring** - Weighted single-frame fall likelihood with a configurable threshold
//! - **Debouncing** - A run of consecutive positive frames confirms a fall; strong object detections bypass it
//! - **Edge-triggered events** - One event per fall until it is cancelled
//! - **Emotion classification** - Keyword tallies with a sentiment fallback
//! - **COCO-pose input** - Build poses directly from `(17, 3)` keypoint arrays
//!
//! ## Quick Start
//!
//! ```rust
//! use fallwatch::{Engine, Landmark, ObjectSignal, Pose, Trigger};
//!
//! let mut engine = Engine::default();
//!
//! // Someone lying flat with straight legs.
//! let prone = Pose::builder()
//!     .point(Landmark::Neck, 0.2, 0.8, 0.9)
//!     .point(Landmark::LeftHip, 0.5, 0.78, 0.9)
//!     .point(Landmark::RightHip, 0.5, 0.82, 0.9)
//!     .point(Landmark::LeftKnee, 0.7, 0.78, 0.9)
//!     .point(Landmark::RightKnee, 0.7, 0.82, 0.9)
//!     .point(Landmark::LeftAnkle, 0.9, 0.78, 0.9)
//!     .point(Landmark::RightAnkle, 0.9, 0.82, 0.9)
//!     .build();
//!
//! let events: Vec<_> = (0..6)
//!     .filter_map(|_| engine.observe_frame(&prone, None))
//!     .collect();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].triggered_by, Trigger::PoseDebounced);
//!
//! engine.cancel_active_event();
//! let object = ObjectSignal::new("fall", 0.9);
//! assert!(engine.observe_frame(&prone, Some(&object)).is_some());
//!
//! let emotion = engine.classify_text("今天很开心", 0.2);
//! println!("{} {:.2}", emotion.label, emotion.confidence);
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Replay a JSON Lines stream of frames, printing fall events as JSON
//! fallwatch frames --input frames.jsonl
//!
//! # Read frames from stdin with a custom config and a shorter debounce
//! cat frames.jsonl | fallwatch frames --input - --config fallwatch.yaml --debounce 3
//!
//! # Classify a transcript
//! fallwatch text "有点担心" --sentiment -0.2
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use fallwatch::{EngineConfig, FallConfig};
//!
//! let config = EngineConfig::new().with_fall(
//!     FallConfig::new()
//!         .with_frame_threshold(0.65) // More sensitive
//!         .with_debounce_frames(8)    // Longer confirmation run
//!         .with_weights(0.6, 0.4),
//! );
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pose`] | [`Keypoint`], [`Pose`] and [`Landmark`] value types |
//! | [`geometry`] | Trunk and leg angles ([`PoseGeometry`]) |
//! | [`classifier`] | Single-frame fall scoring ([`FrameAssessment`]) |
//! | [`debounce`] | Consecutive-frame [`Debouncer`] |
//! | [`emotion`] | [`EmotionClassifier`] and [`EmotionLabel`] |
//! | [`engine`] | [`Engine`] facade, [`FallEvent`], [`ObjectSignal`] |
//! | [`worker`] | [`worker::FrameWorker`] single-consumer thread |
//! | [`config`] | [`EngineConfig`], [`FallConfig`], [`EmotionConfig`] |
//! | [`error`] | Error types ([`EngineError`], [`Result`]) |

// Modules
pub mod classifier;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod pose;
pub mod worker;

// Re-export main types for convenience
pub use classifier::FrameAssessment;
pub use config::{EmotionConfig, EngineConfig, FallConfig};
pub use debounce::{DebounceState, Debouncer, Trigger};
pub use emotion::{
    EmotionClassifier, EmotionEvent, EmotionLabel, EmotionLexicon, EmotionSignal,
    SentimentAnalyzer,
};
pub use engine::{Engine, FallEvent, ObjectSignal};
pub use error::{EngineError, Result};
pub use geometry::PoseGeometry;
pub use pose::{Keypoint, Landmark, Pose, PoseBuilder};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "fallwatch");
    }
}
