// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Engine configuration.
//!
//! This module defines [`EngineConfig`] and its two halves: [`FallConfig`], which holds the
//! fall-scoring weights, the frame threshold and the debounce settings, and
//! [`EmotionConfig`], which holds the keyword lexicon and the confidence constants.
//! Every value has a documented default; configurations can be
//! built in code with the `with_*` setters or loaded from YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionLexicon;
use crate::error::{EngineError, Result};

/// Configuration for the fall pipeline.
///
/// # Example
///
/// ```rust
/// use fallwatch::FallConfig;
///
/// let config = FallConfig::new()
///     .with_frame_threshold(0.8)
///     .with_debounce_frames(8)
///     .with_instant_threshold(0.9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallConfig {
    /// Weight of the trunk-tilt signal.
    pub trunk_weight: f64,
    /// Weight of the leg-flex signal.
    pub leg_weight: f64,
    /// Trunk angle (degrees) at which the trunk signal saturates.
    pub trunk_full_scale_deg: f64,
    /// Knee angle (degrees) of a normal standing pose.
    pub leg_reference_deg: f64,
    /// Deviation from the reference knee angle (degrees) at which the leg signal saturates.
    pub leg_full_scale_deg: f64,
    /// A frame is positive when its score is strictly above this value.
    pub frame_threshold: f64,
    /// Consecutive positive frames required to confirm a fall.
    pub debounce_frames: u32,
    /// Object-classifier label that counts as an instant fall signal.
    pub instant_label: String,
    /// Object-classifier confidence must be strictly above this value.
    pub instant_threshold: f64,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            trunk_weight: 0.6,
            leg_weight: 0.4,
            trunk_full_scale_deg: 75.0,
            leg_reference_deg: 150.0,
            leg_full_scale_deg: 70.0,
            frame_threshold: 0.7,
            debounce_frames: 5,
            instant_label: "fall".to_string(),
            instant_threshold: 0.7,
        }
    }
}

impl FallConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trunk and leg weights.
    #[must_use]
    pub fn with_weights(mut self, trunk: f64, leg: f64) -> Self {
        self.trunk_weight = trunk;
        self.leg_weight = leg;
        self
    }

    /// Set the trunk angle at which the trunk signal saturates.
    #[must_use]
    pub fn with_trunk_full_scale(mut self, degrees: f64) -> Self {
        self.trunk_full_scale_deg = degrees;
        self
    }

    /// Set the standing knee angle and the deviation at which the leg signal saturates.
    #[must_use]
    pub fn with_leg_reference(mut self, reference_deg: f64, full_scale_deg: f64) -> Self {
        self.leg_reference_deg = reference_deg;
        self.leg_full_scale_deg = full_scale_deg;
        self
    }

    /// Set the per-frame score threshold.
    ///
    /// This is the detection sensitivity: lower values flag more frames.
    #[must_use]
    pub fn with_frame_threshold(mut self, threshold: f64) -> Self {
        self.frame_threshold = threshold;
        self
    }

    /// Set the number of consecutive positive frames required to confirm a fall.
    #[must_use]
    pub fn with_debounce_frames(mut self, frames: u32) -> Self {
        self.debounce_frames = frames;
        self
    }

    /// Set the object-classifier label treated as an instant fall.
    #[must_use]
    pub fn with_instant_label(mut self, label: impl Into<String>) -> Self {
        self.instant_label = label.into();
        self
    }

    /// Set the object-classifier confidence threshold for instant falls.
    #[must_use]
    pub fn with_instant_threshold(mut self, threshold: f64) -> Self {
        self.instant_threshold = threshold;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        non_negative("fall.trunk_weight", self.trunk_weight)?;
        non_negative("fall.leg_weight", self.leg_weight)?;
        positive("fall.trunk_full_scale_deg", self.trunk_full_scale_deg)?;
        positive("fall.leg_full_scale_deg", self.leg_full_scale_deg)?;
        if !(0.0..=180.0).contains(&self.leg_reference_deg) {
            return Err(EngineError::config(format!(
                "fall.leg_reference_deg must be within [0, 180], got {}",
                self.leg_reference_deg
            )));
        }
        unit_interval("fall.frame_threshold", self.frame_threshold)?;
        unit_interval("fall.instant_threshold", self.instant_threshold)?;
        if self.debounce_frames == 0 {
            return Err(EngineError::config("fall.debounce_frames must be at least 1"));
        }
        if self.instant_label.trim().is_empty() {
            return Err(EngineError::config("fall.instant_label must not be empty"));
        }
        Ok(())
    }
}

/// Configuration for the emotion classifier.
///
/// Confidence is `clamp(base + keyword_step * tally + sentiment_weight * |sentiment|,
/// base, max_confidence)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmotionConfig {
    /// Confidence floor for any non-empty text.
    pub base_confidence: f64,
    /// Confidence added per matched keyword of the winning emotion.
    pub keyword_step: f64,
    /// Confidence added per unit of absolute sentiment.
    pub sentiment_weight: f64,
    /// Confidence ceiling.
    pub max_confidence: f64,
    /// Sentiment magnitude above which the fallback picks happy or sad.
    pub sentiment_threshold: f64,
    /// Keyword lists per emotion.
    pub lexicon: EmotionLexicon,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            base_confidence: 0.5,
            keyword_step: 0.1,
            sentiment_weight: 0.3,
            max_confidence: 0.98,
            sentiment_threshold: 0.3,
            lexicon: EmotionLexicon::default(),
        }
    }
}

impl EmotionConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence floor and ceiling.
    #[must_use]
    pub fn with_confidence_bounds(mut self, base: f64, max: f64) -> Self {
        self.base_confidence = base;
        self.max_confidence = max;
        self
    }

    /// Set the per-keyword and per-sentiment confidence increments.
    #[must_use]
    pub fn with_increments(mut self, keyword_step: f64, sentiment_weight: f64) -> Self {
        self.keyword_step = keyword_step;
        self.sentiment_weight = sentiment_weight;
        self
    }

    /// Set the sentiment fallback threshold.
    #[must_use]
    pub fn with_sentiment_threshold(mut self, threshold: f64) -> Self {
        self.sentiment_threshold = threshold;
        self
    }

    /// Replace the keyword lexicon.
    #[must_use]
    pub fn with_lexicon(mut self, lexicon: EmotionLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        unit_interval("emotion.base_confidence", self.base_confidence)?;
        unit_interval("emotion.max_confidence", self.max_confidence)?;
        if self.base_confidence > self.max_confidence {
            return Err(EngineError::config(format!(
                "emotion.base_confidence ({}) exceeds emotion.max_confidence ({})",
                self.base_confidence, self.max_confidence
            )));
        }
        non_negative("emotion.keyword_step", self.keyword_step)?;
        non_negative("emotion.sentiment_weight", self.sentiment_weight)?;
        unit_interval("emotion.sentiment_threshold", self.sentiment_threshold)?;
        self.lexicon.validate()
    }
}

/// Full engine configuration.
///
/// # Example
///
/// ```rust
/// use fallwatch::{EngineConfig, FallConfig};
///
/// let config = EngineConfig::new().with_fall(FallConfig::new().with_debounce_frames(3));
/// let yaml = config.to_yaml_string().unwrap();
/// assert_eq!(EngineConfig::from_yaml_str(&yaml).unwrap(), config);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Fall pipeline settings.
    pub fall: FallConfig,
    /// Emotion classifier settings.
    pub emotion: EmotionConfig,
}

impl EngineConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fall settings.
    #[must_use]
    pub fn with_fall(mut self, fall: FallConfig) -> Self {
        self.fall = fall;
        self
    }

    /// Replace the emotion settings.
    #[must_use]
    pub fn with_emotion(mut self, emotion: EmotionConfig) -> Self {
        self.emotion = emotion;
        self
    }

    /// Check both halves of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.fall.validate()?;
        self.emotion.validate()
    }

    /// Parse and validate a YAML configuration. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, has unknown keys, or fails validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load and validate a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Write the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::config(format!("{name} must be a finite value >= 0, got {value}")))
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::config(format!("{name} must be a finite value > 0, got {value}")))
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::config(format!("{name} must be within [0, 1], got {value}")))
    }
}
