// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Engine facade.
//!
//! [`Engine`] runs the fall pipeline (geometry, single-frame scoring, debouncing) for each
//! frame and owns the only mutable state in the crate, the [`Debouncer`]. It also exposes
//! the stateless emotion classifier.
//!
//! Frames must be fed in arrival order from a single stream; `observe_frame` takes
//! `&mut self`, so sharing an engine across threads requires external serialization
//! (see [`crate::worker::FrameWorker`]). `classify_text` only needs `&self`.

use serde::{Deserialize, Serialize};

use crate::classifier::{self, FrameAssessment};
use crate::config::{EngineConfig, FallConfig};
use crate::debounce::{Confirmation, DebounceState, Debouncer, Trigger};
use crate::emotion::{EmotionClassifier, EmotionEvent, SentimentAnalyzer};
use crate::error::Result;
use crate::pose::Pose;

/// Output of the object-classifier collaborator for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSignal {
    /// Best label of the detection.
    pub label: String,
    /// Confidence of that label, in `[0, 1]`.
    pub confidence: f64,
}

impl ObjectSignal {
    /// Create an object signal.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Whether this detection is strong enough to confirm a fall on its own.
    pub fn is_instant_fall(&self, config: &FallConfig) -> bool {
        self.label == config.instant_label && self.confidence > config.instant_threshold
    }
}

/// A confirmed fall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallEvent {
    /// Confidence in `[0, 1]`: the confirming frame's score, or the object classifier's
    /// confidence for instant events.
    pub confidence: f64,
    /// Which signal confirmed the fall.
    pub triggered_by: Trigger,
    /// Zero-based index of the confirming frame within the session.
    pub frame_index: u64,
}

/// Fall and emotion event detection engine.
///
/// # Example
///
/// ```rust
/// use fallwatch::{Engine, ObjectSignal, Pose, Trigger};
///
/// let mut engine = Engine::default();
/// let object = ObjectSignal::new("fall", 0.9);
/// let event = engine.observe_frame(&Pose::default(), Some(&object)).unwrap();
/// assert_eq!(event.triggered_by, Trigger::ObjectInstant);
///
/// // Edge-triggered: the active event is not reported again.
/// assert!(engine.observe_frame(&Pose::default(), Some(&object)).is_none());
/// engine.cancel_active_event();
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    debouncer: Debouncer,
    emotion: EmotionClassifier,
    frames_observed: u64,
    last_frame: Option<FrameAssessment>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), EmotionClassifier::default())
    }
}

impl Engine {
    /// Create an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Config`] if the configuration is invalid.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let emotion = EmotionClassifier::new(config.emotion.clone())?;
        Ok(Self::build(config, emotion))
    }

    fn build(config: EngineConfig, emotion: EmotionClassifier) -> Self {
        Self {
            debouncer: Debouncer::new(config.fall.debounce_frames),
            config,
            emotion,
            frames_observed: 0,
            last_frame: None,
        }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one frame.
    ///
    /// The object signal is checked first and confirms immediately when its label matches
    /// and its confidence is above the instant threshold; the pose then goes through
    /// geometry, scoring and debouncing. Returns an event only on the transition into the
    /// confirmed state.
    pub fn observe_frame(
        &mut self,
        pose: &Pose,
        object: Option<&ObjectSignal>,
    ) -> Option<FallEvent> {
        let frame_index = self.frames_observed;
        self.frames_observed += 1;

        let instant = object
            .filter(|signal| signal.is_instant_fall(&self.config.fall))
            .and_then(|signal| self.debouncer.instant(signal.confidence));

        let assessment = classifier::assess(pose, &self.config.fall);
        tracing::trace!(
            frame_index,
            score = assessment.score,
            trunk = ?assessment.geometry.trunk_angle,
            leg = ?assessment.geometry.leg_angle,
            "frame assessed"
        );
        self.last_frame = Some(assessment);
        let debounced = self
            .debouncer
            .observe(assessment.exceeds_threshold, assessment.score);

        instant.or(debounced).map(|confirmation| {
            let Confirmation { confidence, trigger } = confirmation;
            tracing::debug!(frame_index, confidence, ?trigger, "fall event");
            FallEvent {
                confidence,
                triggered_by: trigger,
                frame_index,
            }
        })
    }

    /// Classify a block of text given its sentiment score.
    pub fn classify_text(&self, text: &str, sentiment: f64) -> EmotionEvent {
        self.emotion.classify(text, sentiment)
    }

    /// Classify a block of text, asking `analyzer` for the sentiment score.
    pub fn classify_text_with<A>(&self, text: &str, analyzer: &A) -> EmotionEvent
    where
        A: SentimentAnalyzer + ?Sized,
    {
        self.emotion.classify_with(text, analyzer)
    }

    /// The emotion classifier, for sharing across threads.
    pub const fn emotion_classifier(&self) -> &EmotionClassifier {
        &self.emotion
    }

    /// Dismiss the active fall event; a new event needs a full debounce run.
    pub fn cancel_active_event(&mut self) {
        self.debouncer.reset();
    }

    /// Start a new detection session: clears the debouncer and frame numbering.
    pub fn reset_session(&mut self) {
        self.debouncer.reset();
        self.frames_observed = 0;
        self.last_frame = None;
    }

    /// Current debouncer state.
    pub const fn fall_state(&self) -> DebounceState {
        self.debouncer.state()
    }

    /// Assessment of the most recent frame in this session.
    pub const fn last_frame(&self) -> Option<FrameAssessment> {
        self.last_frame
    }

    /// Frames observed since the session started.
    pub const fn frames_observed(&self) -> u64 {
        self.frames_observed
    }
}
