// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Emotion classification from text.
//!
//! Two signals are combined: a keyword tally per emotion and a continuous sentiment score
//! supplied by an external analyzer. Keywords take precedence; sentiment only decides
//! when no keyword matched, and always contributes to the confidence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EmotionConfig;
use crate::error::{EngineError, Result};

/// Emotion labels produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fearful,
    Neutral,
    /// Produced only for empty text.
    Unknown,
}

impl EmotionLabel {
    /// Labels that keywords can select, in tie-break order.
    ///
    /// When two emotions have the same keyword tally, the one listed first wins.
    pub const CLASSIFIED: [Self; 6] = [
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Surprised,
        Self::Fearful,
        Self::Neutral,
    ];

    /// Lowercase English name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::Fearful => "fearful",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }

    /// Chinese display name used by the mobile application.
    pub const fn display_name_zh(&self) -> &'static str {
        match self {
            Self::Happy => "高兴",
            Self::Sad => "悲伤",
            Self::Angry => "愤怒",
            Self::Surprised => "惊讶",
            Self::Fearful => "恐惧",
            Self::Neutral => "中性",
            Self::Unknown => "未知",
        }
    }

    fn index(self) -> Option<usize> {
        Self::CLASSIFIED.iter().position(|&label| label == self)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = EmotionParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" | "高兴" | "开心" => Ok(Self::Happy),
            "sad" | "悲伤" => Ok(Self::Sad),
            "angry" | "愤怒" => Ok(Self::Angry),
            "surprised" | "surprise" | "惊讶" => Ok(Self::Surprised),
            "fearful" | "fear" | "恐惧" => Ok(Self::Fearful),
            "neutral" | "中性" => Ok(Self::Neutral),
            "unknown" | "未知" => Ok(Self::Unknown),
            _ => Err(EmotionParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid emotion label.
#[derive(Debug, Clone)]
pub struct EmotionParseError(String);

impl fmt::Display for EmotionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid emotion '{}', expected one of: happy, sad, angry, surprised, fearful, neutral, unknown",
            self.0
        )
    }
}

impl std::error::Error for EmotionParseError {}

/// Keyword lists per emotion.
///
/// Defaults are the Chinese keyword lists of the mobile application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmotionLexicon {
    pub happy: Vec<String>,
    pub sad: Vec<String>,
    pub angry: Vec<String>,
    pub surprised: Vec<String>,
    pub fearful: Vec<String>,
    pub neutral: Vec<String>,
}

impl Default for EmotionLexicon {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| (*w).to_string()).collect()
        }

        Self {
            happy: words(&[
                "开心", "快乐", "喜悦", "满意", "幸福", "兴奋", "愉快", "欣喜", "好", "棒", "喜欢",
                "爱", "笑",
            ]),
            sad: words(&[
                "伤心", "难过", "失望", "沮丧", "消沉", "痛苦", "哀伤", "遗憾", "哭", "泪", "苦闷",
            ]),
            angry: words(&["生气", "恼怒", "气愤", "暴躁", "恨", "烦", "怒", "不满", "厌恶"]),
            surprised: words(&["惊讶", "震惊", "意外", "吃惊", "不可思议", "惊异", "惊喜"]),
            fearful: words(&["害怕", "恐慌", "焦虑", "担心", "紧张", "惊恐", "怕", "惧"]),
            neutral: words(&["普通", "一般", "还行", "可以", "正常", "平静", "平淡"]),
        }
    }
}

impl EmotionLexicon {
    /// Keywords for a label; empty for [`EmotionLabel::Unknown`].
    pub fn keywords(&self, label: EmotionLabel) -> &[String] {
        match label {
            EmotionLabel::Happy => &self.happy,
            EmotionLabel::Sad => &self.sad,
            EmotionLabel::Angry => &self.angry,
            EmotionLabel::Surprised => &self.surprised,
            EmotionLabel::Fearful => &self.fearful,
            EmotionLabel::Neutral => &self.neutral,
            EmotionLabel::Unknown => &[],
        }
    }

    /// Reject blank keywords, which would match every text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] naming the offending emotion.
    pub fn validate(&self) -> Result<()> {
        for label in EmotionLabel::CLASSIFIED {
            if self.keywords(label).iter().any(|w| w.trim().is_empty()) {
                return Err(EngineError::config(format!(
                    "emotion.lexicon.{label} contains an empty keyword"
                )));
            }
        }
        Ok(())
    }
}

/// Source of a sentiment score in `[-1, 1]` for a block of text.
///
/// Implementations must be deterministic and free of side effects.
pub trait SentimentAnalyzer {
    /// Sentiment of `text`; negative is unhappy, positive is happy.
    fn sentiment(&self, text: &str) -> f64;
}

impl<F> SentimentAnalyzer for F
where
    F: Fn(&str) -> f64,
{
    fn sentiment(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Raw signals for one text: keyword tallies plus the normalized sentiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionSignal {
    tallies: [u32; 6],
    /// Sentiment clamped to `[-1, 1]`, with NaN read as `0`.
    pub sentiment: f64,
}

impl EmotionSignal {
    /// Keyword tally for a label.
    pub fn tally(&self, label: EmotionLabel) -> u32 {
        label.index().map_or(0, |i| self.tallies[i])
    }

    /// Label with the highest non-zero tally; ties go to the earlier label.
    pub fn top(&self) -> Option<(EmotionLabel, u32)> {
        let mut best: Option<(EmotionLabel, u32)> = None;
        for (label, &count) in EmotionLabel::CLASSIFIED.iter().zip(&self.tallies) {
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((*label, count));
            }
        }
        best
    }
}

/// Result of classifying one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionEvent {
    /// Detected emotion.
    pub label: EmotionLabel,
    /// Confidence in `[0, 0.98]` with the default configuration.
    pub confidence: f64,
}

impl EmotionEvent {
    /// The result for empty text.
    pub const fn unknown() -> Self {
        Self {
            label: EmotionLabel::Unknown,
            confidence: 0.0,
        }
    }
}

/// Keyword and sentiment emotion classifier.
///
/// Stateless across calls; safe to share between threads.
///
/// # Example
///
/// ```rust
/// use fallwatch::{EmotionClassifier, EmotionLabel};
///
/// let classifier = EmotionClassifier::default();
/// let event = classifier.classify("今天很开心", 0.0);
/// assert_eq!(event.label, EmotionLabel::Happy);
/// ```
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    config: EmotionConfig,
    /// Lowercased keywords, indexed like [`EmotionLabel::CLASSIFIED`].
    keywords: [Vec<String>; 6],
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::build(EmotionConfig::default())
    }
}

impl EmotionClassifier {
    /// Create a classifier from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid.
    pub fn new(config: EmotionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EmotionConfig) -> Self {
        let keywords = EmotionLabel::CLASSIFIED.map(|label| {
            config
                .lexicon
                .keywords(label)
                .iter()
                .map(|w| w.to_lowercase())
                .collect()
        });
        Self { config, keywords }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &EmotionConfig {
        &self.config
    }

    /// Compute keyword tallies and normalize the sentiment.
    ///
    /// Each keyword found in the text (case-insensitively) adds one to its emotion.
    pub fn signal(&self, text: &str, sentiment: f64) -> EmotionSignal {
        let lowered = text.to_lowercase();
        let mut tallies = [0u32; 6];
        for (tally, words) in tallies.iter_mut().zip(&self.keywords) {
            let hits = words.iter().filter(|w| lowered.contains(w.as_str())).count();
            *tally = u32::try_from(hits).unwrap_or(u32::MAX);
        }
        EmotionSignal {
            tallies,
            sentiment: normalize_sentiment(sentiment),
        }
    }

    /// Classify `text` given an externally computed sentiment score.
    ///
    /// Empty text yields [`EmotionEvent::unknown`]. Whitespace-only text counts as empty,
    /// so `"  "` is `unknown` with confidence 0, not `neutral`.
    pub fn classify(&self, text: &str, sentiment: f64) -> EmotionEvent {
        if text.trim().is_empty() {
            return EmotionEvent::unknown();
        }

        let signal = self.signal(text, sentiment);
        let (label, tally) = signal
            .top()
            .unwrap_or_else(|| (self.sentiment_fallback(signal.sentiment), 0));

        let cfg = &self.config;
        let raw = cfg.keyword_step.mul_add(
            f64::from(tally),
            cfg.sentiment_weight.mul_add(signal.sentiment.abs(), cfg.base_confidence),
        );
        let confidence = raw.clamp(cfg.base_confidence, cfg.max_confidence);

        tracing::trace!(%label, tally, sentiment = signal.sentiment, confidence, "classified text");
        EmotionEvent { label, confidence }
    }

    /// Classify `text`, asking `analyzer` for the sentiment.
    ///
    /// The analyzer is not called for empty or whitespace-only text, which is `unknown`.
    pub fn classify_with<A>(&self, text: &str, analyzer: &A) -> EmotionEvent
    where
        A: SentimentAnalyzer + ?Sized,
    {
        if text.trim().is_empty() {
            return EmotionEvent::unknown();
        }
        self.classify(text, analyzer.sentiment(text))
    }

    fn sentiment_fallback(&self, sentiment: f64) -> EmotionLabel {
        let threshold = self.config.sentiment_threshold;
        if sentiment > threshold {
            EmotionLabel::Happy
        } else if sentiment < -threshold {
            EmotionLabel::Sad
        } else {
            EmotionLabel::Neutral
        }
    }
}

fn normalize_sentiment(sentiment: f64) -> f64 {
    if sentiment.is_nan() {
        0.0
    } else {
        sentiment.clamp(-1.0, 1.0)
    }
}
