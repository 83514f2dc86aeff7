// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! `frames` and `text` command implementations.
//!
//! The `frames` command reads one JSON object per line:
//!
//! ```json
//! {"keypoints": [[0.5, 0.1, 0.9], ...], "object": {"label": "fall", "confidence": 0.8}}
//! {"pose": {"neck": {"x": 0.5, "y": 0.2, "confidence": 0.9}, "left_hip": ...}}
//! {"cancel": true}
//! ```
//!
//! `keypoints` is a COCO-pose `(17, 2|3)` array in normalized coordinates; `pose` names
//! landmarks directly. A line with neither is a frame with nobody in view. Lines that are
//! only `cancel` or `reset` commands do not count as frames. Blank lines and lines starting
//! with `#` are ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::cli::args::{FramesArgs, TextArgs};
use crate::config::EngineConfig;
use crate::engine::{Engine, ObjectSignal};
use crate::error::{EngineError, Result};
use crate::pose::Pose;
use crate::{info, section, success, verbose, warn};

/// One line of a frame stream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameRecord {
    /// Named landmarks.
    pub pose: Option<Pose>,
    /// COCO-pose keypoint rows `[x, y]` or `[x, y, confidence]`.
    pub keypoints: Option<Vec<Vec<f32>>>,
    /// Object-classifier output for the frame.
    pub object: Option<ObjectSignal>,
    /// Dismiss the active fall event before this line's frame, if any.
    pub cancel: bool,
    /// Start a new session before this line's frame, if any.
    pub reset: bool,
}

impl FrameRecord {
    /// Whether this line carries a frame to observe.
    pub fn has_frame(&self) -> bool {
        self.pose.is_some()
            || self.keypoints.is_some()
            || self.object.is_some()
            || !(self.cancel || self.reset)
    }

    /// Resolve the pose for this line.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidKeypoints`] if both `pose` and `keypoints` are given
    /// or the keypoint rows do not form a `(17, 2|3)` array.
    pub fn to_pose(&self) -> Result<Pose> {
        match (&self.pose, &self.keypoints) {
            (Some(_), Some(_)) => Err(EngineError::InvalidKeypoints(
                "a frame may carry either `pose` or `keypoints`, not both".to_string(),
            )),
            (Some(pose), None) => Ok(pose.clone()),
            (None, Some(rows)) => {
                let cols = rows.first().map_or(0, Vec::len);
                if rows.iter().any(|row| row.len() != cols) {
                    return Err(EngineError::InvalidKeypoints(
                        "keypoint rows have different lengths".to_string(),
                    ));
                }
                let flat: Vec<f32> = rows.iter().flatten().copied().collect();
                let array = Array2::from_shape_vec((rows.len(), cols), flat)
                    .map_err(|e| EngineError::InvalidKeypoints(e.to_string()))?;
                Pose::from_coco17(array.view())
            }
            (None, None) => Ok(Pose::default()),
        }
    }
}

/// Counters for a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Frames fed to the engine.
    pub frames: u64,
    /// Fall events written.
    pub events: u64,
    /// Cancel and reset commands applied.
    pub commands: u64,
    /// Lines that could not be parsed.
    pub skipped: u64,
}

/// Feed a JSON Lines frame stream through `engine`, writing each fall event as a JSON line.
///
/// Malformed lines are reported and skipped.
///
/// # Errors
///
/// Returns an error if reading the input or writing an event fails.
pub fn replay<R, W>(engine: &mut Engine, reader: R, mut writer: W) -> Result<ReplaySummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = ReplaySummary::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record: FrameRecord = match serde_json::from_str(trimmed) {
            Ok(record) => record,
            Err(e) => {
                warn!("line {}: {e}", line_no + 1);
                summary.skipped += 1;
                continue;
            }
        };

        if record.reset {
            engine.reset_session();
            summary.commands += 1;
            verbose!("line {}: session reset", line_no + 1);
        }
        if record.cancel {
            engine.cancel_active_event();
            summary.commands += 1;
            verbose!("line {}: active event cancelled", line_no + 1);
        }
        if !record.has_frame() {
            continue;
        }

        let pose = match record.to_pose() {
            Ok(pose) => pose,
            Err(e) => {
                warn!("line {}: {e}", line_no + 1);
                summary.skipped += 1;
                continue;
            }
        };

        summary.frames += 1;
        if let Some(event) = engine.observe_frame(&pose, record.object.as_ref()) {
            serde_json::to_writer(&mut writer, &event)?;
            writeln!(writer)?;
            summary.events += 1;
            verbose!(
                "line {}: fall confirmed ({:?}, confidence {:.2})",
                line_no + 1,
                event.triggered_by,
                event.confidence
            );
        }
    }

    writer.flush()?;
    Ok(summary)
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            verbose!("Loading config from {path}");
            EngineConfig::load(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Run the `frames` command.
///
/// # Errors
///
/// Returns an error if the config or input cannot be loaded, or an override is invalid.
pub fn run_frames(args: &FramesArgs) -> Result<ReplaySummary> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(frames) = args.debounce {
        config.fall = config.fall.with_debounce_frames(frames);
    }
    if let Some(threshold) = args.threshold {
        config.fall = config.fall.with_frame_threshold(threshold);
    }
    let mut engine = Engine::new(config)?;

    section!("Replaying frames from {}", args.input);
    verbose!(
        "debounce {} frames, frame threshold {:.2}",
        engine.config().fall.debounce_frames,
        engine.config().fall.frame_threshold
    );

    let stdout = io::stdout();
    let summary = if args.input == "-" {
        replay(&mut engine, io::stdin().lock(), stdout.lock())?
    } else {
        let file = File::open(&args.input).map_err(|e| {
            EngineError::Io(io::Error::new(e.kind(), format!("{}: {e}", args.input)))
        })?;
        replay(&mut engine, BufReader::new(file), stdout.lock())?
    };

    success!(
        "{} frames, {} fall events, {} commands",
        summary.frames,
        summary.events,
        summary.commands
    );
    if summary.skipped > 0 {
        warn!("{} lines skipped", summary.skipped);
    }
    Ok(summary)
}

/// Run the `text` command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the event cannot be written.
pub fn run_text(args: &TextArgs) -> Result<()> {
    let engine = Engine::new(load_config(args.config.as_deref())?)?;
    let event = engine.classify_text(&args.text, args.sentiment);

    let classifier = engine.emotion_classifier();
    let signal = classifier.signal(&args.text, args.sentiment);
    verbose!(
        "keyword tallies: {}",
        crate::emotion::EmotionLabel::CLASSIFIED
            .iter()
            .map(|label| format!("{label}={}", signal.tally(*label)))
            .collect::<Vec<_>>()
            .join(" ")
    );

    println!("{}", serde_json::to_string(&event)?);
    info!("{} ({:.2})", event.label.display_name_zh(), event.confidence);
    Ok(())
}
