// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Single-consumer frame worker.
//!
//! This module provides [`FrameWorker`], which owns an [`Engine`] on a dedicated thread and
//! feeds it commands in the order they were submitted. Every confirmed fall is handed to
//! a callback, so the capture side never blocks on the decision logic.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::engine::{Engine, FallEvent, ObjectSignal};
use crate::error::{EngineError, Result};
use crate::pose::Pose;

/// A command for the worker thread.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    /// Observe one frame.
    Frame {
        /// Pose for the frame.
        pose: Pose,
        /// Object-classifier output for the same frame, if any.
        object: Option<ObjectSignal>,
    },
    /// Dismiss the active fall event.
    Cancel,
    /// Start a new detection session.
    Reset,
}

/// Runs an [`Engine`] on its own thread.
///
/// # Example
///
/// ```rust
/// use std::sync::mpsc;
/// use fallwatch::{Engine, ObjectSignal, Pose, worker::FrameWorker};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (tx, rx) = mpsc::channel();
/// let worker = FrameWorker::spawn(Engine::default(), move |event| {
///     let _ = tx.send(event);
/// })?;
///
/// worker.submit(Pose::default(), Some(ObjectSignal::new("fall", 0.9)));
/// let engine = worker.shutdown()?;
///
/// assert_eq!(rx.try_iter().count(), 1);
/// assert_eq!(engine.frames_observed(), 1);
/// # Ok(())
/// # }
/// ```
pub struct FrameWorker {
    sender: Option<Sender<WorkerCommand>>,
    handle: Option<JoinHandle<Engine>>,
}

impl FrameWorker {
    /// Spawn the worker thread.
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine to drive; returned by [`FrameWorker::shutdown`].
    /// * `on_event` - Called on the worker thread for every confirmed fall.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the thread cannot be spawned.
    pub fn spawn<F>(mut engine: Engine, mut on_event: F) -> Result<Self>
    where
        F: FnMut(FallEvent) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<WorkerCommand>();
        let handle = thread::Builder::new()
            .name("fallwatch-frames".to_string())
            .spawn(move || {
                for command in receiver {
                    match command {
                        WorkerCommand::Frame { pose, object } => {
                            if let Some(event) = engine.observe_frame(&pose, object.as_ref()) {
                                on_event(event);
                            }
                        }
                        WorkerCommand::Cancel => engine.cancel_active_event(),
                        WorkerCommand::Reset => engine.reset_session(),
                    }
                }
                tracing::debug!(frames = engine.frames_observed(), "frame worker stopped");
                engine
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue a command. Returns `false` if the worker has stopped.
    pub fn send(&self, command: WorkerCommand) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.send(command).is_ok())
    }

    /// Queue a frame. Returns `false` if the worker has stopped.
    pub fn submit(&self, pose: Pose, object: Option<ObjectSignal>) -> bool {
        self.send(WorkerCommand::Frame { pose, object })
    }

    /// Queue a cancel of the active event.
    pub fn cancel_active_event(&self) -> bool {
        self.send(WorkerCommand::Cancel)
    }

    /// Queue a session reset.
    pub fn reset_session(&self) -> bool {
        self.send(WorkerCommand::Reset)
    }

    /// Process every queued command, stop the thread and return the engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Worker`] if the worker thread panicked.
    pub fn shutdown(mut self) -> Result<Engine> {
        self.sender.take();
        let handle = self
            .handle
            .take()
            .ok_or_else(|| EngineError::Worker("worker already stopped".to_string()))?;
        handle
            .join()
            .map_err(|_| EngineError::Worker("frame worker panicked".to_string()))
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
