//! Per-camera worker threads feeding a [`TrackingController`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError, bounded};
use tracing::{debug, info, warn};

use crate::config::{CameraConfig, PipelineConfig};
use crate::controller::TrackingController;
use crate::detection::SharedSnapshot;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::steering::PtzBinding;
use crate::tracker::{CorrelationTracker, TemplateTracker};

use super::{FaceRecognizer, FrameSource};

const CAPTURE: &str = "capture";
const RECOGNITION: &str = "recognition";

/// One camera: a capture thread, a recognition thread and the controller the
/// render thread drives through [`render_next`](Self::render_next).
///
/// Capture never waits on either consumer: frames are dropped when the render
/// queue is full, and the recognizer is only handed a frame once it has
/// finished the previous one.
pub struct CameraPipeline<T: CorrelationTracker> {
    controller: TrackingController<T>,
    snapshot: SharedSnapshot,
    frames: Receiver<Frame>,
    stop: Arc<AtomicBool>,
    workers: Vec<Worker>,
    config: PipelineConfig,
}

struct Worker {
    name: &'static str,
    handle: JoinHandle<()>,
    /// Disconnects when the worker's loop exits.
    done: Receiver<()>,
}

impl CameraPipeline<TemplateTracker> {
    /// Build the controller described by `config` and start its workers.
    pub fn from_config<S, R>(
        config: &CameraConfig,
        source: S,
        recognizer: R,
        actuator: Option<PtzBinding>,
    ) -> Result<Self>
    where
        S: FrameSource + Send + 'static,
        R: FaceRecognizer + Send + 'static,
    {
        if let (Some(expected), Some(binding)) = (config.actuator, actuator.as_ref()) {
            if expected != binding.kind() {
                warn!(camera = %config.name, ?expected, actual = ?binding.kind(), "actuator kind differs from config");
            }
        }
        let mut controller = TrackingController::from_config(config);
        controller.set_actuator(actuator);
        Self::spawn(controller, source, recognizer, config.pipeline.clone())
    }
}

impl<T: CorrelationTracker> CameraPipeline<T> {
    /// Start the capture and recognition threads for `controller`'s camera.
    pub fn spawn<S, R>(
        controller: TrackingController<T>,
        source: S,
        recognizer: R,
        config: PipelineConfig,
    ) -> Result<Self>
    where
        S: FrameSource + Send + 'static,
        R: FaceRecognizer + Send + 'static,
    {
        let snapshot = SharedSnapshot::new();
        let stop = Arc::new(AtomicBool::new(false));
        let (render_tx, frames) = bounded(config.render_queue.max(1));
        let (recognize_tx, recognize_rx) = bounded(config.recognition_queue.max(1));
        let camera = controller.name().to_owned();

        let poll = config.poll_interval();
        let mut workers = Vec::with_capacity(2);
        workers.push(Worker::spawn(CAPTURE, &camera, {
            let stop = Arc::clone(&stop);
            let camera = camera.clone();
            move || capture_loop(&camera, source, &stop, &render_tx, &recognize_tx, poll)
        })?);

        let recognition = Worker::spawn(RECOGNITION, &camera, {
            let stop = Arc::clone(&stop);
            let snapshot = snapshot.clone();
            let camera = camera.clone();
            move || recognition_loop(&camera, recognizer, &stop, &recognize_rx, &snapshot, poll)
        });
        match recognition {
            Ok(worker) => workers.push(worker),
            Err(err) => {
                // The capture thread winds down on its own.
                stop.store(true, Ordering::Relaxed);
                return Err(err);
            }
        }

        info!(camera = %camera, "camera pipeline started");
        Ok(Self {
            controller,
            snapshot,
            frames,
            stop,
            workers,
            config,
        })
    }

    /// Run the controller on the next captured frame, if one is waiting.
    /// Never blocks.
    pub fn render_next(&mut self) -> Option<Frame> {
        match self.frames.try_recv() {
            Ok(frame) => Some(self.controller.update_shared(frame, &self.snapshot)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Like [`render_next`](Self::render_next) but waits up to `timeout` for
    /// a frame.
    pub fn render_timeout(&mut self, timeout: Duration) -> Option<Frame> {
        let frame = self.frames.recv_timeout(timeout).ok()?;
        Some(self.controller.update_shared(frame, &self.snapshot))
    }

    /// Whether capture has ended and every queued frame was rendered.
    pub fn is_finished(&self) -> bool {
        self.workers.iter().all(|w| w.handle.is_finished()) && self.frames.is_empty()
    }

    pub fn controller(&self) -> &TrackingController<T> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TrackingController<T> {
        &mut self.controller
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    /// Stop the camera head, then the workers.
    ///
    /// Each worker gets `stop_timeout` to notice the stop flag. One that
    /// doesn't is detached and reported as [`Error::ThreadStopTimeout`].
    pub fn stop(&mut self) -> Result<()> {
        if self.workers.is_empty() {
            return Ok(());
        }
        self.controller.shutdown();
        self.stop.store(true, Ordering::Relaxed);

        let timeout = self.config.stop_timeout();
        let deadline = Instant::now() + timeout;
        let mut result = Ok(());
        for worker in self.workers.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match worker.done.recv_timeout(remaining) {
                Err(RecvTimeoutError::Disconnected) | Ok(()) => {
                    if worker.handle.join().is_err() {
                        warn!(camera = %self.controller.name(), worker = worker.name, "worker panicked");
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(camera = %self.controller.name(), worker = worker.name, ?timeout, "worker did not stop, detaching");
                    if result.is_ok() {
                        result = Err(Error::ThreadStopTimeout {
                            worker: worker.name,
                            timeout,
                        });
                    }
                }
            }
        }
        info!(camera = %self.controller.name(), "camera pipeline stopped");
        result
    }
}

impl<T: CorrelationTracker> Drop for CameraPipeline<T> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(camera = %self.controller.name(), error = %err, "camera pipeline stopped uncleanly");
        }
    }
}

impl Worker {
    fn spawn(name: &'static str, camera: &str, body: impl FnOnce() + Send + 'static) -> Result<Self> {
        let (done_tx, done) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name(format!("{camera}-{name}"))
            .spawn(move || {
                let _done = done_tx;
                body();
            })
            .map_err(Error::Spawn)?;
        Ok(Self { name, handle, done })
    }
}

fn capture_loop<S: FrameSource>(
    camera: &str,
    mut source: S,
    stop: &AtomicBool,
    render: &Sender<Frame>,
    recognize: &Sender<Frame>,
    retry: Duration,
) {
    info!(camera, "capture started");
    let mut sequence = 0u64;
    while !stop.load(Ordering::Relaxed) {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame.with_sequence(sequence),
            Ok(None) => {
                info!(camera, frames = sequence, "end of stream");
                break;
            }
            Err(err) => {
                warn!(camera, error = %err, "frame source error");
                thread::sleep(retry);
                continue;
            }
        };
        sequence += 1;

        if recognize.is_empty() {
            let _ = recognize.try_send(frame.clone());
        }
        match render.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                debug!(camera, sequence = frame.sequence(), "render queue full, frame dropped");
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
    info!(camera, "capture stopped");
}

fn recognition_loop<R: FaceRecognizer>(
    camera: &str,
    mut recognizer: R,
    stop: &AtomicBool,
    frames: &Receiver<Frame>,
    snapshot: &SharedSnapshot,
    poll: Duration,
) {
    info!(camera, "recognition started");
    while !stop.load(Ordering::Relaxed) {
        let frame = match frames.recv_timeout(poll) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match recognizer.recognize(&frame) {
            Ok(result) => {
                let generation = snapshot.publish(result);
                debug!(camera, sequence = frame.sequence(), generation, "snapshot published");
            }
            Err(err) => warn!(camera, error = %err, "face recognition failed"),
        }
    }
    info!(camera, "recognition stopped");
}
