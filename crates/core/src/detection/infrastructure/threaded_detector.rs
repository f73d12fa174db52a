use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::detection::domain::async_detector::{AsyncDetector, DetectionOutcome, Generation};
use crate::detection::domain::expression_detector::{DetectorError, ExpressionDetector};
use crate::shared::frame::Frame;

const LOADING: u8 = 0;
const READY: u8 = 1;
const FAILED: u8 = 2;
/// Models loaded, but the worker has since died.
const STOPPED: u8 = 3;

struct Job {
    generation: Generation,
    frame: Frame,
}

/// Runs an [`ExpressionDetector`] on a dedicated thread.
///
/// Layout: `frame thread → job channel → worker → outcome channel → frame thread`
///
/// Both channels hold one item, which is all the gate ever has outstanding.
/// Models are loaded on the worker before it accepts jobs; until then
/// `models_loaded` reports false and the gate skips detection. If the
/// worker dies mid-job, the outstanding generation completes with
/// [`DetectorError::WorkerGone`] and later starts are refused.
pub struct ThreadedDetector {
    job_tx: Option<Sender<Job>>,
    outcome_rx: Receiver<DetectionOutcome>,
    outstanding: Option<(Generation, usize)>,
    status: Arc<AtomicU8>,
    load_error: Arc<Mutex<Option<String>>>,
    model_dir: PathBuf,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedDetector {
    pub fn spawn(detector: Box<dyn ExpressionDetector>, model_dir: PathBuf) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(1);
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded::<DetectionOutcome>(1);
        let status = Arc::new(AtomicU8::new(LOADING));
        let load_error = Arc::new(Mutex::new(None));

        let handle = spawn_worker(
            detector,
            model_dir.clone(),
            job_rx,
            outcome_tx,
            status.clone(),
            load_error.clone(),
        );

        Self {
            job_tx: Some(job_tx),
            outcome_rx,
            outstanding: None,
            status,
            load_error,
            model_dir,
            handle: Some(handle),
        }
    }

    /// Blocks until the worker has finished loading models or `timeout`
    /// passes. Frames pumped before this returns would be skipped anyway.
    pub fn wait_until_loaded(&self, timeout: Duration) -> Result<(), DetectorError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.status.load(Ordering::Acquire) {
                READY => return Ok(()),
                STOPPED => return Err(DetectorError::WorkerGone),
                FAILED => {
                    return Err(DetectorError::Load {
                        path: self.model_dir.clone(),
                        reason: self.load_error().unwrap_or_default(),
                    })
                }
                _ if Instant::now() >= deadline => return Err(DetectorError::NotLoaded),
                _ => thread::sleep(Duration::from_millis(5)),
            }
        }
    }

    /// Why model loading failed, once it has.
    pub fn load_error(&self) -> Option<String> {
        self.load_error.lock().ok().and_then(|slot| slot.clone())
    }
}

fn spawn_worker(
    mut detector: Box<dyn ExpressionDetector>,
    model_dir: PathBuf,
    job_rx: Receiver<Job>,
    outcome_tx: Sender<DetectionOutcome>,
    status: Arc<AtomicU8>,
    load_error: Arc<Mutex<Option<String>>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let load_started = Instant::now();
        if let Err(e) = detector.load(&model_dir) {
            log::error!("Model loading failed: {e}");
            status.store(FAILED, Ordering::Release);
            if let Ok(mut slot) = load_error.lock() {
                *slot = Some(e.to_string());
            }
            return;
        }
        log::info!(
            "Models loaded from {} in {:.0}ms",
            model_dir.display(),
            load_started.elapsed().as_secs_f64() * 1000.0
        );
        status.store(READY, Ordering::Release);

        for Job { generation, frame } in job_rx {
            let started = Instant::now();
            let result = detector.detect(&frame);
            let outcome = DetectionOutcome {
                generation,
                frame_index: frame.index(),
                result,
                latency: started.elapsed(),
            };
            if outcome_tx.send(outcome).is_err() {
                break;
            }
        }
    })
}

impl AsyncDetector for ThreadedDetector {
    fn models_loaded(&self) -> bool {
        matches!(self.status.load(Ordering::Acquire), READY | STOPPED)
    }

    fn start(&mut self, generation: Generation, frame: Frame) -> Result<(), DetectorError> {
        match self.status.load(Ordering::Acquire) {
            READY => {}
            FAILED | STOPPED => return Err(DetectorError::WorkerGone),
            _ => return Err(DetectorError::NotLoaded),
        }
        let tx = self.job_tx.as_ref().ok_or(DetectorError::WorkerGone)?;
        let frame_index = frame.index();
        tx.try_send(Job { generation, frame }).map_err(|e| match e {
            TrySendError::Full(_) => DetectorError::Busy,
            TrySendError::Disconnected(_) => DetectorError::WorkerGone,
        })?;
        self.outstanding = Some((generation, frame_index));
        Ok(())
    }

    fn poll(&mut self) -> Option<DetectionOutcome> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => {
                self.outstanding = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self
                    .status
                    .compare_exchange(READY, STOPPED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    log::error!("Detector thread stopped");
                }
                let (generation, frame_index) = self.outstanding.take()?;
                Some(DetectionOutcome {
                    generation,
                    frame_index,
                    result: Err(DetectorError::WorkerGone),
                    latency: Duration::ZERO,
                })
            }
        }
    }
}

impl Drop for ThreadedDetector {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.job_tx.take();
        // Unblock a worker stuck sending an outcome nobody will read.
        while self.outcome_rx.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Detector thread panicked");
            }
        }
    }
}
