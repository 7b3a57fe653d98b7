// Background encode worker

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, info_span};
use uuid::Uuid;

use super::{EncodeCommand, EncodeError, EncodeReport, Executor, SystemExecutor, run_encode};

/// Message from a worker thread back to the caller
#[derive(Debug)]
pub enum WorkerMessage {
    /// Encoder process is about to be spawned
    JobStarted { job_id: Uuid, command: String },

    /// Encode finished and both files were measured
    JobCompleted { job_id: Uuid, report: EncodeReport },

    /// Encode failed; nothing is retried
    JobFailed { job_id: Uuid, error: EncodeError },
}

/// Runs encodes on background threads so the caller never blocks on ffmpeg.
///
/// Every spawn gets its own thread and channel. Overlapping spawns share no
/// state beyond the executor, but writing the same output path from two of
/// them is the caller's problem.
#[derive(Clone)]
pub struct EncodeWorker {
    executor: Arc<dyn Executor>,
}

impl Default for EncodeWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeWorker {
    /// Worker backed by the real ffmpeg process
    pub fn new() -> Self {
        Self::with_executor(SystemExecutor::new())
    }

    pub fn with_executor(executor: impl Executor + 'static) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// Start encoding in the background. There is no way to cancel it.
    pub fn spawn(&self, command: EncodeCommand) -> EncodeHandle {
        let (tx, rx) = mpsc::channel();
        let job_id = Uuid::new_v4();
        let running = Arc::new(AtomicBool::new(true));

        let executor = self.executor.clone();
        let running_flag = running.clone();

        thread::spawn(move || {
            let _span = info_span!("encode", %job_id).entered();

            let _ = tx.send(WorkerMessage::JobStarted {
                job_id,
                command: command.to_string(),
            });

            let message = match run_encode(executor.as_ref(), &command) {
                Ok(report) => WorkerMessage::JobCompleted { job_id, report },
                Err(error) => WorkerMessage::JobFailed { job_id, error },
            };

            // Flag drops before the result lands so a caller that sees the
            // result never observes "still running"
            running_flag.store(false, Ordering::SeqCst);
            if tx.send(message).is_err() {
                debug!("encode handle dropped before the result arrived");
            }
        });

        EncodeHandle {
            job_id,
            running,
            rx,
            started_command: None,
        }
    }
}

/// Caller's side of one background encode
pub struct EncodeHandle {
    job_id: Uuid,
    running: Arc<AtomicBool>,
    rx: Receiver<WorkerMessage>,
    started_command: Option<String>,
}

impl EncodeHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// True until the worker has finished, for "Processing..." indicators
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Command line reported by the worker once it started, if seen yet
    pub fn started_command(&self) -> Option<&str> {
        self.started_command.as_deref()
    }

    /// Non-blocking poll for the result
    pub fn try_result(&mut self) -> Option<Result<EncodeReport, EncodeError>> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => {
                    if let Some(result) = self.handle_message(message) {
                        return Some(result);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(Err(self.worker_vanished())),
            }
        }
    }

    /// Block until the encode finishes
    pub fn wait(mut self) -> Result<EncodeReport, EncodeError> {
        loop {
            match self.rx.recv() {
                Ok(message) => {
                    if let Some(result) = self.handle_message(message) {
                        return result;
                    }
                }
                Err(_) => return Err(self.worker_vanished()),
            }
        }
    }

    fn handle_message(
        &mut self,
        message: WorkerMessage,
    ) -> Option<Result<EncodeReport, EncodeError>> {
        match message {
            WorkerMessage::JobStarted { command, .. } => {
                self.started_command = Some(command);
                None
            }
            WorkerMessage::JobCompleted { report, .. } => Some(Ok(report)),
            WorkerMessage::JobFailed { error, .. } => Some(Err(error)),
        }
    }

    /// The worker thread died (panicked) without reporting
    fn worker_vanished(&self) -> EncodeError {
        self.running.store(false, Ordering::SeqCst);
        EncodeError::ExternalToolFailure {
            command: self.started_command.clone().unwrap_or_default(),
            exit_code: None,
            stderr: "encode worker exited without reporting a result".to_string(),
        }
    }
}
