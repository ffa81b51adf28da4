use std::collections::{HashMap, HashSet};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use xpath_core::{JobId, JobRequest, StreamFailure};

use crate::stream::{ChannelProgressSink, ProgressSink, StreamConsumer, StreamSubscription};
use crate::{ClientSettings, EngineError, EngineEvent, JobHandle, JobLauncher, ReqwestLauncher};

enum EngineCommand {
    Submit { job_id: JobId, request: JobRequest },
    OpenStream { job_id: JobId },
    CloseStream { job_id: JobId },
}

impl EngineCommand {
    fn describe(&self) -> String {
        match self {
            EngineCommand::Submit { job_id, .. } => format!("submit of job {job_id}"),
            EngineCommand::OpenStream { job_id } => format!("open stream of job {job_id}"),
            EngineCommand::CloseStream { job_id } => format!("close stream of job {job_id}"),
        }
    }
}

/// Submits the worker has launched but not yet turned into subscriptions.
#[derive(Default)]
struct PendingJobs {
    in_flight: HashSet<JobId>,
    /// Closed while their submit was still running.
    cancelled: HashSet<JobId>,
    accepted: HashMap<JobId, JobHandle>,
}

type SharedPending = Arc<Mutex<PendingJobs>>;

/// Background worker executing submits and subscriptions.
///
/// Events from every job arrive on one channel in the order they happened.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = settings.build_client()?;
        let launcher = Arc::new(ReqwestLauncher::with_client(client.clone(), &settings)?);
        let consumer = StreamConsumer::with_client(client, &settings)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("xpath-engine")
            .enable_all()
            .build()?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut worker = Worker {
                launcher,
                consumer,
                pending: Arc::new(Mutex::new(PendingJobs::default())),
                subscriptions: HashMap::new(),
                sink: Arc::new(ChannelProgressSink::new(event_tx.clone())),
                event_tx,
            };
            while let Ok(command) = cmd_rx.recv() {
                let _guard = runtime.enter();
                worker.handle(command);
            }
            worker.shutdown();
            engine_info!("Engine worker stopped");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, job_id: JobId, request: JobRequest) {
        self.send(EngineCommand::Submit { job_id, request });
    }

    pub fn open_stream(&self, job_id: JobId) {
        self.send(EngineCommand::OpenStream { job_id });
    }

    /// Cancels the job's subscription if one is running. A job whose submit
    /// is still in flight is released as soon as the server answers.
    pub fn close_stream(&self, job_id: JobId) {
        self.send(EngineCommand::CloseStream { job_id });
    }

    /// Returns false when the worker has stopped and the command was dropped.
    fn send(&self, command: EngineCommand) -> bool {
        match self.cmd_tx.send(command) {
            Ok(()) => true,
            Err(err) => {
                engine_warn!("Engine worker is gone; dropped {}", err.0.describe());
                false
            }
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, wait: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(wait)
    }
}

struct Worker {
    launcher: Arc<ReqwestLauncher>,
    consumer: StreamConsumer,
    pending: SharedPending,
    subscriptions: HashMap<JobId, StreamSubscription>,
    sink: Arc<dyn ProgressSink>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    fn handle(&mut self, command: EngineCommand) {
        self.subscriptions
            .retain(|_, subscription| !subscription.is_finished());

        match command {
            EngineCommand::Submit { job_id, request } => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.in_flight.insert(job_id);
                }
                let launcher = self.launcher.clone();
                let consumer = self.consumer.clone();
                let pending = self.pending.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = launcher.submit(job_id, &request).await;
                    let cancelled = match pending.lock() {
                        Ok(mut pending) => {
                            pending.in_flight.remove(&job_id);
                            let cancelled = pending.cancelled.remove(&job_id);
                            if let (Ok(handle), false) = (&result, cancelled) {
                                pending.accepted.insert(job_id, handle.clone());
                            }
                            cancelled
                        }
                        Err(_) => false,
                    };
                    if !cancelled {
                        let _ = event_tx.send(EngineEvent::Submitted { job_id, result });
                    } else if let Ok(handle) = result {
                        engine_info!("Job {} was closed during submit; releasing it", job_id);
                        consumer.release(&handle).await;
                    }
                });
            }
            EngineCommand::OpenStream { job_id } => {
                let handle = self
                    .pending
                    .lock()
                    .ok()
                    .and_then(|mut pending| pending.accepted.remove(&job_id));
                let Some(handle) = handle else {
                    engine_warn!("Job {} has no accepted submit; stream not opened", job_id);
                    self.sink.emit(EngineEvent::StreamFailed {
                        job_id,
                        failure: StreamFailure::Transport("job was not accepted".to_string()),
                    });
                    return;
                };

                // One subscription at a time.
                for (other, subscription) in self.subscriptions.drain() {
                    engine_warn!("Closing stream of job {} before job {}", other, job_id);
                    subscription.cancel();
                }
                let subscription = self.consumer.attach(&handle, self.sink.clone());
                self.subscriptions.insert(job_id, subscription);
            }
            EngineCommand::CloseStream { job_id } => {
                if let Some(subscription) = self.subscriptions.remove(&job_id) {
                    subscription.cancel();
                    return;
                }
                let unopened = match self.pending.lock() {
                    Ok(mut pending) => {
                        if pending.in_flight.contains(&job_id) {
                            pending.cancelled.insert(job_id);
                        }
                        pending.accepted.remove(&job_id)
                    }
                    Err(_) => None,
                };
                // Accepted but never streamed: the server still waits for the channel.
                if let Some(handle) = unopened {
                    let consumer = self.consumer.clone();
                    tokio::spawn(async move { consumer.release(&handle).await });
                }
            }
        }
    }

    fn shutdown(&mut self) {
        for (_, subscription) in self.subscriptions.drain() {
            subscription.cancel();
        }
    }
}
