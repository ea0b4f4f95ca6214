//! Background conversion worker
//!
//! One named thread owns all conversion work. The caller talks to it only
//! through messages: [`WorkerRequest`]s in, [`WorkerEvent`]s out. The
//! mapping table is the only state shared with the caller, read-only.
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

mod protocol;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::convert::{ConversionOutcome, ConversionProgress, Converter};
use crate::error::Result;
use crate::mapping::MappingTable;
use crate::options::ConversionOptions;

pub use protocol::{PROTOCOL_VERSION, WorkerEvent, WorkerRequest};

/// Name of the worker thread
const WORKER_THREAD_NAME: &str = "bedrockify-worker";

/// Settings for a background worker
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Applied to every run
    pub conversion: ConversionOptions,
    /// Bound of the event channel; 0 makes every event a rendezvous
    pub event_capacity: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            conversion: ConversionOptions::default(),
            event_capacity: 64,
        }
    }
}

impl WorkerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_conversion(mut self, conversion: ConversionOptions) -> Self {
        self.conversion = conversion;
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

/// A queued convert request
struct Job {
    archive_bytes: Vec<u8>,
    name: Option<String>,
}

/// Starts background workers
pub struct ConversionWorker;

impl ConversionWorker {
    /// Spawn a worker thread sharing `table`
    ///
    /// Fails if the options are invalid or the thread cannot be started.
    pub fn spawn(table: Arc<MappingTable>, options: WorkerOptions) -> Result<WorkerHandle> {
        options.conversion.validate()?;

        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::sync_channel(options.event_capacity);
        let conversion = options.conversion;

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let converter = Converter::new(&table, conversion);
                worker_loop(&converter, &request_rx, &event_tx);
                tracing::debug!("Worker stopped");
            })?;

        tracing::debug!("Worker started (protocol v{PROTOCOL_VERSION})");
        Ok(WorkerHandle {
            requests: Some(request_tx),
            events: event_rx,
            thread: Some(thread),
        })
    }
}

/// Caller side of a worker
///
/// Dropping the handle closes the request channel; the worker finishes or
/// abandons its current run and exits.
pub struct WorkerHandle {
    requests: Option<Sender<WorkerRequest>>,
    events: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Send a request; false if the worker has exited
    pub fn send(&self, request: WorkerRequest) -> bool {
        self.requests
            .as_ref()
            .is_some_and(|requests| requests.send(request).is_ok())
    }

    /// Queue a conversion
    pub fn convert(&self, archive_bytes: Vec<u8>, name: Option<String>) -> bool {
        self.send(WorkerRequest::Convert {
            archive_bytes,
            name,
        })
    }

    /// Ask the current run to stop
    pub fn cancel(&self) -> bool {
        self.send(WorkerRequest::Cancel)
    }

    /// Block for the next event; `None` once the worker has exited
    pub fn recv(&self) -> Option<WorkerEvent> {
        self.events.recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Block until the current run ends, returning every event up to and including its terminal one
    pub fn wait_for_terminal(&self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv() {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    /// Close the request channel, drain remaining events and join the thread
    pub fn shutdown(mut self) -> Vec<WorkerEvent> {
        self.requests.take();
        let remaining: Vec<WorkerEvent> = self.events.iter().collect();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("Worker thread panicked");
        }
        remaining
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.requests.take();
    }
}

fn worker_loop(
    converter: &Converter<'_>,
    requests: &Receiver<WorkerRequest>,
    events: &SyncSender<WorkerEvent>,
) {
    let queue = RefCell::new(VecDeque::new());

    loop {
        let queued = queue.borrow_mut().pop_front();
        let job = match queued {
            Some(job) => job,
            None => match requests.recv() {
                Ok(WorkerRequest::Convert {
                    archive_bytes,
                    name,
                }) => Job {
                    archive_bytes,
                    name,
                },
                Ok(WorkerRequest::Cancel) => {
                    tracing::debug!("Ignoring cancel while idle");
                    continue;
                }
                Err(_) => break,
            },
        };

        if !run_job(converter, &job, requests, events, &queue) {
            break;
        }
        drain_after_run(requests, &queue);
    }
}

/// Queue converts that arrived after the run's last cancel check
///
/// A cancel still pending here was aimed at the run that just finished and
/// must not stop the next queued one.
fn drain_after_run(requests: &Receiver<WorkerRequest>, queue: &RefCell<VecDeque<Job>>) {
    while let Ok(request) = requests.try_recv() {
        match request {
            WorkerRequest::Convert {
                archive_bytes,
                name,
            } => queue.borrow_mut().push_back(Job {
                archive_bytes,
                name,
            }),
            WorkerRequest::Cancel => tracing::debug!("Dropping cancel that arrived after the run ended"),
        }
    }
}

/// Run one job; false once nobody is listening for events
fn run_job(
    converter: &Converter<'_>,
    job: &Job,
    requests: &Receiver<WorkerRequest>,
    events: &SyncSender<WorkerEvent>,
    queue: &RefCell<VecDeque<Job>>,
) -> bool {
    let listener_gone = AtomicBool::new(false);
    let cancel_requested = Cell::new(false);

    let progress = |p: &ConversionProgress| {
        if listener_gone.load(Ordering::Relaxed) {
            return;
        }
        let event = WorkerEvent::Progress {
            fraction: p.fraction(),
            current_path: p.current_file.clone(),
        };
        if events.send(event).is_err() {
            listener_gone.store(true, Ordering::Relaxed);
        }
    };

    // Requests arriving mid-run: cancel stops this run, converts wait their turn
    let cancel = || {
        if cancel_requested.get() || listener_gone.load(Ordering::Relaxed) {
            return true;
        }
        loop {
            match requests.try_recv() {
                Ok(WorkerRequest::Cancel) => {
                    cancel_requested.set(true);
                    return true;
                }
                Ok(WorkerRequest::Convert {
                    archive_bytes,
                    name,
                }) => queue.borrow_mut().push_back(Job {
                    archive_bytes,
                    name,
                }),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return false,
            }
        }
    };

    let outcome =
        converter.convert_with_progress(&job.archive_bytes, job.name.as_deref(), &progress, &cancel);

    if listener_gone.load(Ordering::Relaxed) {
        return false;
    }

    let event = match outcome {
        ConversionOutcome::Done(result) => WorkerEvent::Done {
            result_bytes: result.archive,
            warnings: result.warnings,
            errors: result.errors,
        },
        ConversionOutcome::Failed(error) => WorkerEvent::Failed {
            error_kind: error.kind(),
            message: error.to_string(),
        },
        ConversionOutcome::Cancelled => WorkerEvent::Cancelled,
    };
    events.send(event).is_ok()
}
