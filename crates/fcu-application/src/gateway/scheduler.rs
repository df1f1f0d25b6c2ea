//! Main-thread job queue.
//!
//! Inbound calls arrive on the transport's reader task. Nothing runs there:
//! every call becomes a [`Job`] that the thread owning the client loop
//! drains once per iteration.

use fcu_core::session::{InboundReceiver, InboundRequest, InboundSender, inbound_channel};
use fcu_core::{FcuError, Result};
use std::sync::Mutex;
use std::thread::{self, ThreadId};
use tokio::sync::mpsc;

/// Work for the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// A call the server made; answered after it ran when it carries an id.
    Inbound(InboundRequest),
    /// Connect again after the server announced a restart.
    Reconnect,
}

pub struct MainThreadQueue {
    owner: ThreadId,
    inbound_tx: InboundSender,
    inbound_rx: Mutex<InboundReceiver>,
    jobs_tx: mpsc::UnboundedSender<Job>,
    jobs_rx: Mutex<mpsc::UnboundedReceiver<Job>>,
}

impl MainThreadQueue {
    /// Creates a queue owned by the calling thread.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = inbound_channel();
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        Self {
            owner: thread::current().id(),
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            jobs_tx,
            jobs_rx: Mutex::new(jobs_rx),
        }
    }

    /// Sender handed to the transport for server-initiated calls.
    pub fn inbound_sender(&self) -> InboundSender {
        self.inbound_tx.clone()
    }

    /// Queues a job. Never runs it, whichever thread posts.
    pub fn post(&self, job: Job) {
        if self.jobs_tx.send(job).is_err() {
            tracing::warn!("[Scheduler] Queue closed, job dropped");
        }
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Takes every queued job: server calls first, in arrival order, then
    /// internal jobs.
    ///
    /// # Errors
    ///
    /// `FcuError::Internal` when called from a thread other than the owner.
    pub fn drain(&self) -> Result<Vec<Job>> {
        if !self.is_owner_thread() {
            return Err(FcuError::internal(
                "main-thread queue drained from a foreign thread",
            ));
        }

        let mut jobs = Vec::new();
        if let Ok(mut inbound) = self.inbound_rx.lock() {
            while let Ok(request) = inbound.try_recv() {
                jobs.push(Job::Inbound(request));
            }
        }
        if let Ok(mut internal) = self.jobs_rx.lock() {
            while let Ok(job) = internal.try_recv() {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }
}

impl Default for MainThreadQueue {
    fn default() -> Self {
        Self::new()
    }
}
