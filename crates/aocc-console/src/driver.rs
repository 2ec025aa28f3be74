//! Async driver for a [`Session`].
//!
//! A single tokio task owns the session. Operator commands arrive as boxed
//! closures over an mpsc channel and are answered through a oneshot; between
//! commands the task sleeps until the session's next deadline and then calls
//! [`Session::tick`]. After every wake-up the task publishes a fresh
//! [`SessionSnapshot`] on a `watch` channel for renderers.
//!
//! Build the session with [`aocc_core::TokioClock`] so deadlines and the
//! runtime agree on time (including under `tokio::time::pause`).

use std::time::Instant;

use aocc_core::{AoccError, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::{Session, SessionSnapshot};

/// Queued commands before callers start waiting.
const JOB_BUFFER: usize = 32;

type Job = Box<dyn FnOnce(&mut Session) + Send>;

/// Handle to a running session task. Dropping it aborts the task.
pub struct SessionHandle {
    jobs: mpsc::Sender<Job>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

/// Move `session` onto a new tokio task.
pub fn spawn(session: Session) -> SessionHandle {
    let (jobs_tx, jobs_rx) = mpsc::channel::<Job>(JOB_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    info!("starting session driver");
    let task = tokio::spawn(run_loop(session, jobs_rx, snapshot_tx));

    SessionHandle {
        jobs: jobs_tx,
        snapshots: snapshot_rx,
        task,
    }
}

async fn run_loop(
    mut session: Session,
    mut jobs: mpsc::Receiver<Job>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            job = jobs.recv() => match job {
                Some(job) => job(&mut session),
                None => break,
            },
            _ = sleep_until(deadline) => {}
        }

        let fired = session.tick();
        if fired > 0 {
            debug!(fired, "deadlines fired");
        }
        snapshots.send_replace(session.snapshot());
    }

    session.dispose();
    snapshots.send_replace(session.snapshot());
    info!("session driver stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

impl SessionHandle {
    /// Run `f` against the session on the driver task and return its result.
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Session) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |session| {
            let _ = reply_tx.send(f(session));
        });

        self.jobs.send(job).await.map_err(|_| AoccError::DriverStopped {
            message: "command channel closed".to_string(),
        })?;
        reply_rx.await.map_err(|_| AoccError::DriverStopped {
            message: "command dropped without reply".to_string(),
        })
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Dispose the session and stop the task, returning the final snapshot.
    pub async fn shutdown(self) -> Result<SessionSnapshot> {
        let snapshot = self
            .call(|session| {
                session.dispose();
                session.snapshot()
            })
            .await?;
        info!("session shut down");
        Ok(snapshot)
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
