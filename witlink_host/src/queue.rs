//! Single-writer command path.
//!
//! All outbound commands, whether from the poll loop or from on-demand
//! configuration, go through one channel with one consuming task. A batch is
//! executed start to finish before the next one is taken off the channel, so
//! a multi-step handshake can never be interleaved with other traffic.
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use witlink_common::Command;

use crate::error::{SessionError, TransportError};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Write(Command),
    /// give the firmware time before the next write
    Settle(Duration),
}

/// Steps that run contiguously on the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    label: &'static str,
    steps: Vec<Step>,
}

impl Batch {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
        }
    }

    pub fn single(label: &'static str, cmd: Command) -> Self {
        Self::new(label).write(cmd)
    }

    pub fn write(mut self, cmd: Command) -> Self {
        self.steps.push(Step::Write(cmd));
        self
    }

    pub fn settle(mut self, interval: Duration) -> Self {
        self.steps.push(Step::Settle(interval));
        self
    }

    /// Append all steps of another batch.
    pub fn then(mut self, other: Batch) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.steps.iter().filter_map(|s| match s {
            Step::Write(cmd) => Some(*cmd),
            Step::Settle(_) => None,
        })
    }
}

struct Job {
    batch: Batch,
    done: oneshot::Sender<Result<(), TransportError>>,
}

/// Cloneable handle for submitting batches to the writer.
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<Job>,
}

pub struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl CommandQueue {
    pub fn channel() -> (CommandQueue, CommandReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CommandQueue { tx }, CommandReceiver { rx })
    }

    /// Queue a batch and wait until the writer has run it. Batches run in
    /// submission order.
    pub async fn submit(&self, batch: Batch) -> Result<(), SessionError> {
        let (done, result) = oneshot::channel();
        self.tx
            .send(Job { batch, done })
            .map_err(|_| SessionError::Closed)?;
        match result.await {
            Ok(r) => r.map_err(SessionError::from),
            // writer went away mid-batch
            Err(_) => Err(SessionError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consume batches until every `CommandQueue` handle is dropped. A failed
/// write abandons the rest of its batch; nothing is retried.
pub async fn run_writer<T: Transport>(
    mut receiver: CommandReceiver,
    transport: Arc<Mutex<T>>,
    characteristic: String,
) {
    while let Some(job) = receiver.rx.recv().await {
        let result = run_batch(&job.batch, &transport, &characteristic).await;
        if let Err(e) = &result {
            warn!("batch '{}' aborted: {}", job.batch.label(), e);
        }
        // submitter may have given up waiting
        let _ = job.done.send(result);
    }
    debug!("command writer stopped");
}

async fn run_batch<T: Transport>(
    batch: &Batch,
    transport: &Arc<Mutex<T>>,
    characteristic: &str,
) -> Result<(), TransportError> {
    for step in batch.steps() {
        match step {
            Step::Write(cmd) => {
                let mut t = transport.lock().await;
                if !t.is_connected() {
                    return Err(TransportError::Disconnected);
                }
                debug!("[{}] {}", batch.label(), cmd);
                t.write_characteristic(characteristic, cmd.as_bytes()).await?;
            }
            Step::Settle(interval) => tokio::time::sleep(*interval).await,
        }
    }
    Ok(())
}
