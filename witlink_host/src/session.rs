use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use witlink_common::Sample;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::queue::{run_writer, CommandQueue};
use crate::sequencer::{polling_loop, Sequencer};
use crate::store::SampleStore;
use crate::transport::{find_service, Transport};

/// One open connection to a sensor.
///
/// Owns three tasks: the notification drain (pipeline), the command writer
/// and the poll loop. The drain only exists if the notify characteristic was
/// found; the writer and poll loop only if the write characteristic was.
pub struct Session<T: Transport + 'static> {
    transport: Arc<Mutex<T>>,
    sequencer: Option<Sequencer>,
    shutdown: watch::Sender<bool>,
    poll_stop: watch::Sender<bool>,
    stats: watch::Receiver<PipelineStats>,
    tasks: Vec<JoinHandle<()>>,
    /// subscribed notify characteristic
    notify_char: Option<String>,
    open: bool,
}

impl<T: Transport + 'static> Session<T> {
    /// Connect, locate the sensor service and start the background tasks.
    /// `consumer` runs on the drain task once per decoded frame.
    pub async fn open<F>(
        mut transport: T,
        config: SessionConfig,
        consumer: F,
    ) -> Result<Self, SessionError>
    where
        F: FnMut(&SampleStore, &Sample) + Send + 'static,
    {
        config.validate()?;
        info!("Opening device...");
        transport.connect().await.map_err(SessionError::Connect)?;

        let services = match transport.discover_services().await {
            Ok(s) => s,
            Err(e) => {
                error!("Service discovery failed: {e}");
                disconnect_quietly(&mut transport).await;
                return Err(SessionError::Connect(e));
            }
        };
        let service = match find_service(&services, &config.service_uuid) {
            Some(s) => s.clone(),
            None => {
                warn!("Service {} not found", config.service_uuid);
                disconnect_quietly(&mut transport).await;
                return Err(SessionError::ServiceNotFound(config.service_uuid.clone()));
            }
        };
        debug!("Service found: {:?}", service);

        let (shutdown, _) = watch::channel(false);
        let (poll_stop, _) = watch::channel(false);
        let (stats_tx, stats) = watch::channel(PipelineStats::default());
        let mut tasks = Vec::new();

        let notifying = service.has_characteristic(&config.notify_char_uuid);
        if notifying {
            let (sink, chunks) = mpsc::unbounded_channel();
            if let Err(e) = transport
                .subscribe_notify(&config.notify_char_uuid, sink)
                .await
            {
                error!("Subscribe failed: {e}");
                disconnect_quietly(&mut transport).await;
                return Err(e.into());
            }
            info!("Subscribed to {}", config.notify_char_uuid);

            let pipeline = Pipeline::new(config.decoder_config(), Box::new(consumer))
                .with_plausibility_check(config.plausibility_check);
            tasks.push(tokio::spawn(drain_notifications(
                chunks,
                pipeline,
                stats_tx,
                shutdown.subscribe(),
            )));
        } else {
            warn!("No notify characteristic, no samples will be produced");
        }

        let transport = Arc::new(Mutex::new(transport));

        let sequencer = if service.has_characteristic(&config.write_char_uuid) {
            let (queue, receiver) = CommandQueue::channel();
            tasks.push(tokio::spawn(run_writer(
                receiver,
                transport.clone(),
                config.write_char_uuid.clone(),
            )));
            if let Some(register) = config.poll_register {
                tasks.push(tokio::spawn(polling_loop(
                    queue.clone(),
                    register,
                    config.poll_interval(),
                    config.poll_start_delay(),
                    poll_stop.subscribe(),
                )));
            }
            Some(Sequencer::new(queue, config.settle_interval()))
        } else {
            warn!("No write characteristic, commands and polling disabled");
            None
        };

        info!("Device open");
        Ok(Self {
            transport,
            sequencer,
            shutdown,
            poll_stop,
            stats,
            tasks,
            notify_char: notifying.then(|| config.notify_char_uuid.clone()),
            open: true,
        })
    }

    /// Command interface. Fails if the session is closed or the device has
    /// no write characteristic.
    pub fn sequencer(&self) -> Result<&Sequencer, SessionError> {
        if !self.open {
            return Err(SessionError::Closed);
        }
        self.sequencer
            .as_ref()
            .ok_or(SessionError::NoWriteCharacteristic)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_notifying(&self) -> bool {
        self.notify_char.is_some()
    }

    /// Counters from the notification pipeline as of the last chunk.
    pub fn stats(&self) -> PipelineStats {
        *self.stats.borrow()
    }

    /// Stop the poll loop. On-demand commands keep working.
    pub fn stop_polling(&self) {
        self.poll_stop.send_replace(true);
    }

    /// Tear down every task and disconnect. Commands still in flight are
    /// abandoned. Calling this twice is harmless.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        info!("Closing device...");

        self.poll_stop.send_replace(true);
        self.shutdown.send_replace(true);
        for task in self.tasks.iter() {
            task.abort();
        }
        for task in self.tasks.drain(..) {
            // cancelled tasks report a JoinError, which is expected here
            let _ = task.await;
        }
        self.sequencer = None;

        let mut transport = self.transport.lock().await;
        if transport.is_connected() {
            if let Some(characteristic) = self.notify_char.take() {
                // disconnect regardless
                if let Err(e) = transport.unsubscribe_notify(&characteristic).await {
                    warn!("Unsubscribe from {} failed: {}", characteristic, e);
                }
            }
            transport.disconnect().await?;
        }
        info!("Device closed.");
        Ok(())
    }
}

impl<T: Transport + 'static> Drop for Session<T> {
    fn drop(&mut self) {
        for task in self.tasks.iter() {
            task.abort();
        }
    }
}

async fn drain_notifications(
    mut chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    mut pipeline: Pipeline,
    stats: watch::Sender<PipelineStats>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            chunk = chunks.recv() => match chunk {
                Some(chunk) => {
                    pipeline.feed(&chunk);
                    stats.send_replace(pipeline.stats());
                }
                None => {
                    debug!("notification channel closed");
                    break;
                }
            },
            _ = shutdown.wait_for(|stopped| *stopped) => break,
        }
    }
}

async fn disconnect_quietly<T: Transport>(transport: &mut T) {
    if let Err(e) = transport.disconnect().await {
        warn!("Disconnect after failed open also failed: {e}");
    }
}
