use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use witlink_common::cmd::{calibrate_accel_command, save_command, unlock_command, REG_RRATE};
use witlink_common::{read_command, write_command, OutputRate};

use crate::error::{SessionError, TransportError};
use crate::queue::{Batch, CommandQueue};

/// Builds register handshakes and submits them to the command queue.
///
/// The sensor acknowledges nothing. A returned `Ok` means every write in the
/// batch was accepted by the transport, not that the device applied it.
#[derive(Clone)]
pub struct Sequencer {
    queue: CommandQueue,
    settle: Duration,
}

impl Sequencer {
    pub fn new(queue: CommandQueue, settle: Duration) -> Self {
        Self { queue, settle }
    }

    /// unlock, settle, write, settle, save
    pub fn persist_write_batch(&self, register: u8, value: u16) -> Batch {
        Batch::new("persist_write")
            .write(unlock_command())
            .settle(self.settle)
            .write(write_command(register, value))
            .settle(self.settle)
            .write(save_command())
    }

    /// The rate change wraps a full persisted write in a second unlock/save
    /// pair, which is what the vendor tooling sends.
    pub fn sampling_rate_batch(&self, code: u8) -> Batch {
        Batch::new("set_sampling_rate")
            .write(unlock_command())
            .settle(self.settle)
            .then(self.persist_write_batch(REG_RRATE, code as u16))
            .settle(self.settle)
            .write(save_command())
    }

    pub async fn persist_write(&self, register: u8, value: u16) -> Result<(), SessionError> {
        info!("persist write 0x{:02x}=0x{:04x}", register, value);
        self.queue
            .submit(self.persist_write_batch(register, value))
            .await
    }

    pub async fn set_sampling_rate(&self, code: u8) -> Result<(), SessionError> {
        match OutputRate::from_byte(code) {
            Some(rate) => info!("set sampling rate to {} Hz", rate.as_hz()),
            None => warn!("sampling rate code 0x{:02x} is not a known rate", code),
        }
        self.queue.submit(self.sampling_rate_batch(code)).await
    }

    pub async fn set_output_rate(&self, rate: OutputRate) -> Result<(), SessionError> {
        self.set_sampling_rate(rate.to_byte()).await
    }

    /// Ask the device to stream back `register`. The result shows up as a
    /// notification frame, if at all.
    pub async fn read_register(&self, register: u8) -> Result<(), SessionError> {
        self.queue
            .submit(Batch::single("read", read_command(register)))
            .await
    }

    /// Start accelerometer calibration. Not persisted.
    pub async fn calibrate_acceleration(&self) -> Result<(), SessionError> {
        info!("starting accelerometer calibration");
        self.queue
            .submit(Batch::single("calibrate", calibrate_accel_command()))
            .await
    }
}

/// Issue a read of `register` every `interval` until `stop` flips to true or
/// the queue closes. The stop signal is checked every tick.
pub async fn polling_loop(
    queue: CommandQueue,
    register: u8,
    interval: Duration,
    start_delay: Duration,
    mut stop: watch::Receiver<bool>,
) {
    if interval.is_zero() {
        warn!("poll interval is zero, polling disabled");
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(start_delay) => {}
        _ = stop.wait_for(|stopped| *stopped) => return,
    }
    info!("polling register 0x{:02x} every {:?}", register, interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.wait_for(|stopped| *stopped) => break,
        }

        match queue
            .submit(Batch::single("poll", read_command(register)))
            .await
        {
            Ok(()) => {}
            Err(SessionError::Closed) => break,
            Err(SessionError::Transport(TransportError::Disconnected)) => {
                info!("device disconnected, polling stopped");
                break;
            }
            Err(e) => warn!("poll read failed: {}", e),
        }
    }
    debug!("polling loop exited");
}
