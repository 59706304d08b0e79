//! Host side of the BLE IMU link: turns notification chunks into samples and
//! serialises register commands onto the write characteristic.
//!
//! ```text
//! transport chunk -> Reassembler -> decode -> SampleStore -> consumer
//! Sequencer -> CommandQueue -> writer task -> transport write
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod replay;
pub mod sequencer;
pub mod session;
pub mod store;
pub mod transport;

pub use config::SessionConfig;
pub use error::{ConfigError, ReplayError, SessionError, TransportError};
pub use pipeline::{Consumer, Pipeline, PipelineStats, Reassembler};
pub use queue::{Batch, CommandQueue, Step};
pub use sequencer::{polling_loop, Sequencer};
pub use session::Session;
pub use store::SampleStore;
pub use transport::{NotifySink, ServiceInfo, Transport};
