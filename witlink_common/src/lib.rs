//! Wire formats for the WitMotion-style BLE 9-axis IMU.
//!
//! Device -> Host: a stream of 20 byte frames (`0x55`, type, 18 payload
//! bytes) split arbitrarily across notifications.
//!
//! Host -> Device: 5 byte register commands (`0xFF 0xAA ...`). Nothing is
//! acknowledged.
#![cfg_attr(feature = "no_std", no_std)]

pub mod cmd;
pub mod decode;
pub mod frame;
pub mod sample;

pub use cmd::{read_command, write_command, Command, CommandKind, OutputRate};
pub use decode::{decode, sign16, AccelUnit, DecoderConfig};
pub use frame::{Frame, FrameType, FRAME_LEN, HEADER, PAYLOAD_LEN};
pub use sample::{Channel, Magnetometer, Motion, Quaternion, Sample};
