#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

use crate::cmd::{REG_MAG, REG_QUATERNION};
use crate::frame::{Frame, FrameType};
use crate::sample::{Magnetometer, Motion, Quaternion, Sample};

/// Standard gravity, m/s²
pub const G: f64 = 9.80665;

pub const ACC_FULL_SCALE_G: f64 = 16.0;
pub const GYRO_FULL_SCALE_DPS: f64 = 2000.0;
pub const ANGLE_FULL_SCALE_DEG: f64 = 180.0;
pub const MAG_DIVISOR: f64 = 120.0;
pub const RAW_FULL_SCALE: f64 = 32768.0;

/// Unit for decoded acceleration.
///
/// Known decoders for this sensor disagree on whether the gravity constant
/// is applied, so the choice is explicit rather than baked in.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelUnit {
    /// m/s²
    #[default]
    MetersPerSecondSquared,
    /// multiples of g
    StandardGravity,
}

impl AccelUnit {
    pub fn scale(&self) -> f64 {
        match self {
            AccelUnit::MetersPerSecondSquared => ACC_FULL_SCALE_G * G,
            AccelUnit::StandardGravity => ACC_FULL_SCALE_G,
        }
    }
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    pub accel_unit: AccelUnit,
}

/// Reinterpret a raw 16 bit word as two's complement.
pub fn sign16(raw: u16) -> i16 {
    raw as i16
}

/// Signed little-endian word starting at `offset`.
fn word(bytes: &[u8], offset: usize) -> f64 {
    sign16(u16::from_le_bytes([bytes[offset], bytes[offset + 1]])) as f64
}

/// Decode a frame. Never fails: orientation frames carrying an unknown
/// register come back as `Sample::Unrecognized`.
pub fn decode(frame: &Frame, config: &DecoderConfig) -> Sample {
    let p = frame.payload();
    match frame.frame_type() {
        FrameType::Motion => {
            let acc = config.accel_unit.scale() / RAW_FULL_SCALE;
            let gyro = GYRO_FULL_SCALE_DPS / RAW_FULL_SCALE;
            let angle = ANGLE_FULL_SCALE_DEG / RAW_FULL_SCALE;
            Sample::Motion(Motion {
                acc_x: word(p, 0) * acc,
                acc_y: word(p, 2) * acc,
                acc_z: word(p, 4) * acc,
                gyro_x: word(p, 6) * gyro,
                gyro_y: word(p, 8) * gyro,
                gyro_z: word(p, 10) * gyro,
                angle_x: word(p, 12) * angle,
                angle_y: word(p, 14) * angle,
                angle_z: word(p, 16) * angle,
            })
        }
        // payload[0] is the register, payload[1] is unused
        FrameType::Orientation => match p[0] {
            REG_MAG => Sample::Magnetometer(Magnetometer {
                hx: word(p, 2) / MAG_DIVISOR,
                hy: word(p, 4) / MAG_DIVISOR,
                hz: word(p, 6) / MAG_DIVISOR,
            }),
            REG_QUATERNION => Sample::Quaternion(Quaternion {
                q0: word(p, 2) / RAW_FULL_SCALE,
                q1: word(p, 4) / RAW_FULL_SCALE,
                q2: word(p, 6) / RAW_FULL_SCALE,
                q3: word(p, 8) / RAW_FULL_SCALE,
            }),
            other => Sample::Unrecognized {
                discriminator: other,
            },
        },
    }
}
