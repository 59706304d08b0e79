#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// Acceleration, angular rate and Euler angles from a single motion frame.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64,
    pub gyro_x: f64, // deg/s
    pub gyro_y: f64,
    pub gyro_z: f64,
    pub angle_x: f64, // deg
    pub angle_y: f64,
    pub angle_z: f64,
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnetometer {
    pub hx: f64,
    pub hy: f64,
    pub hz: f64,
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub q0: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quaternion {
    pub fn norm_squared(&self) -> f64 {
        self.q0 * self.q0 + self.q1 * self.q1 + self.q2 * self.q2 + self.q3 * self.q3
    }
}

/// The result of decoding one frame.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Motion(Motion),
    Magnetometer(Magnetometer),
    Quaternion(Quaternion),
    /// Orientation frame with a register byte we have no layout for.
    Unrecognized { discriminator: u8 },
}

/// Quaternion norms further than this from 1.0 are treated as implausible.
pub const QUATERNION_NORM_TOLERANCE: f64 = 0.1;

impl Sample {
    /// Channel readings carried by this sample, in wire order.
    pub fn readings(&self) -> impl Iterator<Item = (Channel, f64)> {
        let mut out = [(Channel::AccX, 0.0); 9];
        let n = match self {
            Sample::Motion(m) => {
                out = [
                    (Channel::AccX, m.acc_x),
                    (Channel::AccY, m.acc_y),
                    (Channel::AccZ, m.acc_z),
                    (Channel::GyroX, m.gyro_x),
                    (Channel::GyroY, m.gyro_y),
                    (Channel::GyroZ, m.gyro_z),
                    (Channel::AngleX, m.angle_x),
                    (Channel::AngleY, m.angle_y),
                    (Channel::AngleZ, m.angle_z),
                ];
                9
            }
            Sample::Magnetometer(h) => {
                out[0] = (Channel::Hx, h.hx);
                out[1] = (Channel::Hy, h.hy);
                out[2] = (Channel::Hz, h.hz);
                3
            }
            Sample::Quaternion(q) => {
                out[0] = (Channel::Q0, q.q0);
                out[1] = (Channel::Q1, q.q1);
                out[2] = (Channel::Q2, q.q2);
                out[3] = (Channel::Q3, q.q3);
                4
            }
            Sample::Unrecognized { .. } => 0,
        };
        out.into_iter().take(n)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Sample::Unrecognized { .. })
    }

    /// Out-of-band sanity check for frames that may have been picked up by a
    /// false header lock. Motion and magnetometer values cannot leave their
    /// full-scale range by construction; a quaternion can still be checked
    /// for unit norm.
    pub fn is_plausible(&self) -> bool {
        match self {
            Sample::Quaternion(q) => (q.norm_squared() - 1.0).abs() <= QUATERNION_NORM_TOLERANCE,
            Sample::Motion(_) | Sample::Magnetometer(_) => true,
            Sample::Unrecognized { .. } => false,
        }
    }
}

/// Named measurement channels, as stored in the last-value cache.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    AccX,
    AccY,
    AccZ,
    GyroX,
    GyroY,
    GyroZ,
    AngleX,
    AngleY,
    AngleZ,
    Hx,
    Hy,
    Hz,
    Q0,
    Q1,
    Q2,
    Q3,
}

impl Channel {
    pub const COUNT: usize = 16;

    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::AccX,
        Channel::AccY,
        Channel::AccZ,
        Channel::GyroX,
        Channel::GyroY,
        Channel::GyroZ,
        Channel::AngleX,
        Channel::AngleY,
        Channel::AngleZ,
        Channel::Hx,
        Channel::Hy,
        Channel::Hz,
        Channel::Q0,
        Channel::Q1,
        Channel::Q2,
        Channel::Q3,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short name used by the device tooling (`AccX`, `AsX`, `HX`, `Q0`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Channel::AccX => "AccX",
            Channel::AccY => "AccY",
            Channel::AccZ => "AccZ",
            Channel::GyroX => "AsX",
            Channel::GyroY => "AsY",
            Channel::GyroZ => "AsZ",
            Channel::AngleX => "AngX",
            Channel::AngleY => "AngY",
            Channel::AngleZ => "AngZ",
            Channel::Hx => "HX",
            Channel::Hy => "HY",
            Channel::Hz => "HZ",
            Channel::Q0 => "Q0",
            Channel::Q1 => "Q1",
            Channel::Q2 => "Q2",
            Channel::Q3 => "Q3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Channel::ALL.iter().copied().find(|c| c.name() == name)
    }
}
