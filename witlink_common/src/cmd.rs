use core::fmt::Display;

pub const COMMAND_LEN: usize = 5;

/// Every command starts with this two byte prefix.
pub const PREFIX: [u8; 2] = [0xFF, 0xAA];

// register addresses
pub const REG_SAVE: u8 = 0x00;
pub const REG_CALSW: u8 = 0x01;
pub const REG_RRATE: u8 = 0x03;
pub const REG_READADDR: u8 = 0x27;
pub const REG_MAG: u8 = 0x3A;
pub const REG_QUATERNION: u8 = 0x51;
pub const REG_KEY: u8 = 0x69;

/// Value written to `REG_KEY` to unlock the configuration registers.
pub const UNLOCK_KEY: u16 = 0xB588;

/// Value written to `REG_CALSW` to start accelerometer calibration.
pub const CALSW_ACCEL: u16 = 0x0001;

/// A 5-byte register command.
///
/// There are two shapes on the wire:
/// - read:  `FF AA 27 reg 00`
/// - write: `FF AA reg lo hi`
///
/// The sensor never acknowledges a command. The only evidence that a command
/// was applied is whatever it changes in the frames streamed back afterwards.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; COMMAND_LEN]);

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Read { register: u8 },
    Write { register: u8, value: u16 },
}

/// Request the contents of `register`. The answer arrives as a regular
/// notification frame.
pub fn read_command(register: u8) -> Command {
    Command([PREFIX[0], PREFIX[1], REG_READADDR, register, 0x00])
}

/// Write a 16 bit value (little-endian) into `register`.
pub fn write_command(register: u8, value: u16) -> Command {
    let [lo, hi] = value.to_le_bytes();
    Command([PREFIX[0], PREFIX[1], register, lo, hi])
}

/// Must precede any write that should be persisted.
pub fn unlock_command() -> Command {
    write_command(REG_KEY, UNLOCK_KEY)
}

/// Persist the current register contents.
pub fn save_command() -> Command {
    write_command(REG_SAVE, 0x0000)
}

pub fn calibrate_accel_command() -> Command {
    write_command(REG_CALSW, CALSW_ACCEL)
}

impl Command {
    pub fn as_bytes(&self) -> &[u8; COMMAND_LEN] {
        &self.0
    }

    /// Parse raw bytes back into a command. Returns `None` if the slice is
    /// not 5 bytes long or is missing the prefix.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; COMMAND_LEN] = bytes.try_into().ok()?;
        if bytes[0..2] != PREFIX {
            return None;
        }
        Some(Self(bytes))
    }

    pub fn kind(&self) -> CommandKind {
        // a write of 0x27 is indistinguishable from a read, which is how the
        // firmware treats it too
        if self.0[2] == REG_READADDR {
            CommandKind::Read {
                register: self.0[3],
            }
        } else {
            CommandKind::Write {
                register: self.0[2],
                value: u16::from_le_bytes([self.0[3], self.0[4]]),
            }
        }
    }

    pub fn register(&self) -> u8 {
        match self.kind() {
            CommandKind::Read { register } => register,
            CommandKind::Write { register, .. } => register,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind() {
            CommandKind::Read { register } => write!(f, "read 0x{:02x}", register),
            CommandKind::Write {
                register: REG_KEY,
                value: UNLOCK_KEY,
            } => write!(f, "unlock"),
            CommandKind::Write {
                register: REG_SAVE,
                value: 0,
            } => write!(f, "save"),
            CommandKind::Write { register, value } => {
                write!(f, "write 0x{:02x}=0x{:04x}", register, value)
            }
        }
    }
}

/// Output rate codes for `REG_RRATE`.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRate {
    Hz0_2,
    Hz0_5,
    Hz1,
    Hz2,
    Hz5,
    Hz10,
    Hz20,
    Hz50,
    Hz100,
    Hz200,
}

impl OutputRate {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(OutputRate::Hz0_2),
            0x02 => Some(OutputRate::Hz0_5),
            0x03 => Some(OutputRate::Hz1),
            0x04 => Some(OutputRate::Hz2),
            0x05 => Some(OutputRate::Hz5),
            0x06 => Some(OutputRate::Hz10),
            0x07 => Some(OutputRate::Hz20),
            0x08 => Some(OutputRate::Hz50),
            0x09 => Some(OutputRate::Hz100),
            0x0B => Some(OutputRate::Hz200),
            _ => None,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            OutputRate::Hz0_2 => 0x01,
            OutputRate::Hz0_5 => 0x02,
            OutputRate::Hz1 => 0x03,
            OutputRate::Hz2 => 0x04,
            OutputRate::Hz5 => 0x05,
            OutputRate::Hz10 => 0x06,
            OutputRate::Hz20 => 0x07,
            OutputRate::Hz50 => 0x08,
            OutputRate::Hz100 => 0x09,
            OutputRate::Hz200 => 0x0B,
        }
    }

    pub fn as_hz(&self) -> f32 {
        match self {
            OutputRate::Hz0_2 => 0.2,
            OutputRate::Hz0_5 => 0.5,
            OutputRate::Hz1 => 1.0,
            OutputRate::Hz2 => 2.0,
            OutputRate::Hz5 => 5.0,
            OutputRate::Hz10 => 10.0,
            OutputRate::Hz20 => 20.0,
            OutputRate::Hz50 => 50.0,
            OutputRate::Hz100 => 100.0,
            OutputRate::Hz200 => 200.0,
        }
    }
}
