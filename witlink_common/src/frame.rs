use core::fmt::Display;
use static_assertions::const_assert_eq;

pub const FRAME_LEN: usize = 20;
pub const PAYLOAD_LEN: usize = 18;
pub const HEADER: u8 = 0x55;

const_assert_eq!(FRAME_LEN, 2 + PAYLOAD_LEN);

/// Type selector, the byte following the header.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// Acceleration, angular rate and angles in one frame.
    Motion,
    /// Register read-back; the first payload byte says which register.
    Orientation,
}

impl FrameType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x61 => Some(FrameType::Motion),
            0x71 => Some(FrameType::Orientation),
            _ => None,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            FrameType::Motion => 0x61,
            FrameType::Orientation => 0x71,
        }
    }
}

/// One 20 byte frame: `0x55`, type byte, 18 payload bytes.
///
/// The stream has no checksum and no length prefix, so the header and type
/// byte are the only things that can be validated. Only the type is kept;
/// the header is implied.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    frame_type: FrameType,
    payload: [u8; PAYLOAD_LEN],
}

impl Frame {
    /// Returns `None` unless `bytes` is exactly 20 bytes long with a valid
    /// header and type byte.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; FRAME_LEN] = bytes.try_into().ok()?;
        if bytes[0] != HEADER {
            return None;
        }
        let frame_type = FrameType::from_byte(bytes[1])?;
        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&bytes[2..]);
        Some(Self {
            frame_type,
            payload,
        })
    }

    /// Assemble a frame from a type and payload.
    pub fn new(frame_type: FrameType, payload: &[u8; PAYLOAD_LEN]) -> Self {
        Self {
            frame_type,
            payload: *payload,
        }
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn payload(&self) -> &[u8; PAYLOAD_LEN] {
        &self.payload
    }

    /// The frame as it appears on the wire.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = HEADER;
        bytes[1] = self.frame_type.to_byte();
        bytes[2..].copy_from_slice(&self.payload);
        bytes
    }
}

/// Space separated upper-case hex, e.g. `55 61 00 40 ...`
impl Display for Frame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02X} {:02X}", HEADER, self.frame_type.to_byte())?;
        for b in self.payload.iter() {
            write!(f, " {:02X}", b)?;
        }
        Ok(())
    }
}
