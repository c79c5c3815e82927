use std::fmt;

use thiserror::Error;

use crate::protocol::{MAX_FRAME_LEN, STOP_MAGIC};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame of {0} bytes is too short")]
    TooShort(usize),
    #[error("Frame of {len} bytes exceeds the {capacity} bytes limit")]
    TooLong { len: usize, capacity: usize },
    #[error("Frame does not end with the stop marker (last byte {0:#04x})")]
    MissingStop(u8),
    #[error("Offset {offset} is outside of a {len} bytes frame")]
    OutOfRange { offset: usize, len: usize },
}

// A single protocol message, delimited by the start and stop markers.
// A frame can only be built from bytes that end with the stop marker,
// every other sequence is rejected at construction time.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    // Build a frame from the given bytes, checking the frame invariants
    pub const fn new(bytes: &[u8]) -> Result<Self, FrameError> {
        let len = bytes.len();

        if len < 2 {
            return Err(FrameError::TooShort(len));
        }

        if len > MAX_FRAME_LEN {
            return Err(FrameError::TooLong {
                len,
                capacity: MAX_FRAME_LEN,
            });
        }

        if bytes[len - 1] != STOP_MAGIC {
            return Err(FrameError::MissingStop(bytes[len - 1]));
        }

        let mut buf = [0; MAX_FRAME_LEN];
        let mut i = 0;
        while i < len {
            buf[i] = bytes[i];
            i += 1;
        }

        Ok(Self { bytes: buf, len })
    }

    // Build one of the fixed protocol frames. Used in constant context
    // so an invalid literal fails the build instead of reaching the wire
    pub const fn fixed(bytes: &[u8]) -> Self {
        match Self::new(bytes) {
            Ok(frame) => frame,
            Err(_) => panic!("invalid fixed protocol frame"),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Return the byte at the given offset, if the frame is long enough
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.as_bytes().get(offset).copied()
    }

    // Return a copy of the frame with the byte at the given offset replaced,
    // the result is validated like any other frame
    pub fn with_byte(&self, offset: usize, value: u8) -> Result<Self, FrameError> {
        if offset >= self.len {
            return Err(FrameError::OutOfRange {
                offset,
                len: self.len,
            });
        }

        let mut patched = *self;
        patched.bytes[offset] = value;

        Self::new(patched.as_bytes())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({self})")
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }

        Ok(())
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
