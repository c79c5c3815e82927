pub mod command;
pub mod frame;

pub use command::McuRequest;
pub use frame::{Frame, FrameError};

pub const START_MAGIC: u8 = 0xfa;
pub const STOP_MAGIC: u8 = 0xfb;

// The longest frame defined by the protocol is the date and time write
pub const MAX_FRAME_LEN: usize = 13;

// Number of leading bytes a response must share with its request
pub const HEADER_LEN: usize = 5;

// Offset of the raw sensor code in the thermal status response
pub const THERMAL_CODE_OFFSET: usize = 5;

// Offset of the delay parameter in the shutdown request
pub const SHUTDOWN_DELAY_OFFSET: usize = 5;

// GPIO line wired to the front power button
pub const GPIO_BUTTON_POWER: u32 = 29;

pub const ACK: Frame = Frame::fixed(&[0xfa, 0x30, 0x00, 0x00, 0x00, 0x00, 0xfb]);

pub const DEVICE_READY: Frame = Frame::fixed(&[0xfa, 0x03, 0x01, 0x00, 0x00, 0x00, 0xfb]);
pub const THERMAL_STATUS_GET: Frame = Frame::fixed(&[0xfa, 0x03, 0x08, 0x00, 0x00, 0x00, 0xfb]);
pub const DEVICE_SHUTDOWN: Frame = Frame::fixed(&[0xfa, 0x03, 0x03, 0x01, 0x01, 0x0a, 0xfb]);

pub const FAN_STOP: Frame = Frame::fixed(&[0xfa, 0x02, 0x00, 0x00, 0x00, 0x00, 0xfb]);
pub const FAN_HALF: Frame = Frame::fixed(&[0xfa, 0x02, 0x00, 0x01, 0x00, 0x00, 0xfb]);
pub const FAN_FULL: Frame = Frame::fixed(&[0xfa, 0x02, 0x00, 0x02, 0x00, 0x00, 0xfb]);

pub const APR_ENABLE: Frame = Frame::fixed(&[0xfa, 0x03, 0x02, 0x01, 0x00, 0x00, 0xfb]);
pub const APR_DISABLE: Frame = Frame::fixed(&[0xfa, 0x03, 0x02, 0x00, 0x00, 0x00, 0xfb]);
pub const APR_STATUS: Frame = Frame::fixed(&[0xfa, 0x03, 0x02, 0x02, 0x00, 0x00, 0xfb]);

pub const PWR_LED_ON: Frame = Frame::fixed(&[0xfa, 0x03, 0x06, 0x01, 0x00, 0x01, 0xfb]);
pub const PWR_LED_OFF: Frame = Frame::fixed(&[0xfa, 0x03, 0x06, 0x00, 0x00, 0x01, 0xfb]);
pub const PWR_LED_BLINK: Frame = Frame::fixed(&[0xfa, 0x03, 0x06, 0x02, 0x00, 0x01, 0xfb]);

pub const WOL_ENABLE: Frame = Frame::fixed(&[0xfa, 0x03, 0x0a, 0x01, 0x00, 0x00, 0xfb]);
pub const WOL_DISABLE: Frame = Frame::fixed(&[0xfa, 0x03, 0x0a, 0x00, 0x00, 0x00, 0xfb]);
pub const WOL_STATUS: Frame = Frame::fixed(&[0xfa, 0x03, 0x0a, 0x02, 0x00, 0x00, 0xfb]);

// Build the shutdown request carrying the given delay
pub fn shutdown_frame(delay: u8) -> Result<Frame, FrameError> {
    DEVICE_SHUTDOWN.with_byte(SHUTDOWN_DELAY_OFFSET, delay)
}

// Raw sensor code to Celsius conversion table of the enclosure thermistor
pub const THERMAL_TABLE: [u8; 204] = [
    0x74, 0x73, 0x72, 0x71, 0x70, 0x6F, 0x6E, 0x6D, 0x6C, 0x6B,
    0x6A, 0x69, 0x68, 0x67, 0x66, 0x65, 0x64, 0x63, 0x62, 0x61,
    0x60, 0x5F, 0x5E, 0x5D, 0x5C, 0x5B, 0x5A, 0x59, 0x58, 0x57,
    0x56, 0x55, 0x54, 0x53, 0x52, 0x51, 0x50, 0x4F, 0x4E, 0x4D,
    0x4C, 0x4B, 0x4A, 0x49, 0x48, 0x47, 0x46, 0x45, 0x44, 0x43,
    0x42, 0x41, 0x41, 0x40, 0x3F, 0x3E, 0x3E, 0x3D, 0x3D, 0x3C,
    0x3B, 0x3A, 0x3A, 0x39, 0x38, 0x38, 0x37, 0x36, 0x36, 0x35,
    0x34, 0x34, 0x33, 0x33, 0x32, 0x31, 0x31, 0x30, 0x30, 0x2F,
    0x2F, 0x2E, 0x2E, 0x2D, 0x2C, 0x2C, 0x2B, 0x2B, 0x2A, 0x2A,
    0x29, 0x29, 0x28, 0x28, 0x27, 0x27, 0x27, 0x26, 0x26, 0x25,
    0x25, 0x24, 0x24, 0x23, 0x23, 0x22, 0x22, 0x21, 0x21, 0x21,
    0x20, 0x20, 0x1F, 0x1F, 0x1E, 0x1E, 0x1E, 0x1D, 0x1D, 0x1C,
    0x1C, 0x1B, 0x1B, 0x1B, 0x1B, 0x1A, 0x19, 0x19, 0x19, 0x18,
    0x18, 0x17, 0x17, 0x25, 0x1B, 0x1B, 0x19, 0x19, 0x19, 0x18,
    0x18, 0x17, 0x17, 0x16, 0x16, 0x16, 0x15, 0x15, 0x14, 0x14,
    0x14, 0x13, 0x13, 0x12, 0x12, 0x12, 0x11, 0x11, 0x10, 0x10,
    0x10, 0x0F, 0x0F, 0x0E, 0x0E, 0x0E, 0x0D, 0x0D, 0x0C, 0x0C,
    0x0C, 0x0B, 0x0B, 0x0A, 0x0A, 0x09, 0x09, 0x09, 0x08, 0x08,
    0x07, 0x07, 0x07, 0x06, 0x06, 0x05, 0x05, 0x04, 0x04, 0x04,
    0x03, 0x03, 0x02, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];
