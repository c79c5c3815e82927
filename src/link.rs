use std::{io, thread, time::Duration};

use serialport::SerialPort;
use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::{
    config_manager::SerialConfig,
    protocol::{ACK, Frame, FrameError, HEADER_LEN, MAX_FRAME_LEN, STOP_MAGIC},
};

// Upper bound on the stale bytes discarded before a request
const DRAIN_LIMIT: usize = 256;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(
        "Response header mismatch at byte {position}: expected {expected:#04x}, got {received:?}"
    )]
    HeaderMismatch {
        position: usize,
        expected: u8,
        received: Option<u8>,
        response: Vec<u8>,
    },
    #[error("Response exceeds the {capacity} bytes frame buffer")]
    FrameTooLong { capacity: usize },
    #[error("Expected ACK but received {0}")]
    AckMismatch(Frame),
    #[error("Malformed frame: {0}")]
    Frame(#[from] FrameError),
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Failed to open serial port \"{path}\": {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("Serial I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

// Byte level access to the MCU channel
pub trait Port {
    // Number of bytes already waiting to be read
    fn pending(&mut self) -> io::Result<u32>;

    fn read_byte(&mut self) -> io::Result<u8>;

    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
}

impl Port for Box<dyn SerialPort> {
    fn pending(&mut self) -> io::Result<u32> {
        (**self).bytes_to_read().map_err(io::Error::from)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];

        match io::Read::read(self, &mut byte)? {
            0 => Err(io::ErrorKind::UnexpectedEof.into()),
            _ => Ok(byte[0]),
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        io::Write::write_all(self, &[byte])?;
        io::Write::flush(self)
    }
}

// A single command/response cycle with the MCU
pub trait McuLink {
    // Send the request and wait for the answer. When a response is expected
    // the data frame is returned, otherwise the MCU only acknowledges
    fn exchange(
        &mut self,
        request: &Frame,
        expect_response: bool,
    ) -> Result<Option<Frame>, LinkError>;
}

#[derive(Debug, Clone, Copy)]
pub struct LinkTiming {
    // Pause after every transmitted byte, the MCU drops faster bursts
    pub inter_byte_delay: Duration,

    // Pause between a data frame and the trailing ACK
    pub settle_delay: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            inter_byte_delay: Duration::from_micros(100),
            settle_delay: Duration::from_millis(20),
        }
    }
}

pub struct SerialLink<P: Port> {
    port: P,
    timing: LinkTiming,
}

impl SerialLink<Box<dyn SerialPort>> {
    // Open the serial device described by the configuration
    pub fn open(config: &SerialConfig) -> Result<Self, LinkError> {
        debug!("Opening serial port {:?}", config.port);

        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()
            .map_err(|source| LinkError::Open {
                path: config.port.clone(),
                source,
            })?;

        Ok(Self::new(port))
    }
}

impl<P: Port> SerialLink<P> {
    pub fn new(port: P) -> Self {
        Self::with_timing(port, LinkTiming::default())
    }

    pub fn with_timing(port: P, timing: LinkTiming) -> Self {
        Self { port, timing }
    }

    // Discard whatever a previous, possibly incomplete, exchange left behind
    fn clear(&mut self) -> Result<(), LinkError> {
        let mut drained = 0;

        while drained < DRAIN_LIMIT && self.port.pending()? > 0 {
            self.port.read_byte()?;
            drained += 1;
        }

        if drained > 0 {
            debug!("Cleared {drained} stale bytes from the serial port");
        }

        Ok(())
    }

    fn transmit(&mut self, request: &Frame) -> Result<(), LinkError> {
        for (i, &byte) in request.as_bytes().iter().enumerate() {
            if let Err(err) = self.port.write_byte(byte) {
                error!("Error writing byte {i}: {byte:#04x}: {err}");
                return Err(err.into());
            }

            if !self.timing.inter_byte_delay.is_zero() {
                thread::sleep(self.timing.inter_byte_delay);
            }

            if byte == STOP_MAGIC {
                break;
            }
        }

        Ok(())
    }

    // Read bytes until the stop marker, bounded by the largest frame
    fn receive(&mut self) -> Result<Frame, LinkError> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let mut len = 0;

        loop {
            let byte = self.port.read_byte()?;

            if len == buf.len() {
                debug!("Frame buffer overflow after {:02X?}", buf);
                return Err(ProtocolError::FrameTooLong {
                    capacity: MAX_FRAME_LEN,
                }
                .into());
            }

            buf[len] = byte;
            len += 1;

            if byte == STOP_MAGIC {
                break;
            }
        }

        trace!("Received {:02X?}", &buf[..len]);

        let frame = Frame::new(&buf[..len]).map_err(ProtocolError::from)?;

        Ok(frame)
    }
}

impl<P: Port> McuLink for SerialLink<P> {
    fn exchange(
        &mut self,
        request: &Frame,
        expect_response: bool,
    ) -> Result<Option<Frame>, LinkError> {
        self.clear()?;
        self.transmit(request)?;

        let reply = self.receive()?;

        if !expect_response {
            // The only frame is the ACK
            check_header(&ACK, &reply)
                .map_err(|_| ProtocolError::AckMismatch(reply))?;

            return Ok(None);
        }

        check_header(request, &reply)?;

        if !self.timing.settle_delay.is_zero() {
            thread::sleep(self.timing.settle_delay);
        }

        let ack = self.receive()?;
        if let Err(err) = check_header(&ACK, &ack) {
            warn!("Response to {request} not acknowledged: {err}");
        }

        Ok(Some(reply))
    }
}

// Compare the leading bytes of a response with the ones of the frame it
// answers, the tail of the response is command specific and not checked
pub fn check_header(expected: &Frame, received: &Frame) -> Result<(), ProtocolError> {
    let mismatch = (0..HEADER_LEN)
        .map(|i| (i, expected.get(i), received.get(i)))
        .find(|(_, exp, got)| exp != got);

    let Some((position, exp, got)) = mismatch else {
        return Ok(());
    };

    error!("Response byte {position} is {got:?}, expected {exp:?}");
    for i in 0..expected.len().max(received.len()) {
        debug!(
            "Byte {i}: received {:?} expected {:?}",
            received.get(i),
            expected.get(i)
        );
    }

    Err(ProtocolError::HeaderMismatch {
        position,
        expected: exp.unwrap_or_default(),
        received: got,
        response: received.as_bytes().to_vec(),
    })
}
