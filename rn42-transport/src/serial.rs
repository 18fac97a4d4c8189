//! UART transport over a real serial device
//!
//! The RN-42 ships at 9600 baud 8N1 and that is what the driver speaks;
//! changing the module's baud is a configuration action the host never
//! takes on its own.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serialport::ClearBuffer;
use tracing::debug;

use crate::error::TransportError;
use crate::{BoxedTransport, Transport};

/// Factory-default UART rate of the module.
pub const BAUD_RATE: u32 = 9600;

/// Blocking read timeout on the OS handle. Kept short so a single
/// `read_byte` call never stalls the caller for long; the line reader
/// owns the real response deadline.
const READ_POLL: Duration = Duration::from_millis(10);

/// Serial transport over a UART device node.
pub struct UartPort {
    handle: Mutex<Box<dyn serialport::SerialPort>>,
    name: String,
}

impl UartPort {
    /// Open `path` at the module's fixed line settings.
    pub fn open(path: &str) -> Result<BoxedTransport, TransportError> {
        let handle = serialport::new(path, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_POLL)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => TransportError::PortNotFound(path.to_string()),
                _ => TransportError::from(e),
            })?;
        debug!(port = path, baud = BAUD_RATE, "serial port opened");
        Ok(Arc::new(Self {
            handle: Mutex::new(handle),
            name: path.to_string(),
        }))
    }
}

#[async_trait]
impl Transport for UartPort {
    async fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut handle = self.handle.lock();
        handle.write_all(bytes)?;
        handle.flush()?;
        Ok(())
    }

    async fn read_byte(&self) -> Result<Option<u8>, TransportError> {
        let mut buf = [0u8; 1];
        let result = self.handle.lock().read(&mut buf);
        match result {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(None)
            }
            Err(e) => Err(TransportError::from(e)),
        }
    }

    async fn discard_input(&self) -> Result<(), TransportError> {
        self.handle.lock().clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn port_name(&self) -> &str {
        &self.name
    }
}
