//! # Serial Communication Module
//!
//! Owns the UART link to the flight controller.
//!
//! This module handles:
//! - Opening the configured port (or trying the usual ones) at 8N1
//! - Splitting the port into independent read and write halves
//! - Closing the port once, after both link activities have stopped

use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{CrsfLinkError, Result};

/// Device paths tried when no port is configured (in order of preference)
pub const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/serial0", // Raspberry Pi primary UART alias
    "/dev/ttyAMA0", // Raspberry Pi PL011 UART
    "/dev/ttyACM0", // USB CDC devices
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// Serial link to the flight controller
pub struct CrsfSerial {
    /// Serial port handle
    port: SerialStream,
    /// Device path (e.g., /dev/serial0)
    device_path: String,
}

impl std::fmt::Debug for CrsfSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrsfSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl CrsfSerial {
    /// Open the port named in the configuration
    ///
    /// An empty `port` tries each of [`DEFAULT_DEVICE_PATHS`].
    ///
    /// # Errors
    ///
    /// - `Serial` if the configured port cannot be opened
    /// - `SerialPortNotFound` if no default path opens
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_link::config::SerialConfig;
    /// use crsf_link::serial::CrsfSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = CrsfSerial::open(&SerialConfig::default())?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     serial.close().await;
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if config.port.is_empty() {
            return Self::open_with_paths(DEFAULT_DEVICE_PATHS, config.baud_rate);
        }

        let port = Self::open_port(&config.port, config.baud_rate)?;
        info!("Opened {} at {} baud", config.port, config.baud_rate);

        Ok(Self {
            port,
            device_path: config.port.clone(),
        })
    }

    /// Open the first of `paths` that works
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened {} at {} baud", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                }
            }
        }

        Err(CrsfLinkError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with CRSF settings (8N1, no flow control)
    fn open_port(path: &str, baud_rate: u32) -> Result<SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| CrsfLinkError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Borrow the port as separate read and write halves
    ///
    /// The halves can be driven concurrently; both must be dropped before
    /// [`close`](Self::close).
    pub fn split(&mut self) -> (ReadHalf<&mut SerialStream>, WriteHalf<&mut SerialStream>) {
        tokio::io::split(&mut self.port)
    }

    /// Flush pending output and release the port
    pub async fn close(mut self) {
        if let Err(e) = self.port.flush().await {
            warn!("Failed to flush {} on close: {}", self.device_path, e);
        }
        info!("Closed serial port {}", self.device_path);
    }

    /// Path of the opened device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
