//! # Link Activities
//!
//! The two long-running halves of the CRSF link.
//!
//! - [`run_inbound`] reads the serial port, frames and decodes telemetry and
//!   hands it to a [`TelemetrySink`].
//! - [`run_outbound`] applies control lines to the [`ChannelState`] and
//!   transmits RC channel frames, on every control line and at a fixed rate.
//!
//! The inbound side never returns `Ok`; it runs until the port fails or the
//! caller drops it. The outbound side returns `Ok` once control input ends,
//! which stops RC transmission.

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::control::channels::ChannelState;
use crate::control::command::apply_control_line;
use crate::crsf::decoder::decode_telemetry;
use crate::crsf::encoder::encode_rc_frame;
use crate::crsf::framer::{FramerEvent, StreamFramer};
use crate::error::{CrsfLinkError, Result};
use crate::telemetry::TelemetrySink;

/// Bytes requested from the port per read
const READ_CHUNK_SIZE: usize = 256;

/// Number of received frames between status log messages
pub const LOG_INTERVAL_FRAMES: u64 = 1000;

/// Number of transmitted frames between status log messages
pub const LOG_INTERVAL_PACKETS: u64 = 1000;

/// Running totals for the inbound side
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InboundStats {
    /// Frames that passed the CRC check
    pub frames: u64,
    /// Frames turned into telemetry records
    pub records: u64,
    /// Frames dropped for a bad CRC
    pub crc_errors: u64,
    /// Buffer resets after an impossible length byte
    pub desyncs: u64,
    /// Frames too short for their packet type
    pub decode_errors: u64,
}

/// Read, frame and decode telemetry until the port fails
///
/// # Errors
///
/// - `Serial` when the read fails or the port reports end of stream
/// - whatever the sink returns; sink failures end the loop
pub async fn run_inbound<R, S>(reader: &mut R, sink: &mut S) -> Result<()>
where
    R: AsyncRead + Unpin,
    S: TelemetrySink + ?Sized,
{
    let mut framer = StreamFramer::new();
    let mut stats = InboundStats::default();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    info!("Listening for telemetry");

    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| CrsfLinkError::Serial(format!("Failed to read from port: {}", e)))?;

        if n == 0 {
            info!("Telemetry totals: {:?}", stats);
            return Err(CrsfLinkError::Serial("serial port closed".to_string()));
        }

        framer.push(&chunk[..n]);
        while let Some(event) = framer.next_event() {
            handle_event(event, sink, &mut stats)?;
        }
    }
}

fn handle_event<S>(event: FramerEvent, sink: &mut S, stats: &mut InboundStats) -> Result<()>
where
    S: TelemetrySink + ?Sized,
{
    match event {
        FramerEvent::Frame(frame) => {
            stats.frames += 1;

            match decode_telemetry(&frame) {
                Ok(Some(record)) => {
                    sink.record(&record)?;
                    stats.records += 1;
                }
                Ok(None) => debug!("Skipping frame type 0x{:02X}", frame.frame_type()),
                Err(e) => {
                    stats.decode_errors += 1;
                    warn!("Dropping frame: {}", e);
                }
            }

            if stats.frames % LOG_INTERVAL_FRAMES == 0 {
                info!(
                    "Received {} frames ({} records, {} CRC errors, {} resyncs)",
                    stats.frames, stats.records, stats.crc_errors, stats.desyncs
                );
            }
        }
        FramerEvent::ChecksumMismatch(bytes) => {
            stats.crc_errors += 1;
            sink.checksum_mismatch(&bytes)?;
        }
        FramerEvent::Desync { declared_len, discarded } => {
            stats.desyncs += 1;
            debug!(
                "Length byte implies {} byte frame, discarded {} buffered bytes",
                declared_len, discarded
            );
        }
    }

    Ok(())
}

/// Apply control lines and transmit RC channel frames until control input ends
///
/// A frame goes out after every control line and on every `period` tick.
/// Lines that are not valid UTF-8 or not a valid command are skipped.
///
/// # Errors
///
/// - `Serial` when a frame cannot be written
/// - `Io` when reading control input fails
pub async fn run_outbound<C, W>(
    control: C,
    writer: &mut W,
    state: &mut ChannelState,
    period: Duration,
) -> Result<()>
where
    C: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = control.lines();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut packet_count: u64 = 0;

    info!("Transmitting RC channels every {:?}", period);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = apply_control_line(&line, state) {
                        warn!("Ignoring control line: {}", e);
                    }
                }
                Ok(None) => {
                    info!("Control input closed after {} RC channel frames", packet_count);
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Ignoring control line: {}", e);
                }
                Err(e) => return Err(e.into()),
            },
            _ = ticker.tick() => {}
        }

        send_channels(writer, state).await?;
        packet_count += 1;

        if packet_count % LOG_INTERVAL_PACKETS == 0 {
            info!("Sent {} RC channel frames", packet_count);
        }
    }
}

/// Pack the current channels into an RC frame and write it out
pub async fn send_channels<W>(writer: &mut W, state: &ChannelState) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_rc_frame(&state.pack());

    writer
        .write_all(&frame)
        .await
        .map_err(|e| CrsfLinkError::Serial(format!("Failed to write packet: {}", e)))?;

    writer
        .flush()
        .await
        .map_err(|e| CrsfLinkError::Serial(format!("Failed to flush serial port: {}", e)))?;

    Ok(())
}
