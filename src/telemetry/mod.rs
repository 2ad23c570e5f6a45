//! # Telemetry Module
//!
//! Emits decoded telemetry as JSON Lines.
//!
//! This module handles:
//! - The [`TelemetrySink`] seam between the inbound link and its output
//! - Formatting each record as one self-contained JSON object
//! - Rounding fields to the precision consumers expect
//! - Reporting frames that failed their CRC check

use std::io::Write;

use serde_json::{json, Value};
use tracing::warn;

use crate::crsf::protocol::TelemetryRecord;
use crate::error::Result;

/// Destination for decoded telemetry
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySink {
    /// Emit one decoded record
    fn record(&mut self, record: &TelemetryRecord) -> Result<()>;

    /// Report a frame that was dropped because its CRC did not match
    fn checksum_mismatch(&mut self, frame: &[u8]) -> Result<()>;
}

/// Writes one JSON object per line to any [`Write`] (stdout in the binary)
///
/// # Examples
///
/// ```
/// use crsf_link::crsf::protocol::{TelemetryRecord, VarioData};
/// use crsf_link::telemetry::{JsonLineSink, TelemetrySink};
///
/// let mut sink = JsonLineSink::new(Vec::new());
/// sink.record(&TelemetryRecord::Vario(VarioData { vertical_speed: -1.25 }))?;
///
/// let line = String::from_utf8(sink.into_inner()).unwrap();
/// assert_eq!(line, "{\"type\":\"VARIO\",\"verticalSpeed\":-1.3}\n");
/// # Ok::<(), crsf_link::error::CrsfLinkError>(())
/// ```
#[derive(Debug)]
pub struct JsonLineSink<W> {
    writer: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for JsonLineSink<W> {
    fn record(&mut self, record: &TelemetryRecord) -> Result<()> {
        let mut line = serde_json::to_vec(&to_json(record))?;
        line.push(b'\n');

        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }

    fn checksum_mismatch(&mut self, frame: &[u8]) -> Result<()> {
        warn!("CRC error: {}", hex_bytes(frame));
        Ok(())
    }
}

/// JSON representation of a record, `type` first
pub fn to_json(record: &TelemetryRecord) -> Value {
    let kind = record.kind();

    match record {
        TelemetryRecord::Gps(gps) => json!({
            "type": kind,
            "latitude": round_to(gps.latitude, 6),
            "longitude": round_to(gps.longitude, 6),
            "groundSpeed": round_to(gps.ground_speed, 1),
            "heading": round_to(gps.heading, 1),
            "altitude": gps.altitude,
            "satellites": gps.satellites,
        }),
        TelemetryRecord::Vario(vario) => json!({
            "type": kind,
            "verticalSpeed": round_to(vario.vertical_speed, 1),
        }),
        TelemetryRecord::Attitude(attitude) => json!({
            "type": kind,
            "pitch": round_to(attitude.pitch, 2),
            "roll": round_to(attitude.roll, 2),
            "yaw": round_to(attitude.yaw, 2),
        }),
        TelemetryRecord::BaroAltitude(baro) => json!({
            "type": kind,
            "altitude": round_to(baro.altitude, 2),
        }),
        TelemetryRecord::LinkStatistics(stats) => json!({
            "type": kind,
            "rssi1": stats.rssi_1,
            "rssi2": stats.rssi_2,
            "linkQuality": stats.link_quality,
            "snr": stats.snr,
        }),
        TelemetryRecord::Battery(battery) => json!({
            "type": kind,
            "voltage": round_to(battery.voltage, 2),
            "current": round_to(battery.current, 1),
            "mah": battery.capacity_used,
            "percentage": battery.remaining_percent,
        }),
    }
}

/// Space-separated lowercase hex, e.g. `c8 18 16`
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[inline]
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
