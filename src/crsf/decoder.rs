//! # CRSF Packet Decoder
//!
//! Validates CRSF frames and decodes telemetry packets (GPS, Vario,
//! Attitude, Barometric Altitude, Link Statistics, Battery).
//!
//! All field offsets below are relative to the start of the frame
//! (byte 0 = sync), and multi-byte fields are big-endian.

use bytes::Bytes;

use super::crc::crc8_dvb_s2;
use super::protocol::*;
use crate::error::{CrsfLinkError, Result};

/// Frame bytes needed to decode each telemetry type, trailing CRC included
const GPS_FRAME_SIZE: usize = 19;
const VARIO_FRAME_SIZE: usize = 6;
const ATTITUDE_FRAME_SIZE: usize = 10;
const BARO_ALT_FRAME_SIZE: usize = 8;
const LINK_STATS_FRAME_SIZE: usize = 8;
const BATTERY_FRAME_SIZE: usize = 12;

/// Check the CRC of a complete frame
///
/// The CRC covers Type + Payload, i.e. bytes `[2..len - 1]`, and is
/// compared against the last byte. Frames shorter than 4 bytes never
/// validate.
///
/// # Examples
///
/// ```
/// use crsf_link::crsf::decoder::validate_frame;
/// use crsf_link::crsf::encoder::encode_rc_frame;
///
/// let frame = encode_rc_frame(&[0u8; 22]);
/// assert!(validate_frame(&frame));
/// ```
pub fn validate_frame(frame: &[u8]) -> bool {
    if frame.len() < CRSF_MIN_FRAME_SIZE {
        return false;
    }

    let (body, crc) = frame.split_at(frame.len() - 1);
    crc8_dvb_s2(&body[2..]) == crc[0]
}

/// Parse one complete frame out of a byte window
///
/// Stricter than the stream framer: the length byte must describe exactly
/// `data.len()` bytes and the CRC must match.
///
/// # Errors
///
/// - `FrameTooShort` / `FrameTooLong` if the window or its length byte
///   disagree with a legal frame size
/// - `ChecksumMismatch` if the trailing CRC is wrong
pub fn decode_frame(data: &[u8]) -> Result<Frame> {
    if data.len() < CRSF_MIN_FRAME_SIZE {
        return Err(CrsfLinkError::FrameTooShort(data.len()));
    }
    if data.len() > CRSF_MAX_FRAME_SIZE {
        return Err(CrsfLinkError::FrameTooLong(data.len()));
    }

    let declared = data[1] as usize + 2;
    if declared > data.len() {
        return Err(CrsfLinkError::FrameTooShort(data.len()));
    }
    if declared < data.len() {
        return Err(CrsfLinkError::FrameTooLong(data.len()));
    }

    let expected = crc8_dvb_s2(&data[2..data.len() - 1]);
    let actual = data[data.len() - 1];
    if expected != actual {
        return Err(CrsfLinkError::ChecksumMismatch { expected, actual });
    }

    Ok(Frame::from_checked(Bytes::copy_from_slice(data)))
}

/// Decode a validated frame into a telemetry record
///
/// # Returns
///
/// * `Ok(Some(record))` - Frame carried one of the decoded telemetry types
/// * `Ok(None)` - Frame type has no decoding action (heartbeat, device info,
///   config, unknown types, ...)
///
/// # Errors
///
/// Returns error if a decodable type arrives in a frame too short for its fields
pub fn decode_telemetry(frame: &Frame) -> Result<Option<TelemetryRecord>> {
    let data = frame.as_bytes();

    let record = match frame.packet_type() {
        Some(PacketType::Gps) => TelemetryRecord::Gps(decode_gps(data)?),
        Some(PacketType::Vario) => TelemetryRecord::Vario(decode_vario(data)?),
        Some(PacketType::Attitude) => TelemetryRecord::Attitude(decode_attitude(data)?),
        Some(PacketType::BaroAlt) => TelemetryRecord::BaroAltitude(decode_baro_altitude(data)?),
        Some(PacketType::LinkStatistics) => {
            TelemetryRecord::LinkStatistics(decode_link_statistics(data)?)
        }
        Some(PacketType::BatterySensor) => TelemetryRecord::Battery(decode_battery_sensor(data)?),
        _ => return Ok(None),
    };

    Ok(Some(record))
}

/// Decode GPS telemetry packet
///
/// | Bytes | Field | Scale |
/// |-------|-------|-------|
/// | 3..7 | latitude | i32 / 1e7 |
/// | 7..11 | longitude | i32 / 1e7 |
/// | 11..13 | ground speed | i16 / 36 |
/// | 13..15 | heading | i16 / 100 |
/// | 15..17 | altitude | i16 - 1000 |
/// | 17 | satellites | u8 |
pub fn decode_gps(data: &[u8]) -> Result<GpsData> {
    ensure_len(data, GPS_FRAME_SIZE, "GPS")?;

    Ok(GpsData {
        latitude: f64::from(read_i32(data, 3)) / 1e7,
        longitude: f64::from(read_i32(data, 7)) / 1e7,
        ground_speed: f64::from(read_i16(data, 11)) / 36.0,
        heading: f64::from(read_i16(data, 13)) / 100.0,
        altitude: i32::from(read_i16(data, 15)) - 1000,
        satellites: data[17],
    })
}

/// Decode Vario telemetry packet (vertical speed, i16 / 10)
pub fn decode_vario(data: &[u8]) -> Result<VarioData> {
    ensure_len(data, VARIO_FRAME_SIZE, "Vario")?;

    Ok(VarioData {
        vertical_speed: f64::from(read_i16(data, 3)) / 10.0,
    })
}

/// Decode Attitude telemetry packet (pitch, roll, yaw as i16 / 10000 radians)
pub fn decode_attitude(data: &[u8]) -> Result<AttitudeData> {
    ensure_len(data, ATTITUDE_FRAME_SIZE, "Attitude")?;

    Ok(AttitudeData {
        pitch: f64::from(read_i16(data, 3)) / 10_000.0,
        roll: f64::from(read_i16(data, 5)) / 10_000.0,
        yaw: f64::from(read_i16(data, 7)) / 10_000.0,
    })
}

/// Decode Barometric Altitude telemetry packet (i32 / 100 meters)
pub fn decode_baro_altitude(data: &[u8]) -> Result<BaroAltitude> {
    ensure_len(data, BARO_ALT_FRAME_SIZE, "Baro altitude")?;

    Ok(BaroAltitude {
        altitude: f64::from(read_i32(data, 3)) / 100.0,
    })
}

/// Decode Link Statistics telemetry packet
///
/// RSSI and SNR are single bytes reinterpreted as two's complement.
pub fn decode_link_statistics(data: &[u8]) -> Result<LinkStatistics> {
    ensure_len(data, LINK_STATS_FRAME_SIZE, "Link stats")?;

    Ok(LinkStatistics {
        rssi_1: data[3] as i8,
        rssi_2: data[4] as i8,
        link_quality: data[5],
        snr: data[6] as i8,
    })
}

/// Decode Battery Sensor telemetry packet
///
/// Voltage and current are i16 / 10. The consumed capacity is assembled as
/// `b7 << 16 | b8 << 7 | b9` (7-bit shift on the middle byte, not 8).
pub fn decode_battery_sensor(data: &[u8]) -> Result<BatterySensor> {
    ensure_len(data, BATTERY_FRAME_SIZE, "Battery sensor")?;

    let capacity_used =
        (u32::from(data[7]) << 16) | (u32::from(data[8]) << 7) | u32::from(data[9]);

    Ok(BatterySensor {
        voltage: f64::from(read_i16(data, 3)) / 10.0,
        current: f64::from(read_i16(data, 5)) / 10.0,
        capacity_used,
        remaining_percent: data[10],
    })
}

fn ensure_len(data: &[u8], needed: usize, packet: &'static str) -> Result<()> {
    if data.len() < needed {
        return Err(CrsfLinkError::PayloadTooShort {
            packet,
            actual: data.len(),
            needed,
        });
    }
    Ok(())
}

#[inline]
fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
