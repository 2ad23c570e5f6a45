//! # CRSF Protocol Constants and Types
//!
//! Core protocol definitions for CRSF (Crossfire) communication.

use bytes::Bytes;

use crate::error::{CrsfLinkError, Result};

/// CRSF frame sync byte (always 0xC8)
pub const CRSF_SYNC_BYTE: u8 = 0xC8;

/// Smallest complete frame: sync(1) + length(1) + type(1) + crc(1)
pub const CRSF_MIN_FRAME_SIZE: usize = 4;

/// Largest complete frame, sync and length bytes included
pub const CRSF_MAX_FRAME_SIZE: usize = 64;

/// Maximum CRSF payload size
/// Frame structure: sync(1) + length(1) + type(1) + payload(N) + crc(1)
/// Maximum frame size is 64 bytes, so max payload = 64 - 4 = 60 bytes
pub const CRSF_MAX_PAYLOAD_SIZE: usize = CRSF_MAX_FRAME_SIZE - CRSF_MIN_FRAME_SIZE;

/// RC channels payload size (22 bytes for 16 channels × 11 bits)
pub const CRSF_RC_CHANNELS_PAYLOAD_SIZE: usize = 22;

/// RC channels frame length (type + payload + crc)
pub const CRSF_RC_CHANNELS_FRAME_LENGTH: u8 = 0x18; // 24 bytes

/// Complete RC channels frame size on the wire
pub const CRSF_RC_CHANNELS_FRAME_SIZE: usize = 26;

/// Number of RC channels
pub const CRSF_NUM_CHANNELS: usize = 16;

/// Bits per packed channel value
pub const CRSF_CHANNEL_BITS: u32 = 11;

/// Largest value an 11-bit channel can carry
pub const CRSF_CHANNEL_VALUE_MAX: u16 = 0x7FF;

/// Packed RC channels payload
pub type RcChannelsPayload = [u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE];

/// CRSF frame types known to this link
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Gps = 0x02,
    Vario = 0x07,
    BatterySensor = 0x08,
    BaroAlt = 0x09,
    Heartbeat = 0x0B,
    VideoTransmitter = 0x0F,
    LinkStatistics = 0x14,
    RcChannelsPacked = 0x16,
    Attitude = 0x1E,
    FlightMode = 0x21,
    DeviceInfo = 0x29,
    ConfigRead = 0x2C,
    ConfigWrite = 0x2D,
    Command = 0x32,
    RadioId = 0x3A,
}

impl PacketType {
    /// Look up a frame type byte, `None` for types this link does not know
    pub fn from_u8(value: u8) -> Option<Self> {
        let packet_type = match value {
            0x02 => Self::Gps,
            0x07 => Self::Vario,
            0x08 => Self::BatterySensor,
            0x09 => Self::BaroAlt,
            0x0B => Self::Heartbeat,
            0x0F => Self::VideoTransmitter,
            0x14 => Self::LinkStatistics,
            0x16 => Self::RcChannelsPacked,
            0x1E => Self::Attitude,
            0x21 => Self::FlightMode,
            0x29 => Self::DeviceInfo,
            0x2C => Self::ConfigRead,
            0x2D => Self::ConfigWrite,
            0x32 => Self::Command,
            0x3A => Self::RadioId,
            _ => return None,
        };

        Some(packet_type)
    }

    /// Wire value of this type
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A complete CRSF frame as received or sent on the wire
///
/// Layout: `[sync, length, type, ...payload, crc]`, where `length` counts
/// the bytes from `type` through `crc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Wrap raw frame bytes
    ///
    /// # Errors
    ///
    /// Returns error if the byte count is outside 4..=64. CRC and the
    /// length field are not checked here.
    pub fn new(bytes: Bytes) -> Result<Self> {
        if bytes.len() < CRSF_MIN_FRAME_SIZE {
            return Err(CrsfLinkError::FrameTooShort(bytes.len()));
        }
        if bytes.len() > CRSF_MAX_FRAME_SIZE {
            return Err(CrsfLinkError::FrameTooLong(bytes.len()));
        }

        Ok(Self { bytes })
    }

    /// Wrap bytes whose size is already known to be within 4..=64
    pub(crate) fn from_checked(bytes: Bytes) -> Self {
        debug_assert!((CRSF_MIN_FRAME_SIZE..=CRSF_MAX_FRAME_SIZE).contains(&bytes.len()));
        Self { bytes }
    }

    /// Raw frame type byte
    pub fn frame_type(&self) -> u8 {
        self.bytes[2]
    }

    /// Frame type, if known
    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::from_u8(self.frame_type())
    }

    /// Length field (type + payload + crc)
    pub fn length(&self) -> u8 {
        self.bytes[1]
    }

    /// Bytes between type and crc
    pub fn payload(&self) -> &[u8] {
        &self.bytes[3..self.bytes.len() - 1]
    }

    /// Trailing CRC byte
    pub fn crc(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Whole frame, sync byte included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// GPS telemetry data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsData {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Ground speed (raw / 36)
    pub ground_speed: f64,

    /// Heading in degrees
    pub heading: f64,

    /// Altitude in meters
    pub altitude: i32,

    /// Number of satellites
    pub satellites: u8,
}

/// Variometer telemetry data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarioData {
    /// Vertical speed (raw / 10)
    pub vertical_speed: f64,
}

/// Attitude telemetry data, all angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeData {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// Barometric altitude telemetry data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroAltitude {
    /// Altitude in meters
    pub altitude: f64,
}

/// Link statistics telemetry data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStatistics {
    /// Uplink RSSI, antenna 1
    pub rssi_1: i8,

    /// Uplink RSSI, antenna 2
    pub rssi_2: i8,

    /// Uplink link quality (0-100%)
    pub link_quality: u8,

    /// Uplink SNR in dB
    pub snr: i8,
}

/// Battery sensor telemetry data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterySensor {
    /// Battery voltage in volts
    pub voltage: f64,

    /// Current draw in amperes
    pub current: f64,

    /// Capacity used in mAh
    pub capacity_used: u32,

    /// Battery remaining percentage (0-100%)
    pub remaining_percent: u8,
}

/// One decoded telemetry frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryRecord {
    Gps(GpsData),
    Vario(VarioData),
    Attitude(AttitudeData),
    BaroAltitude(BaroAltitude),
    LinkStatistics(LinkStatistics),
    Battery(BatterySensor),
}

impl TelemetryRecord {
    /// Discriminator written in the `type` field of telemetry output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gps(_) => "GPS",
            Self::Vario(_) => "VARIO",
            Self::Attitude(_) => "ATTITUDE",
            Self::BaroAltitude(_) => "BARO_ALTITUDE",
            Self::LinkStatistics(_) => "LINK_STATISTICS",
            Self::Battery(_) => "BATTERY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(CRSF_SYNC_BYTE, 0xC8);
        assert_eq!(CRSF_MAX_PAYLOAD_SIZE, 60);
        assert_eq!(CRSF_NUM_CHANNELS, 16);
        assert_eq!(
            CRSF_NUM_CHANNELS * CRSF_CHANNEL_BITS as usize,
            CRSF_RC_CHANNELS_PAYLOAD_SIZE * 8
        );
        assert_eq!(
            CRSF_RC_CHANNELS_FRAME_LENGTH as usize,
            CRSF_RC_CHANNELS_PAYLOAD_SIZE + 2
        );
    }

    #[test]
    fn test_packet_type_round_trip() {
        let all = [
            PacketType::Gps,
            PacketType::Vario,
            PacketType::BatterySensor,
            PacketType::BaroAlt,
            PacketType::Heartbeat,
            PacketType::VideoTransmitter,
            PacketType::LinkStatistics,
            PacketType::RcChannelsPacked,
            PacketType::Attitude,
            PacketType::FlightMode,
            PacketType::DeviceInfo,
            PacketType::ConfigRead,
            PacketType::ConfigWrite,
            PacketType::Command,
            PacketType::RadioId,
        ];

        for packet_type in all {
            assert_eq!(PacketType::from_u8(packet_type.as_u8()), Some(packet_type));
        }
    }

    #[test]
    fn test_packet_type_values() {
        assert_eq!(PacketType::Gps.as_u8(), 0x02);
        assert_eq!(PacketType::RcChannelsPacked.as_u8(), 0x16);
        assert_eq!(PacketType::Command.as_u8(), 0x32);
        assert_eq!(PacketType::RadioId.as_u8(), 0x3A);
    }

    #[test]
    fn test_packet_type_unknown() {
        assert_eq!(PacketType::from_u8(0x00), None);
        assert_eq!(PacketType::from_u8(0x1C), None);
        assert_eq!(PacketType::from_u8(0xFF), None);
    }

    #[test]
    fn test_frame_accessors() {
        let frame = Frame::new(Bytes::from_static(&[0xC8, 0x04, 0x07, 0x00, 0x0A, 0x5E])).unwrap();
        assert_eq!(frame.length(), 4);
        assert_eq!(frame.frame_type(), 0x07);
        assert_eq!(frame.packet_type(), Some(PacketType::Vario));
        assert_eq!(frame.payload(), &[0x00, 0x0A]);
        assert_eq!(frame.crc(), 0x5E);
        assert_eq!(frame.as_bytes().len(), 6);
    }

    #[test]
    fn test_frame_too_short() {
        let result = Frame::new(Bytes::from_static(&[0xC8, 0x02, 0x16]));
        assert!(matches!(result, Err(CrsfLinkError::FrameTooShort(3))));
    }

    #[test]
    fn test_frame_too_long() {
        let result = Frame::new(Bytes::from(vec![0u8; 65]));
        assert!(matches!(result, Err(CrsfLinkError::FrameTooLong(65))));
    }

    #[test]
    fn test_record_kind() {
        let record = TelemetryRecord::BaroAltitude(BaroAltitude { altitude: 12.5 });
        assert_eq!(record.kind(), "BARO_ALTITUDE");

        let record = TelemetryRecord::Battery(BatterySensor {
            voltage: 16.8,
            current: 1.0,
            capacity_used: 0,
            remaining_percent: 100,
        });
        assert_eq!(record.kind(), "BATTERY");
    }
}
