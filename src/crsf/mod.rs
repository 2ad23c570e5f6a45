//! # CRSF Protocol Module
//!
//! Implementation of the Crossfire (CRSF) protocol spoken between the
//! companion computer and the flight controller.
//!
//! This module handles:
//! - RC channels packet encoding (16 channels, 11-bit resolution)
//! - Telemetry packet decoding (GPS, Vario, Attitude, Baro, Link Stats, Battery)
//! - CRC8-DVB-S2 checksum calculation
//! - Frame synchronization and validation on the inbound byte stream

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod framer;
pub mod crc;
