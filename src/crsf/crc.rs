//! # CRC8-DVB-S2 Implementation
//!
//! CRC-8-DVB-S2 checksum calculation for CRSF protocol.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00
//!
//! Computed bit-serially; frames are at most 64 bytes so a lookup table
//! buys nothing here.

/// CRC-8-DVB-S2 polynomial
const CRC8_POLY: u8 = 0xD5;

/// Fold a single byte into a running CRC8-DVB-S2 accumulator
#[inline]
pub fn crc8_dvb_s2_update(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;

    for _ in 0..8 {
        if (crc & 0x80) != 0 {
            crc = (crc << 1) ^ CRC8_POLY;
        } else {
            crc <<= 1;
        }
    }

    crc
}

/// Calculate CRC8-DVB-S2 checksum
///
/// # Arguments
///
/// * `data` - Byte slice to calculate CRC for (Type + Payload)
///
/// # Returns
///
/// * `u8` - Calculated CRC8 checksum
///
/// # Examples
///
/// ```
/// use crsf_link::crsf::crc::crc8_dvb_s2;
///
/// assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
/// assert_eq!(crc8_dvb_s2(&[]), 0x00);
/// ```
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc8_dvb_s2_update(crc, byte))
}
