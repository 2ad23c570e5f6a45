//! # CRSF Packet Encoder
//!
//! Packs RC channel values and wraps payloads into CRSF frames.

use bytes::{BufMut, Bytes, BytesMut};

use super::crc::crc8_dvb_s2;
use super::protocol::*;
use crate::error::{CrsfLinkError, Result};

/// Encode a payload into a complete CRSF frame
///
/// Builds `[sync, len(payload) + 2, type, ...payload, crc]` where the CRC
/// covers Type + Payload.
///
/// # Errors
///
/// Returns error if the payload exceeds 60 bytes
pub fn encode_frame(packet_type: PacketType, payload: &[u8]) -> Result<Bytes> {
    if payload.len() > CRSF_MAX_PAYLOAD_SIZE {
        return Err(CrsfLinkError::PayloadTooLarge {
            size: payload.len(),
            max: CRSF_MAX_PAYLOAD_SIZE,
        });
    }

    let mut frame = BytesMut::with_capacity(payload.len() + CRSF_MIN_FRAME_SIZE);
    frame.put_u8(CRSF_SYNC_BYTE);
    frame.put_u8((payload.len() + 2) as u8);
    frame.put_u8(packet_type.as_u8());
    frame.put_slice(payload);

    let crc = crc8_dvb_s2(&frame[2..]);
    frame.put_u8(crc);

    Ok(frame.freeze())
}

/// Encode a packed RC channels payload into a complete CRSF frame
///
/// # Returns
///
/// * `Bytes` - Complete CRSF frame (26 bytes: sync + length + type + 22-byte payload + crc)
///
/// # Examples
///
/// ```
/// use crsf_link::crsf::encoder::encode_rc_frame;
///
/// let frame = encode_rc_frame(&[0u8; 22]);
/// assert_eq!(frame.len(), 26);
/// assert_eq!(&frame[..3], &[0xC8, 0x18, 0x16]);
/// ```
pub fn encode_rc_frame(payload: &RcChannelsPayload) -> Bytes {
    let mut frame = BytesMut::with_capacity(CRSF_RC_CHANNELS_FRAME_SIZE);
    frame.put_u8(CRSF_SYNC_BYTE);
    frame.put_u8(CRSF_RC_CHANNELS_FRAME_LENGTH);
    frame.put_u8(PacketType::RcChannelsPacked.as_u8());
    frame.put_slice(payload);

    let crc = crc8_dvb_s2(&frame[2..]);
    frame.put_u8(crc);

    frame.freeze()
}

/// Pack 16 channel values (11 bits each) into the 22-byte RC payload
///
/// Values are streamed LSB first through a bit accumulator: each value is
/// OR-ed in at the current bit offset, and every complete byte is flushed
/// as soon as 8 bits are pending.
///
/// ```text
/// Byte 0: Ch1[0:7]
/// Byte 1: Ch1[8:10] | Ch2[0:4]
/// Byte 2: Ch2[5:10] | Ch3[0:1]
/// ...
/// ```
///
/// Values wider than 11 bits are masked.
pub fn pack_channels(values: &[u16; CRSF_NUM_CHANNELS]) -> RcChannelsPayload {
    let mut payload = [0u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE];
    let mut accumulator: u32 = 0;
    let mut pending_bits: u32 = 0;
    let mut index = 0;

    for &value in values {
        accumulator |= u32::from(value & CRSF_CHANNEL_VALUE_MAX) << pending_bits;
        pending_bits += CRSF_CHANNEL_BITS;

        while pending_bits >= 8 {
            payload[index] = (accumulator & 0xFF) as u8;
            index += 1;
            accumulator >>= 8;
            pending_bits -= 8;
        }
    }

    // 16 × 11 bits is a whole number of bytes, so nothing is left over
    if pending_bits > 0 && index < payload.len() {
        payload[index] = (accumulator & 0xFF) as u8;
    }

    payload
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crsf::decoder::validate_frame;

    /// Test-only inverse of [`pack_channels`]
    pub(crate) fn unpack_channels(payload: &[u8]) -> [u16; CRSF_NUM_CHANNELS] {
        let mut values = [0u16; CRSF_NUM_CHANNELS];
        for (channel, value) in values.iter_mut().enumerate() {
            let mut bits = 0u16;
            for bit in 0..CRSF_CHANNEL_BITS as usize {
                let bit_index = channel * CRSF_CHANNEL_BITS as usize + bit;
                if (payload[bit_index / 8] >> (bit_index % 8)) & 1 == 1 {
                    bits |= 1 << bit;
                }
            }
            *value = bits;
        }
        values
    }

    #[test]
    fn test_encode_rc_frame_length() {
        let frame = encode_rc_frame(&[0u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE]);

        // Frame should be 26 bytes: sync(1) + length(1) + type(1) + payload(22) + crc(1)
        assert_eq!(frame.len(), CRSF_RC_CHANNELS_FRAME_SIZE);
    }

    #[test]
    fn test_encode_rc_frame_structure() {
        let payload = pack_channels(&[991u16; CRSF_NUM_CHANNELS]);
        let frame = encode_rc_frame(&payload);

        assert_eq!(frame[0], CRSF_SYNC_BYTE);
        assert_eq!(frame[1], CRSF_RC_CHANNELS_FRAME_LENGTH);
        assert_eq!(frame[2], PacketType::RcChannelsPacked.as_u8());
        assert_eq!(&frame[3..25], &payload);
        assert_eq!(frame[25], crc8_dvb_s2(&frame[2..25]));
    }

    #[test]
    fn test_encode_rc_frame_validates() {
        let payloads = [
            [0u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE],
            [0xFFu8; CRSF_RC_CHANNELS_PAYLOAD_SIZE],
            pack_channels(&[7u16; CRSF_NUM_CHANNELS]),
            pack_channels(&[1976u16; CRSF_NUM_CHANNELS]),
        ];

        for payload in payloads.iter() {
            let frame = encode_rc_frame(payload);
            assert!(validate_frame(&frame), "frame failed validation: {:02X?}", &frame[..]);
        }
    }

    #[test]
    fn test_encode_rc_frame_matches_generic_encoder() {
        let payload = pack_channels(&[1500u16; CRSF_NUM_CHANNELS]);
        let generic = encode_frame(PacketType::RcChannelsPacked, &payload).unwrap();
        assert_eq!(encode_rc_frame(&payload), generic);
    }

    #[test]
    fn test_encode_frame_empty_payload() {
        let frame = encode_frame(PacketType::Heartbeat, &[]).unwrap();
        assert_eq!(frame.len(), CRSF_MIN_FRAME_SIZE);
        assert_eq!(frame[1], 2);
        assert_eq!(frame[3], crc8_dvb_s2(&[PacketType::Heartbeat.as_u8()]));
        assert!(validate_frame(&frame));
    }

    #[test]
    fn test_encode_frame_max_payload() {
        let frame = encode_frame(PacketType::Command, &[0xAA; CRSF_MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(frame.len(), CRSF_MAX_FRAME_SIZE);
        assert!(validate_frame(&frame));
    }

    #[test]
    fn test_encode_frame_payload_too_large() {
        let result = encode_frame(PacketType::Command, &[0u8; CRSF_MAX_PAYLOAD_SIZE + 1]);
        assert!(matches!(
            result,
            Err(CrsfLinkError::PayloadTooLarge { size: 61, max: 60 })
        ));
    }

    #[test]
    fn test_pack_channels_all_zeros() {
        let payload = pack_channels(&[0u16; CRSF_NUM_CHANNELS]);
        assert_eq!(payload, [0u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE]);
    }

    #[test]
    fn test_pack_channels_all_max() {
        // 16 channels × 11 bits = 176 bits = 22 bytes, all set
        let payload = pack_channels(&[CRSF_CHANNEL_VALUE_MAX; CRSF_NUM_CHANNELS]);
        assert_eq!(payload, [0xFFu8; CRSF_RC_CHANNELS_PAYLOAD_SIZE]);
    }

    #[test]
    fn test_pack_channels_single_channel() {
        let mut values = [0u16; CRSF_NUM_CHANNELS];
        values[0] = 0x7FF;

        let payload = pack_channels(&values);

        // Byte 0: bits 0-7, byte 1: bits 8-10
        assert_eq!(payload[0], 0xFF);
        assert_eq!(payload[1], 0x07);
        assert!(payload[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pack_channels_second_channel_offset() {
        let mut values = [0u16; CRSF_NUM_CHANNELS];
        values[1] = 0x001;

        let payload = pack_channels(&values);

        // Channel 2 starts at bit 11 → byte 1, bit 3
        assert_eq!(payload[1], 0x08);
    }

    #[test]
    fn test_pack_channels_masks_wide_values() {
        let mut values = [0u16; CRSF_NUM_CHANNELS];
        values[0] = 0xF800 | 0x001;

        let payload = pack_channels(&values);
        assert_eq!(payload[0], 0x01);
        assert_eq!(payload[1], 0x00);
    }

    #[test]
    fn test_pack_unpack_mixed_values() {
        let values: [u16; CRSF_NUM_CHANNELS] = [
            7, 991, 1976, 172, 992, 1811, 0, 2047, 1, 1024, 1500, 333, 1234, 42, 1900, 600,
        ];
        let payload = pack_channels(&values);
        assert_eq!(unpack_channels(&payload), values);
    }
}
