//! # RC Channel State Module
//!
//! Holds the 16 stick values transmitted to the flight controller and packs
//! them into CRSF RC channel payloads.
//!
//! ## Channel Assignments
//!
//! | Channel | Function |
//! |---------|----------|
//! | CH1 | Roll |
//! | CH2 | Pitch |
//! | CH3 | Throttle |
//! | CH4 | Yaw |
//! | CH5-CH16 | AUX1-AUX12 |
//!
//! ## Value Ranges
//!
//! - Stick values: 0-100 (percent of travel)
//! - CRSF output: 7-1976 by default, see [`ChannelRange`]
//!
//! ## Usage
//!
//! ```
//! use crsf_link::control::channels::{channels, ChannelRange, ChannelState, STICK_MAXIMUM};
//!
//! let mut state = ChannelState::new(ChannelRange::default());
//! state.set_channel(channels::THROTTLE, STICK_MAXIMUM)?;
//!
//! let payload = state.pack();
//! assert_eq!(payload.len(), 22);
//! # Ok::<(), crsf_link::error::CrsfLinkError>(())
//! ```

use crate::crsf::encoder::pack_channels;
use crate::crsf::protocol::{RcChannelsPayload, CRSF_CHANNEL_VALUE_MAX, CRSF_NUM_CHANNELS};
use crate::error::{CrsfLinkError, Result};

/// Lowest stick value
pub const STICK_MINIMUM: i32 = 0;

/// Highest stick value
pub const STICK_MAXIMUM: i32 = 100;

/// Neutral stick value
pub const STICK_CENTER: i32 = (STICK_MINIMUM + STICK_MAXIMUM) / 2;

/// Default lower bound of the transmitted channel range
pub const DEFAULT_RC_MIN: u16 = 7;

/// Default upper bound of the transmitted channel range
pub const DEFAULT_RC_MAX: u16 = 1976;

/// Number of auxiliary channels after the four flight axes
pub const NUM_AUX_CHANNELS: usize = 12;

/// Channel indices for semantic access.
pub mod channels {
    /// Roll (aileron)
    pub const ROLL: usize = 0;
    /// Pitch (elevator)
    pub const PITCH: usize = 1;
    /// Throttle
    pub const THROTTLE: usize = 2;
    /// Yaw (rudder)
    pub const YAW: usize = 3;
    /// First auxiliary channel, AUX1..AUX12 follow consecutively
    pub const AUX1: usize = 4;
}

/// CRSF values that stick minimum and maximum are mapped onto
///
/// The protocol's nominal span is 172-1811; the default here is the wider
/// 7-1976. Set through the `[channels]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRange {
    pub min: u16,
    pub max: u16,
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_RC_MIN,
            max: DEFAULT_RC_MAX,
        }
    }
}

impl ChannelRange {
    /// Maps a stick value (0-100) linearly onto this range, truncating.
    ///
    /// Out-of-range stick values are clamped; [`ChannelState`] never stores them.
    #[inline]
    pub fn to_rc_value(&self, stick: i32) -> u16 {
        let stick = stick.clamp(STICK_MINIMUM, STICK_MAXIMUM);
        let span = u32::from(self.max.saturating_sub(self.min));
        let travel = (stick - STICK_MINIMUM) as u32;
        let scaled = span * travel / (STICK_MAXIMUM - STICK_MINIMUM) as u32;

        (u32::from(self.min) + scaled).min(u32::from(CRSF_CHANNEL_VALUE_MAX)) as u16
    }
}

/// Current stick position of all 16 channels.
///
/// Starts with every channel centered except throttle, which starts at the
/// bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    values: [i32; CRSF_NUM_CHANNELS],
    range: ChannelRange,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new(ChannelRange::default())
    }
}

impl ChannelState {
    /// Creates the power-on channel state.
    #[must_use]
    pub fn new(range: ChannelRange) -> Self {
        let mut values = [STICK_CENTER; CRSF_NUM_CHANNELS];
        values[channels::THROTTLE] = STICK_MINIMUM;

        Self { values, range }
    }

    /// Sets one channel to a stick value.
    ///
    /// # Errors
    ///
    /// - `InvalidChannel` if `index` is 16 or more
    /// - `ChannelValueOutOfRange` if `value` is outside 0-100; the stored
    ///   value is left untouched
    pub fn set_channel(&mut self, index: usize, value: i32) -> Result<()> {
        if index >= CRSF_NUM_CHANNELS {
            return Err(CrsfLinkError::InvalidChannel(index));
        }

        if !(STICK_MINIMUM..=STICK_MAXIMUM).contains(&value) {
            return Err(CrsfLinkError::ChannelValueOutOfRange {
                channel: index,
                value,
                min: STICK_MINIMUM,
                max: STICK_MAXIMUM,
            });
        }

        self.values[index] = value;
        Ok(())
    }

    /// Stick value of one channel, `None` past the last channel.
    pub fn channel(&self, index: usize) -> Option<i32> {
        self.values.get(index).copied()
    }

    /// CRSF channel values for the current sticks.
    #[must_use]
    pub fn rc_values(&self) -> [u16; CRSF_NUM_CHANNELS] {
        self.values.map(|value| self.range.to_rc_value(value))
    }

    /// Packs the current sticks into a 22-byte RC channels payload.
    #[must_use]
    pub fn pack(&self) -> RcChannelsPayload {
        pack_channels(&self.rc_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::encoder::tests::unpack_channels;
    use crate::crsf::protocol::CRSF_RC_CHANNELS_PAYLOAD_SIZE;

    // ==================== Range Mapping Tests ====================

    #[test]
    fn test_range_endpoints() {
        let range = ChannelRange::default();
        assert_eq!(range.to_rc_value(STICK_MINIMUM), 7);
        assert_eq!(range.to_rc_value(STICK_MAXIMUM), 1976);
    }

    #[test]
    fn test_range_center_truncates() {
        // 7 + 1969 * 50 / 100 = 991.5 → 991
        assert_eq!(ChannelRange::default().to_rc_value(STICK_CENTER), 991);
    }

    #[test]
    fn test_range_custom_bounds() {
        let range = ChannelRange { min: 172, max: 1811 };
        assert_eq!(range.to_rc_value(0), 172);
        assert_eq!(range.to_rc_value(100), 1811);
        assert_eq!(range.to_rc_value(50), 991);
    }

    #[test]
    fn test_range_clamps_input() {
        let range = ChannelRange::default();
        assert_eq!(range.to_rc_value(-20), 7);
        assert_eq!(range.to_rc_value(500), 1976);
    }

    #[test]
    fn test_range_is_monotonic() {
        let range = ChannelRange::default();
        for stick in STICK_MINIMUM..STICK_MAXIMUM {
            assert!(range.to_rc_value(stick) < range.to_rc_value(stick + 1));
        }
    }

    // ==================== Channel State Tests ====================

    #[test]
    fn test_initial_state() {
        let state = ChannelState::default();
        assert_eq!(state.channel(channels::THROTTLE), Some(STICK_MINIMUM));
        for index in [channels::ROLL, channels::PITCH, channels::YAW] {
            assert_eq!(state.channel(index), Some(STICK_CENTER));
        }
        for aux in 0..NUM_AUX_CHANNELS {
            assert_eq!(state.channel(channels::AUX1 + aux), Some(STICK_CENTER));
        }
    }

    #[test]
    fn test_set_channel_boundaries() {
        let mut state = ChannelState::default();

        assert!(state.set_channel(channels::YAW, STICK_MINIMUM).is_ok());
        assert_eq!(state.channel(channels::YAW), Some(STICK_MINIMUM));

        assert!(state.set_channel(channels::YAW, STICK_MAXIMUM).is_ok());
        assert_eq!(state.channel(channels::YAW), Some(STICK_MAXIMUM));
    }

    #[test]
    fn test_set_channel_out_of_range() {
        let mut state = ChannelState::default();

        for value in [STICK_MINIMUM - 1, STICK_MAXIMUM + 1] {
            match state.set_channel(channels::ROLL, value) {
                Err(CrsfLinkError::ChannelValueOutOfRange { channel, value: v, .. }) => {
                    assert_eq!(channel, channels::ROLL);
                    assert_eq!(v, value);
                }
                other => panic!("Expected ChannelValueOutOfRange, got: {:?}", other),
            }
        }

        // Rejected writes leave the state alone
        assert_eq!(state.channel(channels::ROLL), Some(STICK_CENTER));
    }

    #[test]
    fn test_set_channel_invalid_index() {
        let mut state = ChannelState::default();
        assert!(matches!(
            state.set_channel(16, STICK_CENTER),
            Err(CrsfLinkError::InvalidChannel(16))
        ));
        assert_eq!(state.channel(16), None);
    }

    // ==================== Packing Tests ====================

    #[test]
    fn test_pack_default_state() {
        let state = ChannelState::default();
        let payload = state.pack();
        assert_eq!(payload.len(), CRSF_RC_CHANNELS_PAYLOAD_SIZE);

        let unpacked = unpack_channels(&payload);
        let mut expected = [991u16; CRSF_NUM_CHANNELS];
        expected[channels::THROTTLE] = 7;

        for (got, want) in unpacked.iter().zip(expected.iter()) {
            assert!((*got as i32 - *want as i32).abs() <= 1, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_pack_reflects_set_channel() {
        let mut state = ChannelState::default();
        state.set_channel(channels::THROTTLE, STICK_MAXIMUM).unwrap();
        state.set_channel(channels::AUX1 + 11, STICK_MINIMUM).unwrap();

        let unpacked = unpack_channels(&state.pack());
        assert_eq!(unpacked[channels::THROTTLE], 1976);
        assert_eq!(unpacked[15], 7);
        assert_eq!(unpacked, state.rc_values());
    }

    #[test]
    fn test_pack_is_idempotent() {
        let mut state = ChannelState::default();
        state.set_channel(channels::PITCH, 73).unwrap();

        let first = state.pack();
        let second = state.pack();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pack_changes_with_state() {
        let mut state = ChannelState::default();
        let before = state.pack();
        state.set_channel(channels::ROLL, 10).unwrap();
        assert_ne!(before, state.pack());
    }

    // ==================== Constants Tests ====================

    #[test]
    fn test_stick_constants() {
        assert_eq!(STICK_MINIMUM, 0);
        assert_eq!(STICK_MAXIMUM, 100);
        assert_eq!(STICK_CENTER, 50);
    }

    #[test]
    fn test_channel_indices() {
        assert_eq!(channels::ROLL, 0);
        assert_eq!(channels::PITCH, 1);
        assert_eq!(channels::THROTTLE, 2);
        assert_eq!(channels::YAW, 3);
        assert_eq!(channels::AUX1, 4);
        assert_eq!(channels::AUX1 + NUM_AUX_CHANNELS, CRSF_NUM_CHANNELS);
    }
}
