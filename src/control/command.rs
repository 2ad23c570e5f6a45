//! # External Control Commands
//!
//! Parses the JSON lines a host process writes to our stdin and applies
//! them to the [`ChannelState`].
//!
//! ## Line Format
//!
//! ```text
//! {"type": "set-throttle", "value": {"throttle": 0.25}}
//! {"type": "euler-angles", "value": {"yaw": 0.5, "pitch": 0.4, "roll": 0.6}}
//! {"type": "set-aux", "value": {"index": 0, "value": 1.0}}
//! ```
//!
//! Every number is a factor in 0.0-1.0 that is scaled onto the stick range
//! before it reaches [`ChannelState::set_channel`]. Fields may be omitted;
//! omitted fields leave their channel alone. Unrecognized `type` strings
//! are ignored.

use serde::Deserialize;
use tracing::debug;

use super::channels::{channels, ChannelState, STICK_MAXIMUM, STICK_MINIMUM};
use crate::error::{CrsfLinkError, Result};

/// Envelope shared by every control line
#[derive(Debug, Deserialize)]
struct ControlMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct ThrottleValue {
    throttle: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct EulerValue {
    yaw: Option<f64>,
    pitch: Option<f64>,
    roll: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuxValue {
    index: Option<usize>,
    value: Option<f64>,
}

/// One recognized control command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// `set-throttle`
    SetThrottle { throttle: Option<f64> },

    /// `euler-angles`
    EulerAngles {
        yaw: Option<f64>,
        pitch: Option<f64>,
        roll: Option<f64>,
    },

    /// `set-aux`; only applied when both fields are present
    SetAux {
        index: Option<usize>,
        value: Option<f64>,
    },
}

impl ControlCommand {
    /// Parses one control line
    ///
    /// # Returns
    ///
    /// * `Ok(Some(command))` - A recognized command
    /// * `Ok(None)` - A well-formed line with an unrecognized `type`
    ///
    /// # Errors
    ///
    /// Returns `MalformedControlLine` when the line is not JSON, lacks a
    /// `type`, or its `value` has the wrong shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use crsf_link::control::command::ControlCommand;
    ///
    /// let command = ControlCommand::parse(r#"{"type":"set-throttle","value":{"throttle":0.5}}"#)?;
    /// assert_eq!(command, Some(ControlCommand::SetThrottle { throttle: Some(0.5) }));
    /// # Ok::<(), crsf_link::error::CrsfLinkError>(())
    /// ```
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let message: ControlMessage = serde_json::from_str(line)
            .map_err(|e| CrsfLinkError::MalformedControlLine(e.to_string()))?;

        let command = match message.kind.as_str() {
            "set-throttle" => {
                let value: ThrottleValue = value_of(message.value)?;
                Self::SetThrottle {
                    throttle: value.throttle,
                }
            }
            "euler-angles" => {
                let value: EulerValue = value_of(message.value)?;
                Self::EulerAngles {
                    yaw: value.yaw,
                    pitch: value.pitch,
                    roll: value.roll,
                }
            }
            "set-aux" => {
                let value: AuxValue = value_of(message.value)?;
                Self::SetAux {
                    index: value.index,
                    value: value.value,
                }
            }
            other => {
                debug!("Ignoring control message of type {:?}", other);
                return Ok(None);
            }
        };

        Ok(Some(command))
    }

    /// Applies the command to the channel state
    ///
    /// Channels are written in the order yaw, pitch, roll for
    /// `euler-angles`; a failure stops at the offending channel.
    ///
    /// # Errors
    ///
    /// - `MalformedControlLine` for a non-finite factor
    /// - `ChannelValueOutOfRange` for a factor outside 0.0-1.0
    /// - `InvalidChannel` for an aux index past AUX12
    pub fn apply(&self, state: &mut ChannelState) -> Result<()> {
        match *self {
            Self::SetThrottle { throttle } => {
                if let Some(factor) = throttle {
                    state.set_channel(channels::THROTTLE, factor_to_stick_value(factor)?)?;
                }
            }
            Self::EulerAngles { yaw, pitch, roll } => {
                for (channel, factor) in [
                    (channels::YAW, yaw),
                    (channels::PITCH, pitch),
                    (channels::ROLL, roll),
                ] {
                    if let Some(factor) = factor {
                        state.set_channel(channel, factor_to_stick_value(factor)?)?;
                    }
                }
            }
            Self::SetAux {
                index: Some(index),
                value: Some(factor),
            } => {
                let channel = channels::AUX1
                    .checked_add(index)
                    .ok_or(CrsfLinkError::InvalidChannel(index))?;
                state.set_channel(channel, factor_to_stick_value(factor)?)?;
            }
            Self::SetAux { .. } => {}
        }

        Ok(())
    }
}

/// Parses and applies one control line; blank lines are a no-op
pub fn apply_control_line(line: &str, state: &mut ChannelState) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match ControlCommand::parse(line)? {
        Some(command) => command.apply(state),
        None => Ok(()),
    }
}

/// Scales a 0.0-1.0 factor onto the stick range, truncating toward zero
///
/// Factors outside 0.0-1.0 map outside 0-100 and are left for
/// [`ChannelState::set_channel`] to reject.
pub fn factor_to_stick_value(factor: f64) -> Result<i32> {
    if !factor.is_finite() {
        return Err(CrsfLinkError::MalformedControlLine(format!(
            "non-finite factor {}",
            factor
        )));
    }

    let stick = f64::from(STICK_MINIMUM) + factor * f64::from(STICK_MAXIMUM - STICK_MINIMUM);
    Ok(stick as i32)
}

fn value_of<T>(value: serde_json::Value) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(value).map_err(|e| CrsfLinkError::MalformedControlLine(e.to_string()))
}
