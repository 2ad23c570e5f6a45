//! # CRSF Link Library
//!
//! Bidirectional CRSF (Crossfire) link between a companion computer and a
//! flight controller.
//!
//! This library decodes the telemetry frames the flight controller streams
//! over a serial port and encodes the 16-channel RC frames sent back, driven
//! by JSON control lines from a host process.

pub mod config;
pub mod control;
pub mod crsf;
pub mod error;
pub mod link;
pub mod serial;
pub mod telemetry;
