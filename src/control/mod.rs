//! # Control Module
//!
//! Outbound side of the link: the RC channel state and the external
//! commands that move it.
//!
//! This module handles:
//! - Holding the 16 stick values (0-100) and their power-on defaults
//! - Range checking every channel write
//! - Mapping sticks onto CRSF channel values and packing them
//! - Parsing JSON control lines from the host process

pub mod channels;
pub mod command;
