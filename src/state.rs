//! Last-known lamp state as tracked by the client.

use crate::conversion::KELVIN_MIN;
use serde::{Deserialize, Serialize};

/// Auxiliary color channels, each on the lamp's 0-100 scale (not 0-255)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AuxRgb {
    pub const OFF: AuxRgb = AuxRgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// State of the lamp in user-facing units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LampState {
    pub brightness: u8,   // 0-100
    pub temperature: u16, // 3000-5000 K
    pub aux_rgb: AuxRgb,
    /// Tracked locally; the lamp never reports it
    pub power: bool,
}

impl Default for LampState {
    fn default() -> Self {
        Self {
            brightness: 0,
            temperature: KELVIN_MIN,
            aux_rgb: AuxRgb::OFF,
            power: false,
        }
    }
}
