//! Client for the Matej networked lamp.
//!
//! The lamp exposes a tiny HTTP API: `POST /chngConfig` to change brightness,
//! white temperature and auxiliary RGB, and `GET /getConfig` to read them back.
//! [`LampClient`] wraps it with local state tracking and unit conversion.
//!
//! ```no_run
//! use matej_light::LampClient;
//!
//! # fn main() -> matej_light::Result<()> {
//! let mut lamp = LampClient::new("192.168.1.15")?;
//! lamp.set_brightness(100)?;
//! lamp.set_temperature(4000)?;
//! lamp.refresh()?;
//! println!("{:?}", lamp.state());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod conversion;
pub mod error;
pub mod state;
pub mod transport;

pub use client::LampClient;
pub use conversion::{clamp, kelvin_to_percent_warm, map_value, percent_warm_to_kelvin, KELVIN_MAX, KELVIN_MIN};
pub use error::{LampError, Result};
pub use state::{AuxRgb, LampState};
pub use transport::{ConfigChange, DeviceConfig, HttpTransport, Transport, DEFAULT_TIMEOUT};
