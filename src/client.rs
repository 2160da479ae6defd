//! Stateful client for a single lamp.
//!
//! Tracks the last-known state locally and converts between user-facing units
//! (percent brightness, Kelvin) and the lamp's raw config fields. State is
//! updated before each command is sent, so a failed command still leaves the
//! requested values in `state()`.

use crate::conversion::{clamp_kelvin, clamp_percent, kelvin_to_percent_warm, percent_warm_to_kelvin};
use crate::error::{LampError, Result};
use crate::state::{AuxRgb, LampState};
use crate::transport::{ConfigChange, DeviceConfig, HttpTransport, Transport};
use tracing::{debug, warn};

/// Client for one lamp reachable at `http://{host}`
#[derive(Debug)]
pub struct LampClient<T: Transport = HttpTransport> {
    host: String,
    post_url: String,
    get_url: String,
    transport: T,
    state: LampState,
    /// Copy of `state` taken by the last `turn_off`
    state_before_off: LampState,
}

impl LampClient<HttpTransport> {
    /// Create a client using HTTP with the default 2 second timeout
    pub fn new(host: &str) -> Result<Self> {
        Ok(Self::with_transport(host, HttpTransport::new()?))
    }
}

impl<T: Transport> LampClient<T> {
    /// Create a client over any transport. `host` is used verbatim.
    pub fn with_transport(host: &str, transport: T) -> Self {
        Self {
            host: host.to_string(),
            post_url: format!("http://{}/chngConfig", host),
            get_url: format!("http://{}/getConfig", host),
            transport,
            state: LampState::default(),
            state_before_off: LampState::default(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn post_url(&self) -> &str {
        &self.post_url
    }

    pub fn get_url(&self) -> &str {
        &self.get_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Last-known state
    pub fn state(&self) -> &LampState {
        &self.state
    }

    /// State saved by the last `turn_off`, restored by `turn_on`
    pub fn state_before_off(&self) -> &LampState {
        &self.state_before_off
    }

    /// Set brightness in percent (clamped to 0-100). Marks the lamp as on.
    pub fn set_brightness(&mut self, percent: i32) -> Result<()> {
        let percent = clamp_percent(percent);
        self.state.brightness = percent;

        // Firmware expects one less than the percentage; 0% goes out as -1
        self.send(&ConfigChange {
            brightness: Some(i16::from(percent) - 1),
            ..Default::default()
        })?;

        self.state.power = true;
        Ok(())
    }

    /// Set white color temperature in Kelvin (clamped to 3000-5000)
    pub fn set_temperature(&mut self, kelvin: i32) -> Result<()> {
        let kelvin = clamp_kelvin(kelvin);
        let percent_warm = kelvin_to_percent_warm(i32::from(kelvin));
        self.state.temperature = kelvin;

        self.send(&ConfigChange {
            white_temp: Some(percent_warm),
            ..Default::default()
        })
    }

    /// Set the auxiliary color, each channel clamped to 0-100
    pub fn set_aux_rgb(&mut self, r: i32, g: i32, b: i32) -> Result<()> {
        let rgb = AuxRgb::new(clamp_percent(r), clamp_percent(g), clamp_percent(b));
        self.state.aux_rgb = rgb;

        self.send(&ConfigChange {
            r: Some(rgb.r),
            g: Some(rgb.g),
            b: Some(rgb.b),
            ..Default::default()
        })
    }

    /// Turn the lamp off, remembering the current state for `turn_on`.
    /// The white temperature is left as is on the lamp.
    pub fn turn_off(&mut self) -> Result<()> {
        self.state_before_off = self.state.clone();

        self.send(&ConfigChange {
            brightness: Some(0),
            r: Some(0),
            g: Some(0),
            b: Some(0),
            ..Default::default()
        })?;

        self.state.power = false;
        debug!(host = %self.host, "Lamp turned off");
        Ok(())
    }

    /// Turn the lamp on, restoring brightness and aux color from before `turn_off`
    pub fn turn_on(&mut self) -> Result<()> {
        self.state = self.state_before_off.clone();
        let restored = self.state.clone();

        self.set_brightness(i32::from(restored.brightness))?;
        self.set_aux_rgb(
            i32::from(restored.aux_rgb.r),
            i32::from(restored.aux_rgb.g),
            i32::from(restored.aux_rgb.b),
        )?;

        self.state.power = true;
        debug!(host = %self.host, brightness = restored.brightness, "Lamp turned on");
        Ok(())
    }

    /// Read the lamp's config.
    ///
    /// The lamp does not report power, so the returned `power` is the locally
    /// tracked flag.
    pub fn get_status(&self) -> Result<LampState> {
        let config = self.fetch_config()?;

        Ok(LampState {
            brightness: clamp_percent(config.brightness),
            temperature: percent_warm_to_kelvin(config.white_temp),
            aux_rgb: AuxRgb::new(
                clamp_percent(config.r),
                clamp_percent(config.g),
                clamp_percent(config.b),
            ),
            power: self.state.power,
        })
    }

    /// Replace the local state with what the lamp reports
    pub fn refresh(&mut self) -> Result<()> {
        self.state = self.get_status()?;
        Ok(())
    }

    /// Whether the lamp answers a status read
    pub fn is_available(&self) -> bool {
        match self.get_status() {
            Ok(_) => true,
            Err(e) => {
                debug!(host = %self.host, error = %e, "Lamp not available");
                false
            }
        }
    }

    fn send(&self, change: &ConfigChange) -> Result<()> {
        let reply = self.transport.post(&self.post_url, change)?;
        let data = serde_json::to_string(change).unwrap_or_else(|_| format!("{:?}", change));

        if reply != "OK" {
            warn!(host = %self.host, %data, %reply, "Lamp rejected command");
            return Err(LampError::Communication(format!(
                "Command not successful. Data sent: {}",
                data
            )));
        }

        debug!(host = %self.host, %data, "Command sent");
        Ok(())
    }

    fn fetch_config(&self) -> Result<DeviceConfig> {
        let body = self.transport.get(&self.get_url)?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(host = %self.host, error = %e, "Could not decode lamp config");
            LampError::Communication(format!(
                "Could not decode received JSON data. Received was: {}",
                body
            ))
        })
    }
}
