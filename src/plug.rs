use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_tuyapi::tuyadevice::TuyaDevice;
use rust_tuyapi::Payload;
use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{Error, Result};

/// Data point index of the relay on Tuya outlet devices.
const SWITCH_DP: &str = "1";

/// Remote on/off control of a single outlet. The concrete vendor client is
/// injected behind this trait so tests can substitute a fake device.
pub trait PlugSwitch {
    fn turn_on(&self) -> Result<()>;
    fn turn_off(&self) -> Result<()>;
}

/// Issues the on/off command and applies the failure policy: transport and
/// device errors are logged and swallowed unless strict mode is on, while
/// configuration errors (missing key, missing id/ip, bad address) always
/// propagate to the caller.
pub fn set_plug_power(plug: &dyn PlugSwitch, on: bool, strict: bool) -> Result<()> {
    let action = if on { "ON" } else { "OFF" };
    let result = if on { plug.turn_on() } else { plug.turn_off() };

    match result {
        Ok(()) => {
            info!("Plug successfully switched to {} mode", action);
            Ok(())
        }
        Err(Error::DeviceCommand(msg)) if !strict => {
            warn!("Error controlling the plug: {}", msg);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// A Tuya smart plug reached over the local network. A fresh session is
/// negotiated for every command; nothing is kept between runs.
pub struct TuyaPlug {
    config: Config,
}

impl TuyaPlug {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn send(&self, on: bool) -> Result<()> {
        let config = &self.config;

        // Preconditions come before any network activity.
        if config.device_key.is_empty() {
            return Err(Error::MissingCredential);
        }
        if config.device_id.is_empty() || config.device_ip.is_empty() {
            return Err(Error::MissingDeviceLocation);
        }

        let address: IpAddr = config.device_ip.parse()?;

        info!(
            "Connecting to device: ID={}, IP={}",
            config.device_id, config.device_ip
        );

        let device = TuyaDevice::create(
            &format!("ver{}", config.device_version),
            Some(config.device_key.as_str()),
            address,
        )
        .map_err(|e| Error::DeviceCommand(e.to_string()))?;

        device
            .set(switch_payload(&config.device_id, on), 0)
            .map_err(|e| Error::DeviceCommand(e.to_string()))
    }
}

impl PlugSwitch for TuyaPlug {
    fn turn_on(&self) -> Result<()> {
        self.send(true)
    }

    fn turn_off(&self) -> Result<()> {
        self.send(false)
    }
}

fn switch_payload(device_id: &str, on: bool) -> Payload {
    let mut dps = HashMap::new();
    dps.insert(SWITCH_DP.to_string(), json!(on));

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or_default();

    Payload::new(
        device_id.to_string(),
        Some(device_id.to_string()),
        None,
        Some(now),
        dps,
    )
}
