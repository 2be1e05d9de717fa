use tracing::info;

use crate::battery::BatteryProbe;
use crate::config::Config;
use crate::errors::Result;
use crate::plug::{set_plug_power, PlugSwitch};

/// Outcome of comparing a battery reading against the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugAction {
    TurnOn,
    TurnOff,
    Keep,
}

/// Picks the plug action for a battery level. Both comparisons are strict:
/// a reading equal to either threshold leaves the plug alone.
pub fn decide(level: u8, low: u8, high: u8) -> PlugAction {
    if level < low {
        PlugAction::TurnOn
    } else if level > high {
        PlugAction::TurnOff
    } else {
        PlugAction::Keep
    }
}

/// Reads the battery once and switches the plug according to the thresholds.
/// Battery failures propagate to the caller; no plug command is issued then.
pub fn run(config: &Config, probe: &dyn BatteryProbe, plug: &dyn PlugSwitch) -> Result<()> {
    let level = probe.read()?;
    info!("Battery level: {}%", level);

    match decide(level, config.low_threshold, config.high_threshold) {
        PlugAction::TurnOn => {
            info!(
                "Battery level below threshold ({}%). Turning plug ON.",
                config.low_threshold
            );
            set_plug_power(plug, true, config.strict_errors)
        }
        PlugAction::TurnOff => {
            info!(
                "Battery level above threshold ({}%). Turning plug OFF.",
                config.high_threshold
            );
            set_plug_power(plug, false, config.strict_errors)
        }
        PlugAction::Keep => {
            info!(
                "Battery level normal ({}%-{}%). Maintaining current state.",
                config.low_threshold, config.high_threshold
            );
            Ok(())
        }
    }
}
