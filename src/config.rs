use clap::Parser;

use crate::errors::{Error, Result};

/// Run configuration, loaded once at startup. Every option is backed by an
/// environment variable; the matching flags exist mostly for ad-hoc testing.
#[derive(Debug, Clone, Parser)]
#[command(name = "powerguard", about = "Switches a Tuya smart plug based on the host battery level")]
pub struct Config {
    /// Tuya device id of the smart plug
    #[arg(long, env = "DEVICE_ID", default_value = "")]
    pub device_id: String,

    /// Local network IP address of the smart plug
    #[arg(long, env = "DEVICE_IP", default_value = "")]
    pub device_ip: String,

    /// Pre-shared local key authenticating commands to the plug
    #[arg(long, env = "DEVICE_KEY", default_value = "", hide_env_values = true)]
    pub device_key: String,

    /// Battery percentage below which the plug is turned on
    #[arg(long, env = "LOW_THRESHOLD", default_value_t = 40)]
    pub low_threshold: u8,

    /// Battery percentage above which the plug is turned off
    #[arg(long, env = "HIGH_THRESHOLD", default_value_t = 80)]
    pub high_threshold: u8,

    /// Tuya local protocol version spoken by the plug
    #[arg(long, env = "DEVICE_VERSION", default_value_t = 3.4)]
    pub device_version: f64,

    /// Exit non-zero on battery or device errors instead of logging
    /// them and reporting success
    #[arg(long, env = "STRICT_ERRORS")]
    pub strict_errors: bool,
}

impl Config {
    /// Checks the threshold invariant. Device id/ip/key may stay empty here;
    /// they are only required once a plug command is actually attempted.
    pub fn validate(&self) -> Result<()> {
        if self.low_threshold > 100 || self.high_threshold > 100 {
            return Err(Error::Config(format!(
                "thresholds must be percentages in 0-100, got {} and {}",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.low_threshold >= self.high_threshold {
            return Err(Error::Config(format!(
                "LOW_THRESHOLD ({}) must be below HIGH_THRESHOLD ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("powerguard").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.low_threshold, 40);
        assert_eq!(config.high_threshold, 80);
        assert_eq!(config.device_version, 3.4);
        assert!(!config.strict_errors);
    }

    #[test]
    fn test_non_numeric_threshold_is_rejected() {
        assert!(parse(&["--low-threshold", "abc"]).is_err());
    }

    #[test]
    fn test_inverted_thresholds_fail_validation() {
        let config = parse(&["--low-threshold", "80", "--high-threshold", "40"]).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_equal_thresholds_fail_validation() {
        let config = parse(&["--low-threshold", "50", "--high-threshold", "50"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_thresholds_pass_validation() {
        let config = parse(&[]).unwrap();
        assert!(config.validate().is_ok());
    }
}
