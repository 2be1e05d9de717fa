use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::errors::{Error, Result};

/// Linux sysfs locations that commonly expose the battery charge, probed in order.
const SYSFS_CAPACITY_PATHS: [&str; 3] = [
    "/sys/class/power_supply/BAT0/capacity",
    "/sys/class/power_supply/BAT1/capacity",
    "/sys/class/power_supply/battery/capacity",
];

/// A source of the host battery charge percentage.
pub trait BatteryProbe {
    /// Returns the current charge as a 0-100 percentage. One attempt, no retries.
    fn read(&self) -> Result<u8>;
}

/// Selects the probe matching the host operating system.
pub fn probe_for_host() -> Result<Box<dyn BatteryProbe>> {
    match std::env::consts::OS {
        "windows" => Ok(Box::new(WmiProbe)),
        "linux" => Ok(Box::new(SysfsProbe::default())),
        "macos" => Ok(Box::new(PmsetProbe)),
        other => Err(Error::UnsupportedPlatform(other.to_string())),
    }
}

/// Windows: queries WMI for the estimated remaining charge via powershell.
pub struct WmiProbe;

impl BatteryProbe for WmiProbe {
    fn read(&self) -> Result<u8> {
        let stdout = run_command(
            "powershell",
            &[
                "-Command",
                "(Get-WmiObject win32_battery).EstimatedChargeRemaining",
            ],
        )?;
        parse_percent(stdout.trim())
    }
}

/// Linux: reads the capacity file of the first battery found under sysfs.
pub struct SysfsProbe {
    candidates: Vec<PathBuf>,
}

impl Default for SysfsProbe {
    fn default() -> Self {
        Self::with_candidates(SYSFS_CAPACITY_PATHS.iter().copied().map(PathBuf::from).collect())
    }
}

impl SysfsProbe {
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }
}

impl BatteryProbe for SysfsProbe {
    fn read(&self) -> Result<u8> {
        for path in &self.candidates {
            match fs::read_to_string(path) {
                Ok(raw) => return parse_percent(raw.trim()),
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }
        Err(Error::BatteryRead(
            "no battery information found in expected Linux locations".to_string(),
        ))
    }
}

/// macOS: parses the percentage out of `pmset -g batt` output.
pub struct PmsetProbe;

impl BatteryProbe for PmsetProbe {
    fn read(&self) -> Result<u8> {
        let stdout = run_command("pmset", &["-g", "batt"])?;
        parse_pmset_output(&stdout)
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::BatteryRead(format!("failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(Error::BatteryRead(format!(
            "{} exited with {}",
            program, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_percent(raw: &str) -> Result<u8> {
    let value: u8 = raw
        .parse()
        .map_err(|e| Error::BatteryRead(format!("unparsable battery level {:?}: {}", raw, e)))?;

    if value > 100 {
        return Err(Error::BatteryRead(format!(
            "battery level {} out of range 0-100",
            value
        )));
    }

    Ok(value)
}

/// Finds the first line containing a percent sign and extracts the digits
/// immediately before it.
fn parse_pmset_output(raw: &str) -> Result<u8> {
    for line in raw.lines() {
        if let Some(pos) = line.find('%') {
            let digits: Vec<char> = line[..pos]
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if digits.is_empty() {
                continue;
            }
            let percent: String = digits.into_iter().rev().collect();
            return parse_percent(&percent);
        }
    }

    Err(Error::BatteryRead(
        "no battery percentage in pmset output".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_existing_capacity_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let bat0 = dir.path().join("bat0_capacity");
        let bat1 = dir.path().join("bat1_capacity");
        fs::write(&bat0, "57\n").unwrap();
        fs::write(&bat1, "12\n").unwrap();

        let probe =
            SysfsProbe::with_candidates(vec![dir.path().join("missing"), bat0, bat1]);

        assert_eq!(probe.read().unwrap(), 57);
    }

    #[test]
    fn test_no_capacity_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = SysfsProbe::with_candidates(vec![dir.path().join("missing")]);

        assert!(matches!(probe.read(), Err(Error::BatteryRead(_))));
    }

    #[test]
    fn test_unparsable_capacity_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let capacity = dir.path().join("capacity");
        fs::write(&capacity, "not-a-number\n").unwrap();

        let probe = SysfsProbe::with_candidates(vec![capacity]);

        assert!(probe.read().is_err());
    }

    #[test]
    fn test_percent_over_100_is_rejected() {
        assert!(parse_percent("120").is_err());
        assert_eq!(parse_percent("100").unwrap(), 100);
        assert_eq!(parse_percent("0").unwrap(), 0);
    }

    #[test]
    fn test_pmset_output_parsing() {
        let raw = "Now drawing from 'Battery Power'\n \
                   -InternalBattery-0 (id=4653155)\t85%; discharging; 4:22 remaining present: true\n";
        assert_eq!(parse_pmset_output(raw).unwrap(), 85);
    }

    #[test]
    fn test_pmset_output_without_percentage_is_an_error() {
        assert!(parse_pmset_output("Now drawing from 'AC Power'\n").is_err());
    }
}
