use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::{GPIO_BUTTON_POWER, START_MAGIC, STOP_MAGIC};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse Json configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Daemon configuration, built once at startup and shared read only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub fan: FanConfig,
    pub button: ButtonConfig,

    // Additional attempts after a failed exchange
    pub retries: u32,

    // Delay parameter forwarded to the MCU with the shutdown request
    pub delay_shutdown: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,

    // Deadline for every single byte read
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    pub poll_time_secs: u64,

    // Thresholds and hysteresis in Celsius
    pub temp_low: i32,
    pub temp_high: i32,
    pub hysteresis: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub enabled: bool,
    pub poll_time_ms: u64,

    // sysfs GPIO directory, the value is read from {gpio_dir}/gpio{gpio}/value
    pub gpio_dir: PathBuf,
    pub gpio: u32,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fan = &self.fan;

        if fan.temp_low >= fan.temp_high {
            return Err(ConfigError::Invalid(format!(
                "temp_low ({}) must be lower than temp_high ({})",
                fan.temp_low, fan.temp_high
            )));
        }

        if fan.hysteresis < 0 {
            return Err(ConfigError::Invalid(format!(
                "hysteresis ({}) can't be negative",
                fan.hysteresis
            )));
        }

        if fan.poll_time_secs == 0 {
            return Err(ConfigError::Invalid(
                "fan poll time must be at least one second".to_string(),
            ));
        }

        if self.button.poll_time_ms == 0 {
            return Err(ConfigError::Invalid(
                "button poll time must be greater than zero".to_string(),
            ));
        }

        // The delay travels inside the frame
        if self.delay_shutdown == START_MAGIC || self.delay_shutdown == STOP_MAGIC {
            return Err(ConfigError::Invalid(format!(
                "delay_shutdown can't be {:#04x}, it is a frame marker",
                self.delay_shutdown
            )));
        }

        Ok(())
    }

    // Render the configuration in the format accepted by load_config
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FanConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_time_secs)
    }
}

impl ButtonConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_time_ms)
    }

    pub fn value_path(&self) -> PathBuf {
        self.gpio_dir
            .join(format!("gpio{}", self.gpio))
            .join("value")
    }
}

// Load the configuration from the given Json file. A missing file is not
// an error, the default configuration is used instead
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    debug!("Parsing config file at: {:?}", path);

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("Configuration file {:?} not found, using defaults", path);

            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config: Config = serde_json::from_reader(BufReader::new(file))?;
    config.validate()?;

    Ok(config)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            fan: FanConfig::default(),
            button: ButtonConfig::default(),
            retries: 5,
            delay_shutdown: 30,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyS1".to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 500,
        }
    }
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            poll_time_secs: 15,
            temp_low: 45,
            temp_high: 50,
            hysteresis: 2,
        }
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_time_ms: 1000,
            gpio_dir: PathBuf::from("/sys/class/gpio"),
            gpio: GPIO_BUTTON_POWER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "fan": { "temp_high": 55 }, "retries": 2 }"#,
        )
        .unwrap();

        assert_eq!(config.fan.temp_high, 55);
        assert_eq!(config.fan.temp_low, 45);
        assert_eq!(config.retries, 2);
        assert_eq!(config.serial, SerialConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_value_path() {
        let button = ButtonConfig::default();

        assert_eq!(
            button.value_path(),
            PathBuf::from("/sys/class/gpio/gpio29/value")
        );
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.fan.temp_low = 60;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_marker_as_delay() {
        let mut config = Config::default();
        config.delay_shutdown = STOP_MAGIC;

        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("dns320ld-no-such-config.json");

        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir()
            .join(format!("dns320ld-bad-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();

        let result = load_config(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn printed_config_loads_back() {
        let mut config = Config::default();
        config.serial.port = "/dev/ttyUSB0".to_string();
        config.fan.hysteresis = 3;
        config.button.enabled = false;

        let path = std::env::temp_dir()
            .join(format!("dns320ld-printed-config-{}.json", std::process::id()));
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        let loaded = load_config(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap(), config);
    }
}
