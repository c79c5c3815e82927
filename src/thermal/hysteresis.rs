use crate::{config_manager::FanConfig, thermal::FanLevel};

// Thresholds of the five bands fan control decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low: i32,
    pub high: i32,

    // Width of the dead band below each threshold
    pub hysteresis: i32,
}

impl Thresholds {
    pub fn new(low: i32, high: i32, hysteresis: i32) -> Self {
        Self {
            low,
            high,
            hysteresis,
        }
    }

    // Return the fan level that should be in force for the given temperature.
    // Inside the dead bands the current level is kept when it is already
    // acceptable, this keeps the fan from toggling around a threshold.
    // None is only returned while the level is still unknown and the
    // temperature gives no reason to pick one.
    pub fn next_fan_level(
        &self,
        temp: i32,
        current: Option<FanLevel>,
    ) -> Option<FanLevel> {
        if temp < self.low.saturating_sub(self.hysteresis) {
            Some(FanLevel::Stopped)
        } else if temp < self.low {
            // Only demote, never start the fan in this band
            match current {
                Some(FanLevel::Full) => Some(FanLevel::Half),
                other => other,
            }
        } else if temp < self.high.saturating_sub(self.hysteresis) {
            Some(FanLevel::Half)
        } else if temp < self.high {
            // Only promote, never slow a full speed fan in this band
            match current {
                Some(FanLevel::Full) => Some(FanLevel::Full),
                _ => Some(FanLevel::Half),
            }
        } else {
            Some(FanLevel::Full)
        }
    }
}

impl From<&FanConfig> for Thresholds {
    fn from(config: &FanConfig) -> Self {
        Self::new(config.temp_low, config.temp_high, config.hysteresis)
    }
}
