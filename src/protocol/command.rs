use std::str::FromStr;

use thiserror::Error;

use crate::protocol::{
    APR_DISABLE, APR_ENABLE, APR_STATUS, DEVICE_READY, FAN_FULL, FAN_HALF,
    FAN_STOP, Frame, PWR_LED_BLINK, PWR_LED_OFF, PWR_LED_ON,
    THERMAL_STATUS_GET, WOL_DISABLE, WOL_ENABLE, WOL_STATUS,
};

#[derive(Debug, Error)]
#[error("Unknown MCU request \"{0}\"")]
pub struct UnknownRequest(pub String);

// Requests that can be sent to the MCU on demand from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuRequest {
    DeviceReady,
    Temperature,

    FanStop,
    FanHalf,
    FanFull,

    PowerLedOn,
    PowerLedOff,
    PowerLedBlink,

    PowerRecoveryEnable,
    PowerRecoveryDisable,
    PowerRecoveryStatus,

    WolEnable,
    WolDisable,
    WolStatus,
}

impl McuRequest {
    pub const ALL: [McuRequest; 14] = [
        Self::DeviceReady,
        Self::Temperature,
        Self::FanStop,
        Self::FanHalf,
        Self::FanFull,
        Self::PowerLedOn,
        Self::PowerLedOff,
        Self::PowerLedBlink,
        Self::PowerRecoveryEnable,
        Self::PowerRecoveryDisable,
        Self::PowerRecoveryStatus,
        Self::WolEnable,
        Self::WolDisable,
        Self::WolStatus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceReady => "device-ready",
            Self::Temperature => "temperature",
            Self::FanStop => "fan-stop",
            Self::FanHalf => "fan-half",
            Self::FanFull => "fan-full",
            Self::PowerLedOn => "power-led-on",
            Self::PowerLedOff => "power-led-off",
            Self::PowerLedBlink => "power-led-blink",
            Self::PowerRecoveryEnable => "power-recovery-enable",
            Self::PowerRecoveryDisable => "power-recovery-disable",
            Self::PowerRecoveryStatus => "power-recovery-status",
            Self::WolEnable => "wol-enable",
            Self::WolDisable => "wol-disable",
            Self::WolStatus => "wol-status",
        }
    }

    pub fn frame(&self) -> Frame {
        match self {
            Self::DeviceReady => DEVICE_READY,
            Self::Temperature => THERMAL_STATUS_GET,
            Self::FanStop => FAN_STOP,
            Self::FanHalf => FAN_HALF,
            Self::FanFull => FAN_FULL,
            Self::PowerLedOn => PWR_LED_ON,
            Self::PowerLedOff => PWR_LED_OFF,
            Self::PowerLedBlink => PWR_LED_BLINK,
            Self::PowerRecoveryEnable => APR_ENABLE,
            Self::PowerRecoveryDisable => APR_DISABLE,
            Self::PowerRecoveryStatus => APR_STATUS,
            Self::WolEnable => WOL_ENABLE,
            Self::WolDisable => WOL_DISABLE,
            Self::WolStatus => WOL_STATUS,
        }
    }

    // Queries are answered with a data frame followed by an ACK,
    // every other request is answered with the ACK alone
    pub fn expects_response(&self) -> bool {
        matches!(
            self,
            Self::Temperature | Self::PowerRecoveryStatus | Self::WolStatus
        )
    }
}

impl FromStr for McuRequest {
    type Err = UnknownRequest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|request| request.name() == s)
            .copied()
            .ok_or_else(|| UnknownRequest(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_name() {
        for request in McuRequest::ALL {
            assert_eq!(request.name().parse::<McuRequest>().unwrap(), request);
        }
    }

    #[test]
    fn rejects_unknown_name() {
        assert!("set-clock".parse::<McuRequest>().is_err());
    }

    #[test]
    fn only_queries_expect_a_response() {
        assert!(McuRequest::Temperature.expects_response());
        assert!(McuRequest::WolStatus.expects_response());
        assert!(!McuRequest::DeviceReady.expects_response());
        assert!(!McuRequest::PowerLedBlink.expects_response());
    }
}
