pub mod hysteresis;

use tracing::{debug, warn};

use crate::{
    dispatcher::Dispatcher,
    link::McuLink,
    protocol::{
        FAN_FULL, FAN_HALF, FAN_STOP, Frame, THERMAL_CODE_OFFSET,
        THERMAL_STATUS_GET, THERMAL_TABLE,
    },
};

pub use hysteresis::Thresholds;

// The three speeds the MCU can drive the chassis fan at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FanLevel {
    Stopped,
    Half,
    Full,
}

impl FanLevel {
    // Request that switches the fan to this level
    pub fn frame(&self) -> Frame {
        match self {
            Self::Stopped => FAN_STOP,
            Self::Half => FAN_HALF,
            Self::Full => FAN_FULL,
        }
    }
}

// Convert a raw sensor code to Celsius, codes outside of the table
// are not valid readings
pub fn celsius(code: u8) -> Option<i32> {
    THERMAL_TABLE.get(code as usize).map(|&temp| temp as i32)
}

pub struct ThermalController {
    thresholds: Thresholds,
}

impl ThermalController {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    // Query the MCU for the chassis temperature.
    // Any failure results in no reading
    pub fn read_temperature<L: McuLink>(
        &self,
        dispatcher: &mut Dispatcher<L>,
    ) -> Option<i32> {
        let response = match dispatcher.send(&THERMAL_STATUS_GET, true) {
            Ok(Some(response)) => response,
            Ok(None) => return None,
            Err(err) => {
                warn!("Failed to read thermal status: {err}");
                return None;
            }
        };

        let Some(code) = response.get(THERMAL_CODE_OFFSET) else {
            warn!("Thermal status response too short: {response}");
            return None;
        };

        let temp = celsius(code);
        match temp {
            Some(temp) => debug!("Read temperature: {temp}°C (code {code})"),
            None => warn!("Thermal code {code} is out of the table range"),
        }

        temp
    }

    pub fn next_fan_level(
        &self,
        temp: i32,
        current: Option<FanLevel>,
    ) -> Option<FanLevel> {
        self.thresholds.next_fan_level(temp, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLink;

    fn thermal_reply(code: u8) -> Frame {
        Frame::new(&[0xfa, 0x03, 0x08, 0x00, 0x00, code, 0xfb]).unwrap()
    }

    fn controller() -> ThermalController {
        ThermalController::new(Thresholds::new(45, 50, 2))
    }

    #[test]
    fn every_code_in_table_maps_to_its_entry() {
        for code in 0..=u8::MAX {
            let mut link = MockLink::default();
            link.respond_with(thermal_reply(code));
            let mut dispatcher = Dispatcher::new(link, 0);

            let expected = THERMAL_TABLE.get(code as usize).map(|&t| t as i32);

            assert_eq!(controller().read_temperature(&mut dispatcher), expected);
        }
    }

    #[test]
    fn known_codes() {
        assert_eq!(celsius(0), Some(116));
        assert_eq!(celsius(74), Some(50));
        assert_eq!(celsius(203), Some(0));
        assert_eq!(celsius(204), None);
    }

    #[test]
    fn failed_query_is_no_reading() {
        let mut dispatcher = Dispatcher::new(MockLink::failing(usize::MAX), 2);

        assert_eq!(controller().read_temperature(&mut dispatcher), None);
        assert_eq!(dispatcher.link().calls(), 3);
    }

    #[test]
    fn short_response_is_no_reading() {
        let mut link = MockLink::default();
        link.respond_with(Frame::new(&[0xfa, 0x03, 0x08, 0xfb]).unwrap());
        let mut dispatcher = Dispatcher::new(link, 0);

        assert_eq!(controller().read_temperature(&mut dispatcher), None);
    }

    #[test]
    fn fan_levels_are_ordered() {
        assert!(FanLevel::Stopped < FanLevel::Half);
        assert!(FanLevel::Half < FanLevel::Full);
        assert_eq!(FanLevel::Half.frame(), FAN_HALF);
    }
}
