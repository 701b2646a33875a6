use thiserror::Error;
use uom::si::{electric_potential::volt, f64::ElectricPotential};

/// Index of a digital or analog line on the U6
pub type ChannelIndex = u16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelConfigError {
    #[error("Invalid analog range code {0}")]
    Range(i32),
    #[error("Invalid resolution index {0}")]
    Resolution(i32),
    #[error("Invalid settling time index {0}")]
    SettlingTime(i32),
}

/// Analog input voltage range, the discriminants are the driver's literal range codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AnalogRange {
    Auto = 0,
    Bipolar20V = 1,
    Bipolar10V = 2,
    Bipolar5V = 3,
    Bipolar4V = 4,
    Bipolar2_5V = 5,
    Bipolar2V = 6,
    Bipolar1_25V = 7,
    Bipolar1V = 8,
    Bipolar0_625V = 9,
    Bipolar0_1V = 10,
    Bipolar0_01V = 11,
    Unipolar20V = 101,
    Unipolar10V = 102,
    Unipolar5V = 103,
    Unipolar4V = 104,
    Unipolar2_5V = 105,
    Unipolar2V = 106,
    Unipolar1_25V = 107,
    Unipolar1V = 108,
    Unipolar0_625V = 109,
    Unipolar0_5V = 110,
    Unipolar0_3125V = 111,
    Unipolar0_25V = 112,
    Unipolar0_025V = 113,
    Unipolar0_0025V = 114,
}

impl AnalogRange {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_bipolar(self) -> bool {
        self.code() < 100
    }

    /// Full-scale magnitude, AUTO reports the widest range the device may pick
    pub fn full_scale(self) -> ElectricPotential {
        use AnalogRange::*;
        let volts = match self {
            Auto | Bipolar20V | Unipolar20V => 20.0,
            Bipolar10V | Unipolar10V => 10.0,
            Bipolar5V | Unipolar5V => 5.0,
            Bipolar4V | Unipolar4V => 4.0,
            Bipolar2_5V | Unipolar2_5V => 2.5,
            Bipolar2V | Unipolar2V => 2.0,
            Bipolar1_25V | Unipolar1_25V => 1.25,
            Bipolar1V | Unipolar1V => 1.0,
            Bipolar0_625V | Unipolar0_625V => 0.625,
            Unipolar0_5V => 0.5,
            Unipolar0_3125V => 0.3125,
            Unipolar0_25V => 0.25,
            Bipolar0_1V => 0.1,
            Unipolar0_025V => 0.025,
            Bipolar0_01V => 0.01,
            Unipolar0_0025V => 0.0025,
        };
        ElectricPotential::new::<volt>(volts)
    }

    /// Lowest and highest voltage measurable in this range
    pub fn bounds(self) -> (ElectricPotential, ElectricPotential) {
        let full_scale = self.full_scale();
        if self.is_bipolar() {
            (-full_scale, full_scale)
        } else {
            (ElectricPotential::new::<volt>(0.0), full_scale)
        }
    }
}

impl TryFrom<i32> for AnalogRange {
    type Error = ChannelConfigError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        use AnalogRange::*;
        Ok(match code {
            0 => Auto,
            1 => Bipolar20V,
            2 => Bipolar10V,
            3 => Bipolar5V,
            4 => Bipolar4V,
            5 => Bipolar2_5V,
            6 => Bipolar2V,
            7 => Bipolar1_25V,
            8 => Bipolar1V,
            9 => Bipolar0_625V,
            10 => Bipolar0_1V,
            11 => Bipolar0_01V,
            101 => Unipolar20V,
            102 => Unipolar10V,
            103 => Unipolar5V,
            104 => Unipolar4V,
            105 => Unipolar2_5V,
            106 => Unipolar2V,
            107 => Unipolar1_25V,
            108 => Unipolar1V,
            109 => Unipolar0_625V,
            110 => Unipolar0_5V,
            111 => Unipolar0_3125V,
            112 => Unipolar0_25V,
            113 => Unipolar0_025V,
            114 => Unipolar0_0025V,
            other => return Err(ChannelConfigError::Range(other)),
        })
    }
}

/// Resolution index, 0 selects the device default and non-zero values trade speed for noise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution(u8);

impl Resolution {
    pub const MAX: u8 = 12;

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Resolution {
    type Error = ChannelConfigError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i <= Self::MAX)
            .map(Resolution)
            .ok_or(ChannelConfigError::Resolution(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SettlingTime {
    Micros5 = 0,
    Micros10 = 1,
    Micros100 = 2,
    Millis1 = 3,
    Millis10 = 4,
}

impl SettlingTime {
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i32> for SettlingTime {
    type Error = ChannelConfigError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        Ok(match index {
            0 => SettlingTime::Micros5,
            1 => SettlingTime::Micros10,
            2 => SettlingTime::Micros100,
            3 => SettlingTime::Millis1,
            4 => SettlingTime::Millis10,
            other => return Err(ChannelConfigError::SettlingTime(other)),
        })
    }
}

/// Settings pushed to the device by `configure_analog_input`, never cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogInputConfig {
    pub range: AnalogRange,
    pub resolution: Resolution,
    pub settling_time: SettlingTime,
}

impl AnalogInputConfig {
    /// Build from the raw codes callers pass over the plugin interface
    pub fn from_codes(
        range: i32,
        resolution: i32,
        settling_time: i32,
    ) -> Result<Self, ChannelConfigError> {
        Ok(Self {
            range: AnalogRange::try_from(range)?,
            resolution: Resolution::try_from(resolution)?,
            settling_time: SettlingTime::try_from(settling_time)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_codes_are_sparse() {
        assert_eq!(AnalogRange::try_from(11), Ok(AnalogRange::Bipolar0_01V));
        assert_eq!(AnalogRange::try_from(101), Ok(AnalogRange::Unipolar20V));
        assert_eq!(AnalogRange::try_from(12), Err(ChannelConfigError::Range(12)));
        assert_eq!(AnalogRange::try_from(100), Err(ChannelConfigError::Range(100)));
        assert_eq!(AnalogRange::try_from(115), Err(ChannelConfigError::Range(115)));
        assert_eq!(AnalogRange::Unipolar5V.code(), 103);
    }

    #[test]
    fn unipolar_ranges_start_at_zero() {
        let (low, high) = AnalogRange::Unipolar5V.bounds();
        assert_eq!(low.get::<volt>(), 0.0);
        assert_eq!(high.get::<volt>(), 5.0);

        let (low, high) = AnalogRange::Bipolar10V.bounds();
        assert_eq!(low.get::<volt>(), -10.0);
        assert_eq!(high.get::<volt>(), 10.0);
    }

    #[test]
    fn resolution_and_settling_bounds() {
        assert_eq!(Resolution::try_from(12).map(Resolution::index), Ok(12));
        assert_eq!(Resolution::try_from(13), Err(ChannelConfigError::Resolution(13)));
        assert_eq!(Resolution::try_from(-1), Err(ChannelConfigError::Resolution(-1)));
        assert_eq!(SettlingTime::try_from(4), Ok(SettlingTime::Millis10));
        assert_eq!(
            SettlingTime::try_from(5),
            Err(ChannelConfigError::SettlingTime(5))
        );
    }

    #[test]
    fn config_from_codes_reports_first_bad_field() {
        let config = AnalogInputConfig::from_codes(103, 0, 0).unwrap();
        assert_eq!(config.range, AnalogRange::Unipolar5V);
        assert_eq!(
            AnalogInputConfig::from_codes(103, 20, 9),
            Err(ChannelConfigError::Resolution(20))
        );
    }
}
