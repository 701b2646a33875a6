use std::collections::HashMap;

use rand::random_range;
use tracing::info;
use uom::si::electric_potential::volt;

use crate::controller::backend::ud_driver::{
    ConfigChannel, Connection, DeviceHandle, DriverError, IoType, Request, UdDriver, UdResult,
    Version, codes,
};
use crate::controller::channel_config::AnalogRange;

const DIGITAL_LINES: i32 = 23;
const ANALOG_INPUTS: i32 = 14;
const DAC_OUTPUTS: i32 = 2;
const DAC_MAX_VOLTS: f64 = 5.0;

const DRIVER_VERSION: f64 = 3.48;
const HARDWARE_VERSION: f64 = 2.0;
const FIRMWARE_VERSION: f64 = 1.43;
const BOOTLOADER_VERSION: f64 = 4.0;

/// In-process stand-in for a U6 behind the UD driver
///
/// Digital outputs are read back on the same line, DAC writes are clamped the way the hardware
/// does, and analog inputs return noise within the range last configured for the channel.
#[derive(Debug)]
pub struct SimulatedU6 {
    attached: bool,
    handle: Option<DeviceHandle>,
    digital: HashMap<i32, f64>,
    dac: HashMap<i32, f64>,
    ranges: HashMap<i32, AnalogRange>,
    config: HashMap<i32, f64>,
    pending: Vec<Request>,
    results: Vec<UdResult>,
}

impl Default for SimulatedU6 {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedU6 {
    pub fn new() -> Self {
        Self {
            attached: true,
            handle: None,
            digital: HashMap::new(),
            dac: HashMap::new(),
            ranges: HashMap::new(),
            config: HashMap::new(),
            pending: Vec::new(),
            results: Vec::new(),
        }
    }

    /// A simulator with no device on the bus, every open fails
    pub fn detached() -> Self {
        Self {
            attached: false,
            ..Self::new()
        }
    }

    pub fn dac_volts(&self, channel: i32) -> Option<f64> {
        self.dac.get(&channel).copied()
    }

    pub fn range(&self, channel: i32) -> Option<AnalogRange> {
        self.ranges.get(&channel).copied()
    }

    fn check_handle(&self, handle: DeviceHandle) -> Result<(), DriverError> {
        match self.handle {
            Some(open) if open == handle => Ok(()),
            _ => Err(DriverError::new(codes::INVALID_HANDLE, "INVALID_HANDLE")),
        }
    }

    fn check_channel(channel: i32, count: i32) -> Result<(), DriverError> {
        if (0..count).contains(&channel) {
            Ok(())
        } else {
            Err(DriverError::new(
                codes::INVALID_CHANNEL_NUMBER,
                "INVALID_CHANNEL_NUMBER",
            ))
        }
    }

    fn invalid_parameter() -> DriverError {
        DriverError::new(codes::INVALID_PARAMETER, "INVALID_PARAMETER")
    }

    fn sample_ain(&self, channel: i32) -> f64 {
        let range = self.range(channel).unwrap_or(AnalogRange::Bipolar10V);
        let (low, high) = range.bounds();
        random_range(low.get::<volt>()..=high.get::<volt>())
    }

    fn execute(&mut self, request: Request) -> Result<f64, DriverError> {
        match request.io_type {
            IoType::GetDigitalBit => {
                Self::check_channel(request.channel, DIGITAL_LINES)?;
                Ok(self.digital.get(&request.channel).copied().unwrap_or(0.0))
            }
            IoType::PutDigitalBit => {
                Self::check_channel(request.channel, DIGITAL_LINES)?;
                let level = if request.value != 0.0 { 1.0 } else { 0.0 };
                self.digital.insert(request.channel, level);
                Ok(level)
            }
            IoType::GetAin => {
                Self::check_channel(request.channel, ANALOG_INPUTS)?;
                Ok(self.sample_ain(request.channel))
            }
            IoType::PutAinRange => {
                Self::check_channel(request.channel, ANALOG_INPUTS)?;
                let range = AnalogRange::try_from(request.value as i32)
                    .map_err(|_| Self::invalid_parameter())?;
                self.ranges.insert(request.channel, range);
                Ok(request.value)
            }
            IoType::PutDac => {
                Self::check_channel(request.channel, DAC_OUTPUTS)?;
                let volts = request.value.clamp(0.0, DAC_MAX_VOLTS);
                self.dac.insert(request.channel, volts);
                Ok(volts)
            }
            IoType::PutConfig => {
                if request.channel == ConfigChannel::AinResolution.code()
                    || request.channel == ConfigChannel::AinSettlingTime.code()
                {
                    self.config.insert(request.channel, request.value);
                    Ok(request.value)
                } else {
                    Err(Self::invalid_parameter())
                }
            }
            IoType::GetConfig => self.read_config(request.channel),
            IoType::Unknown(_) => Err(Self::invalid_parameter()),
        }
    }

    fn read_config(&self, channel: i32) -> Result<f64, DriverError> {
        let value = match channel {
            c if c == ConfigChannel::HardwareVersion.code() => HARDWARE_VERSION,
            c if c == ConfigChannel::FirmwareVersion.code() => FIRMWARE_VERSION,
            c if c == ConfigChannel::BootloaderVersion.code() => BOOTLOADER_VERSION,
            other => return self.config.get(&other).copied().ok_or_else(Self::invalid_parameter),
        };
        Ok(value)
    }
}

impl UdDriver for SimulatedU6 {
    fn open(
        &mut self,
        connection: Connection,
        address: &str,
        _first_found: bool,
    ) -> Result<DeviceHandle, DriverError> {
        if !self.attached {
            return Err(DriverError::new(
                codes::LABJACK_NOT_FOUND,
                "LABJACK_NOT_FOUND",
            ));
        }

        let handle = DeviceHandle(0);
        info!(
            "Simulated U6 opened over {:?} at address {:?}",
            connection, address
        );
        self.handle = Some(handle);
        Ok(handle)
    }

    fn add_request(&mut self, handle: DeviceHandle, request: Request) -> Result<(), DriverError> {
        self.check_handle(handle)?;
        self.pending.push(request);
        Ok(())
    }

    fn go_one(&mut self, handle: DeviceHandle) -> Result<(), DriverError> {
        self.check_handle(handle)?;
        self.results.clear();

        for request in std::mem::take(&mut self.pending) {
            let value = self.execute(request)?;
            self.results.push(UdResult {
                io_type: request.io_type,
                channel: request.channel,
                value,
            });
        }
        Ok(())
    }

    fn get_first_result(&mut self, handle: DeviceHandle) -> Result<UdResult, DriverError> {
        self.check_handle(handle)?;
        self.results.first().copied().ok_or_else(|| {
            DriverError::new(codes::NO_MORE_DATA_AVAILABLE, "NO_MORE_DATA_AVAILABLE")
        })
    }

    fn e_put(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
        value: f64,
    ) -> Result<(), DriverError> {
        self.check_handle(handle)?;
        self.execute(Request::new(io_type, channel, value))
            .map(|_| ())
    }

    fn e_get(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
    ) -> Result<f64, DriverError> {
        self.check_handle(handle)?;
        self.execute(Request::new(io_type, channel, 0.0))
    }

    fn driver_version(&self) -> Version {
        Version(DRIVER_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> (SimulatedU6, DeviceHandle) {
        let mut sim = SimulatedU6::new();
        let handle = sim.open(Connection::Usb, "0", true).unwrap();
        (sim, handle)
    }

    #[test]
    fn detached_device_cannot_be_opened() {
        let mut sim = SimulatedU6::detached();
        let err = sim.open(Connection::Usb, "0", true).unwrap_err();
        assert_eq!(err.code, codes::LABJACK_NOT_FOUND);
    }

    #[test]
    fn requests_need_the_open_handle() {
        let mut sim = SimulatedU6::new();
        let err = sim
            .add_request(DeviceHandle(7), Request::new(IoType::GetAin, 0, 0.0))
            .unwrap_err();
        assert_eq!(err.code, codes::INVALID_HANDLE);
    }

    #[test]
    fn digital_write_reads_back() {
        let (mut sim, handle) = opened();
        sim.add_request(handle, Request::new(IoType::PutDigitalBit, 4, 1.0))
            .unwrap();
        sim.go_one(handle).unwrap();
        sim.add_request(handle, Request::new(IoType::GetDigitalBit, 4, 0.0))
            .unwrap();
        sim.go_one(handle).unwrap();

        let result = sim.get_first_result(handle).unwrap();
        assert_eq!(result.io_type, IoType::GetDigitalBit);
        assert_eq!(result.value, 1.0);
    }

    #[test]
    fn analog_reading_stays_in_configured_range() {
        let (mut sim, handle) = opened();
        sim.add_request(
            handle,
            Request::new(IoType::PutAinRange, 2, AnalogRange::Unipolar1V.code().into()),
        )
        .unwrap();
        sim.go_one(handle).unwrap();

        for _ in 0..32 {
            let value = sim.e_get(handle, IoType::GetAin, 2).unwrap();
            assert!((0.0..=1.0).contains(&value), "{value} outside 0-1V");
        }
    }

    #[test]
    fn dac_is_clamped_to_output_span() {
        let (mut sim, handle) = opened();
        sim.e_put(handle, IoType::PutDac, 0, 7.5).unwrap();
        assert_eq!(sim.dac_volts(0), Some(DAC_MAX_VOLTS));
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        let (mut sim, handle) = opened();
        let err = sim.e_put(handle, IoType::PutDac, 2, 1.0).unwrap_err();
        assert_eq!(err.code, codes::INVALID_CHANNEL_NUMBER);
    }

    #[test]
    fn empty_result_list_reports_no_data() {
        let (mut sim, handle) = opened();
        let err = sim.get_first_result(handle).unwrap_err();
        assert_eq!(err.code, codes::NO_MORE_DATA_AVAILABLE);
    }
}
