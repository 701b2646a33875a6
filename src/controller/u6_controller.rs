use std::fmt;

use thiserror::Error;
use tracing::{info, warn};
use uom::si::{electric_potential::volt, f64::ElectricPotential};

use crate::config::{U6_ADDRESS, U6_CONNECTION, U6_FIRST_FOUND};
use crate::controller::backend::ud_driver::{
    ConfigChannel, DeviceHandle, DriverError, IoType, Request, UdDriver, Version,
};
use crate::controller::channel_config::{AnalogInputConfig, ChannelConfigError, ChannelIndex};

pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Operation being attempted when the driver raised, used as the Last Error prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    SetDigitalOutput,
    GetDigitalInput,
    ConfigureAnalogInput,
    GetAnalogInput,
    SetDac,
    GetBootloaderVersion,
    GetHardwareVersion,
    GetFirmwareVersion,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Operation::Connect => "connecting",
            Operation::SetDigitalOutput => "setting digital output",
            Operation::GetDigitalInput => "getting digital input",
            Operation::ConfigureAnalogInput => "configuring analog input",
            Operation::GetAnalogInput => "reading analog value",
            Operation::SetDac => "setting DAC",
            Operation::GetBootloaderVersion => "reading bootloader version",
            Operation::GetHardwareVersion => "reading hardware version",
            Operation::GetFirmwareVersion => "reading firmware version",
        };
        f.write_str(description)
    }
}

/// The three driver calls making up an analog input configuration, in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    Resolution,
    SettlingTime,
    Range,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("U6 already connected")]
    AlreadyConnected,

    #[error("U6 not connected")]
    NotConnected,

    #[error("Error {operation} with '{source}'")]
    Driver {
        operation: Operation,
        source: DriverError,
    },

    /// The driver answered with a result for a different request kind
    #[error("IO Read returned unexpected value: expected {expected:?}, got {received:?}")]
    UnexpectedResult { expected: IoType, received: IoType },

    /// Steps in `applied` stay in effect on the device
    #[error("Error configuring analog input with '{source}'")]
    PartialConfiguration {
        applied: Vec<ConfigStep>,
        failed: ConfigStep,
        source: DriverError,
    },

    #[error(transparent)]
    InvalidParameter(#[from] ChannelConfigError),
}

impl ControllerError {
    fn driver(operation: Operation) -> impl FnOnce(DriverError) -> Self {
        move |source| ControllerError::Driver { operation, source }
    }
}

/// Owns the single U6 session and records the most recent failure
#[derive(Debug)]
pub struct U6Controller<D: UdDriver> {
    driver: D,
    handle: Option<DeviceHandle>,
    last_error: String,
}

impl<D: UdDriver> U6Controller<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            handle: None,
            last_error: String::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.handle {
            Some(_) => ConnectionState::Connected,
            None => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn handle(&self) -> Option<DeviceHandle> {
        self.handle
    }

    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Store a failure that was detected outside the controller, e.g. while decoding parameters
    pub fn record_error(&mut self, err: ControllerError) -> ControllerError {
        warn!("U6 operation failed: {err}");
        self.last_error = err.to_string();
        err
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|err| self.record_error(err))
    }

    fn connected_handle(&self) -> Result<DeviceHandle> {
        self.handle.ok_or(ControllerError::NotConnected)
    }

    /// Open the USB session, refusing to replace a live one
    pub fn connect(&mut self) -> Result<()> {
        let result = self.try_connect();
        self.record(result)
    }

    fn try_connect(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Err(ControllerError::AlreadyConnected);
        }

        let handle = self
            .driver
            .open(U6_CONNECTION, U6_ADDRESS, U6_FIRST_FOUND)
            .map_err(ControllerError::driver(Operation::Connect))?;

        info!("Connected to U6 with handle {:?}", handle);
        self.handle = Some(handle);
        Ok(())
    }

    pub fn set_digital_output(&mut self, channel: ChannelIndex, level: bool) -> Result<()> {
        let result = self.connected_handle().and_then(|handle| {
            let value = if level { 1.0 } else { 0.0 };
            self.transact(
                handle,
                Request::new(IoType::PutDigitalBit, channel.into(), value),
            )
            .map_err(ControllerError::driver(Operation::SetDigitalOutput))
        });
        self.record(result)
    }

    pub fn get_digital_input(&mut self, channel: ChannelIndex) -> Result<bool> {
        let result = self.connected_handle().and_then(|handle| {
            self.read(
                handle,
                Request::new(IoType::GetDigitalBit, channel.into(), 0.0),
                Operation::GetDigitalInput,
            )
        });
        self.record(result).map(|value| value as i32 != 0)
    }

    /// Push resolution, settling time and range for one channel
    ///
    /// The three steps are not atomic: on failure the steps listed in
    /// [`ControllerError::PartialConfiguration`] remain applied.
    pub fn configure_analog_input(
        &mut self,
        channel: ChannelIndex,
        config: AnalogInputConfig,
    ) -> Result<()> {
        let result = self
            .connected_handle()
            .and_then(|handle| self.push_analog_config(handle, channel, config));
        self.record(result)
    }

    fn push_analog_config(
        &mut self,
        handle: DeviceHandle,
        channel: ChannelIndex,
        config: AnalogInputConfig,
    ) -> Result<()> {
        let mut applied = Vec::with_capacity(3);
        let steps = [
            ConfigStep::Resolution,
            ConfigStep::SettlingTime,
            ConfigStep::Range,
        ];

        for step in steps {
            let outcome = match step {
                ConfigStep::Resolution => self.driver.e_put(
                    handle,
                    IoType::PutConfig,
                    ConfigChannel::AinResolution.code(),
                    config.resolution.index().into(),
                ),
                ConfigStep::SettlingTime => self.driver.e_put(
                    handle,
                    IoType::PutConfig,
                    ConfigChannel::AinSettlingTime.code(),
                    config.settling_time.index().into(),
                ),
                ConfigStep::Range => self.transact(
                    handle,
                    Request::new(
                        IoType::PutAinRange,
                        channel.into(),
                        config.range.code().into(),
                    ),
                ),
            };

            if let Err(source) = outcome {
                return Err(ControllerError::PartialConfiguration {
                    applied,
                    failed: step,
                    source,
                });
            }
            applied.push(step);
        }

        info!("Configured AIN{channel}: {:?}", config);
        Ok(())
    }

    pub fn get_analog_input(&mut self, channel: ChannelIndex) -> Result<ElectricPotential> {
        let result = self.connected_handle().and_then(|handle| {
            self.read(
                handle,
                Request::new(IoType::GetAin, channel.into(), 0.0),
                Operation::GetAnalogInput,
            )
        });
        self.record(result).map(ElectricPotential::new::<volt>)
    }

    pub fn set_dac(&mut self, channel: ChannelIndex, voltage: ElectricPotential) -> Result<()> {
        let result = self.connected_handle().and_then(|handle| {
            self.transact(
                handle,
                Request::new(IoType::PutDac, channel.into(), voltage.get::<volt>()),
            )
            .map_err(ControllerError::driver(Operation::SetDac))
        });
        self.record(result)
    }

    /// Version of the installed UD driver, available without a session
    pub fn get_driver_version(&self) -> Version {
        self.driver.driver_version()
    }

    pub fn get_bootloader_version(&mut self) -> Result<Version> {
        self.read_version(ConfigChannel::BootloaderVersion, Operation::GetBootloaderVersion)
    }

    pub fn get_hardware_version(&mut self) -> Result<Version> {
        self.read_version(ConfigChannel::HardwareVersion, Operation::GetHardwareVersion)
    }

    pub fn get_firmware_version(&mut self) -> Result<Version> {
        self.read_version(ConfigChannel::FirmwareVersion, Operation::GetFirmwareVersion)
    }

    fn read_version(&mut self, channel: ConfigChannel, operation: Operation) -> Result<Version> {
        let result = self.connected_handle().and_then(|handle| {
            self.driver
                .e_get(handle, IoType::GetConfig, channel.code())
                .map(Version)
                .map_err(ControllerError::driver(operation))
        });
        self.record(result)
    }

    /// Queue a single request and execute it
    fn transact(
        &mut self,
        handle: DeviceHandle,
        request: Request,
    ) -> std::result::Result<(), DriverError> {
        self.driver.add_request(handle, request)?;
        self.driver.go_one(handle)
    }

    /// Queue, execute and fetch the first result, checking it answers `request`
    fn read(&mut self, handle: DeviceHandle, request: Request, operation: Operation) -> Result<f64> {
        let result = self
            .transact(handle, request)
            .and_then(|_| self.driver.get_first_result(handle))
            .map_err(ControllerError::driver(operation))?;

        if result.io_type != request.io_type {
            return Err(ControllerError::UnexpectedResult {
                expected: request.io_type,
                received: result.io_type,
            });
        }
        Ok(result.value)
    }
}
