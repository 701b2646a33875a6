use std::fmt::{self, Debug};

use thiserror::Error;

/// UD driver error codes used by the backends
pub mod codes {
    pub const INVALID_CHANNEL_NUMBER: i32 = 2;
    pub const INVALID_PARAMETER: i32 = 10;
    pub const INVALID_HANDLE: i32 = 1003;
    pub const NO_MORE_DATA_AVAILABLE: i32 = 1006;
    pub const LABJACK_NOT_FOUND: i32 = 1007;
}

/// Opaque identifier of an open UD session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle(pub i32);

/// How the UD driver reaches the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Usb,
}

impl Connection {
    pub fn code(self) -> i32 {
        match self {
            Connection::Usb => 1,
        }
    }
}

/// Catalog of request kinds the controller issues against the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoType {
    GetAin,
    PutDac,
    GetDigitalBit,
    PutDigitalBit,
    PutConfig,
    GetConfig,
    PutAinRange,
    /// Anything the driver reports that is not in the catalog above
    Unknown(i32),
}

impl IoType {
    pub fn code(self) -> i32 {
        match self {
            IoType::GetAin => 10,
            IoType::PutDac => 20,
            IoType::GetDigitalBit => 30,
            IoType::PutDigitalBit => 40,
            IoType::PutConfig => 1000,
            IoType::GetConfig => 1001,
            IoType::PutAinRange => 2000,
            IoType::Unknown(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            10 => IoType::GetAin,
            20 => IoType::PutDac,
            30 => IoType::GetDigitalBit,
            40 => IoType::PutDigitalBit,
            1000 => IoType::PutConfig,
            1001 => IoType::GetConfig,
            2000 => IoType::PutAinRange,
            other => IoType::Unknown(other),
        }
    }
}

/// Special channels addressed by config get/put requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChannel {
    HardwareVersion,
    FirmwareVersion,
    BootloaderVersion,
    AinResolution,
    AinSettlingTime,
}

impl ConfigChannel {
    pub fn code(self) -> i32 {
        match self {
            ConfigChannel::HardwareVersion => 10,
            ConfigChannel::FirmwareVersion => 11,
            ConfigChannel::BootloaderVersion => 15,
            ConfigChannel::AinResolution => 2000,
            ConfigChannel::AinSettlingTime => 2002,
        }
    }
}

/// A queued request, as handed to `add_request`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    pub io_type: IoType,
    pub channel: i32,
    pub value: f64,
}

impl Request {
    pub fn new(io_type: IoType, channel: i32, value: f64) -> Self {
        Self {
            io_type,
            channel,
            value,
        }
    }
}

/// One (kind, channel, value) triple from the driver's result list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UdResult {
    pub io_type: IoType,
    pub channel: i32,
    pub value: f64,
}

/// Error raised by the driver binding, the message is kept verbatim
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Version number as reported by the driver or the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Version(pub f64);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Native UD driver binding: session opening, the request queue and immediate config access
pub trait UdDriver: Debug {
    fn open(
        &mut self,
        connection: Connection,
        address: &str,
        first_found: bool,
    ) -> Result<DeviceHandle, DriverError>;

    fn add_request(&mut self, handle: DeviceHandle, request: Request) -> Result<(), DriverError>;

    /// Execute every request queued on `handle`
    fn go_one(&mut self, handle: DeviceHandle) -> Result<(), DriverError>;

    fn get_first_result(&mut self, handle: DeviceHandle) -> Result<UdResult, DriverError>;

    /// Immediate request, equivalent to add_request + go_one without a result
    fn e_put(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
        value: f64,
    ) -> Result<(), DriverError>;

    /// Immediate request returning the value of its result
    fn e_get(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
    ) -> Result<f64, DriverError>;

    /// Does not need an open session
    fn driver_version(&self) -> Version;
}

impl<T: UdDriver + ?Sized> UdDriver for Box<T> {
    fn open(
        &mut self,
        connection: Connection,
        address: &str,
        first_found: bool,
    ) -> Result<DeviceHandle, DriverError> {
        (**self).open(connection, address, first_found)
    }

    fn add_request(&mut self, handle: DeviceHandle, request: Request) -> Result<(), DriverError> {
        (**self).add_request(handle, request)
    }

    fn go_one(&mut self, handle: DeviceHandle) -> Result<(), DriverError> {
        (**self).go_one(handle)
    }

    fn get_first_result(&mut self, handle: DeviceHandle) -> Result<UdResult, DriverError> {
        (**self).get_first_result(handle)
    }

    fn e_put(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
        value: f64,
    ) -> Result<(), DriverError> {
        (**self).e_put(handle, io_type, channel, value)
    }

    fn e_get(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
    ) -> Result<f64, DriverError> {
        (**self).e_get(handle, io_type, channel)
    }

    fn driver_version(&self) -> Version {
        (**self).driver_version()
    }
}
