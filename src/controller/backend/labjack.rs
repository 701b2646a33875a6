use tracing::info;

use crate::controller::backend::ud_driver::{
    Connection, DeviceHandle, DriverError, IoType, Request, UdDriver, UdResult, Version,
};
use crate::ljud::ljud_sys;

/// UdDriver backed by the vendor LabJackUD library
#[derive(Debug, Default)]
pub struct LabJackUd;

impl UdDriver for LabJackUd {
    fn open(
        &mut self,
        connection: Connection,
        address: &str,
        first_found: bool,
    ) -> Result<DeviceHandle, DriverError> {
        info!("LabJackUD opening U6 over {:?} at {:?}", connection, address);
        ljud_sys::open_u6(connection.code(), address, first_found).map(DeviceHandle)
    }

    fn add_request(&mut self, handle: DeviceHandle, request: Request) -> Result<(), DriverError> {
        ljud_sys::add_request(
            handle.0,
            request.io_type.code(),
            request.channel,
            request.value,
        )
    }

    fn go_one(&mut self, handle: DeviceHandle) -> Result<(), DriverError> {
        ljud_sys::go_one(handle.0)
    }

    fn get_first_result(&mut self, handle: DeviceHandle) -> Result<UdResult, DriverError> {
        let raw = ljud_sys::get_first_result(handle.0)?;
        Ok(UdResult {
            io_type: IoType::from_code(raw.io_type),
            channel: raw.channel,
            value: raw.value,
        })
    }

    fn e_put(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
        value: f64,
    ) -> Result<(), DriverError> {
        ljud_sys::e_put(handle.0, io_type.code(), channel, value)
    }

    fn e_get(
        &mut self,
        handle: DeviceHandle,
        io_type: IoType,
        channel: i32,
    ) -> Result<f64, DriverError> {
        ljud_sys::e_get(handle.0, io_type.code(), channel)
    }

    fn driver_version(&self) -> Version {
        Version(ljud_sys::driver_version())
    }
}
