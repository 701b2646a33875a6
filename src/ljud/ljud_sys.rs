use std::ffi::{CStr, CString, c_char, c_double, c_long};

use tracing::error;

use crate::controller::backend::ud_driver::DriverError;

/// UD device type of the U6
const LJ_DT_U6: c_long = 6;
/// ErrorToString writes at most this many bytes
const ERROR_STRING_LEN: usize = 256;

type LjHandle = c_long;
type LjError = c_long;

unsafe extern "system" {
    fn OpenLabJack(
        device_type: c_long,
        connection_type: c_long,
        address: *const c_char,
        first_found: c_long,
        handle: *mut LjHandle,
    ) -> LjError;

    fn AddRequest(
        handle: LjHandle,
        io_type: c_long,
        channel: c_long,
        value: c_double,
        x1: c_long,
        user_data: c_double,
    ) -> LjError;

    fn GoOne(handle: LjHandle) -> LjError;

    fn GetFirstResult(
        handle: LjHandle,
        io_type: *mut c_long,
        channel: *mut c_long,
        value: *mut c_double,
        x1: *mut c_long,
        user_data: *mut c_double,
    ) -> LjError;

    fn ePut(
        handle: LjHandle,
        io_type: c_long,
        channel: c_long,
        value: c_double,
        x1: c_long,
    ) -> LjError;

    fn eGet(
        handle: LjHandle,
        io_type: c_long,
        channel: c_long,
        value: *mut c_double,
        x1: c_long,
    ) -> LjError;

    fn GetDriverVersion() -> c_double;

    fn ErrorToString(error_code: LjError, message: *mut c_char);
}

/// Result triple as written by GetFirstResult
#[derive(Debug, Clone, Copy)]
pub struct RawResult {
    pub io_type: i32,
    pub channel: i32,
    pub value: f64,
}

pub fn open_u6(
    connection_type: i32,
    address: &str,
    first_found: bool,
) -> Result<i32, DriverError> {
    let address = CString::new(address)
        .map_err(|err| DriverError::new(-1, format!("invalid device address: {err}")))?;
    let mut handle: LjHandle = 0;
    let err = unsafe {
        OpenLabJack(
            LJ_DT_U6,
            connection_type as c_long,
            address.as_ptr(),
            first_found as c_long,
            &mut handle,
        )
    };
    check_err(err)?;
    Ok(handle as i32)
}

pub fn add_request(
    handle: i32,
    io_type: i32,
    channel: i32,
    value: f64,
) -> Result<(), DriverError> {
    let err = unsafe {
        AddRequest(
            handle as LjHandle,
            io_type as c_long,
            channel as c_long,
            value,
            0,
            0.0,
        )
    };
    check_err(err)
}

pub fn go_one(handle: i32) -> Result<(), DriverError> {
    let err = unsafe { GoOne(handle as LjHandle) };
    check_err(err)
}

pub fn get_first_result(handle: i32) -> Result<RawResult, DriverError> {
    let mut io_type: c_long = 0;
    let mut channel: c_long = 0;
    let mut value: c_double = 0.0;
    let mut x1: c_long = 0;
    let mut user_data: c_double = 0.0;
    let err = unsafe {
        GetFirstResult(
            handle as LjHandle,
            &mut io_type,
            &mut channel,
            &mut value,
            &mut x1,
            &mut user_data,
        )
    };
    check_err(err)?;
    Ok(RawResult {
        io_type: io_type as i32,
        channel: channel as i32,
        value,
    })
}

pub fn e_put(handle: i32, io_type: i32, channel: i32, value: f64) -> Result<(), DriverError> {
    let err = unsafe {
        ePut(
            handle as LjHandle,
            io_type as c_long,
            channel as c_long,
            value,
            0,
        )
    };
    check_err(err)
}

pub fn e_get(handle: i32, io_type: i32, channel: i32) -> Result<f64, DriverError> {
    let mut value: c_double = 0.0;
    let err = unsafe {
        eGet(
            handle as LjHandle,
            io_type as c_long,
            channel as c_long,
            &mut value,
            0,
        )
    };
    check_err(err)?;
    Ok(value)
}

pub fn driver_version() -> f64 {
    unsafe { GetDriverVersion() }
}

fn check_err(err: LjError) -> Result<(), DriverError> {
    if err == 0 {
        return Ok(());
    }

    // Fetch the driver's description of the error code
    let mut buf = [0 as c_char; ERROR_STRING_LEN];
    unsafe {
        ErrorToString(err, buf.as_mut_ptr());
    }
    let message = unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    error!("LabJackUD returned error {err}: {message}");
    Err(DriverError::new(err as i32, message))
}
