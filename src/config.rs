use crate::controller::backend::ud_driver::Connection;

/// Address the HTTP front end listens on unless `LISTEN_ADDRESS_ENV` is set
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8000";
pub const LISTEN_ADDRESS_ENV: &str = "U6_BRIDGE_LISTEN";

/// Namespace the plugin methods are exposed under
pub const NAMESPACE: &str = "labJackU6";

// Session parameters of the single attached U6
pub const U6_CONNECTION: Connection = Connection::Usb;
pub const U6_ADDRESS: &str = "0";
pub const U6_FIRST_FOUND: bool = true;

pub fn listen_address() -> String {
    std::env::var(LISTEN_ADDRESS_ENV).unwrap_or_else(|_| DEFAULT_LISTEN_ADDRESS.to_string())
}
