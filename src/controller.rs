pub mod backend;
pub mod channel_config;
pub mod u6_controller;

pub use channel_config::{AnalogInputConfig, AnalogRange, ChannelIndex, Resolution, SettlingTime};
pub use u6_controller::{ConnectionState, ControllerError, U6Controller};
