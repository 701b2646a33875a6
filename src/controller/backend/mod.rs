pub mod ud_driver;

#[cfg(feature = "sim")]
pub mod sim;

#[cfg(feature = "labjackud")]
pub mod labjack;
