pub mod axumstate;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod http;
pub mod messages;

#[cfg(feature = "labjackud")]
pub mod ljud;
