use std::sync::{Arc, Mutex};

use crate::controller::backend::ud_driver::UdDriver;
use crate::dispatch::Dispatcher;

/// Driver backend chosen at startup
pub type BoxedDriver = Box<dyn UdDriver + Send>;

/// All shared state involved in http communication
#[derive(Debug, Clone)]
pub struct AxumState {
    /// The one dispatcher owning the U6 session, the mutex serializes every plugin call
    pub dispatcher: Arc<Mutex<Dispatcher<BoxedDriver>>>,
}

impl AxumState {
    pub fn new(driver: BoxedDriver) -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(Dispatcher::new(driver))),
        }
    }
}
