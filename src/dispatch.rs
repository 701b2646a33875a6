//! Name-based call-in surface for the plugin host.
//!
//! Each method takes its parameters as a JSON string and answers with a JSON string. Failures
//! reported by the controller are flattened to the historical values (`false`, `-99`, `""`)
//! here and nowhere else; the reason stays available through `getLastError`.

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info};
use uom::si::{electric_potential::volt, f64::ElectricPotential};

use crate::config::NAMESPACE;
use crate::controller::backend::ud_driver::UdDriver;
use crate::controller::{AnalogInputConfig, ControllerError, U6Controller};
use crate::messages::plugin_messages::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginMethod {
    GetLastError,
    GetDriverVersion,
    Connect,
    GetBootloaderVersion,
    GetHardwareVersion,
    GetFirmwareVersion,
    SetDigitalOutput,
    GetDigitalInput,
    SetDac,
    ConfigureAnalogInput,
    GetAnalogInput,
}

impl PluginMethod {
    pub const ALL: [PluginMethod; 11] = [
        PluginMethod::GetLastError,
        PluginMethod::GetDriverVersion,
        PluginMethod::Connect,
        PluginMethod::GetBootloaderVersion,
        PluginMethod::GetHardwareVersion,
        PluginMethod::GetFirmwareVersion,
        PluginMethod::SetDigitalOutput,
        PluginMethod::GetDigitalInput,
        PluginMethod::SetDac,
        PluginMethod::ConfigureAnalogInput,
        PluginMethod::GetAnalogInput,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PluginMethod::GetLastError => "getLastError",
            PluginMethod::GetDriverVersion => "getDriverVersion",
            PluginMethod::Connect => "connect",
            PluginMethod::GetBootloaderVersion => "getBootloaderVersion",
            PluginMethod::GetHardwareVersion => "getHWVersion",
            PluginMethod::GetFirmwareVersion => "getFWVersion",
            PluginMethod::SetDigitalOutput => "setDigitalOutput",
            PluginMethod::GetDigitalInput => "getDigitalInput",
            PluginMethod::SetDac => "setDAC",
            PluginMethod::ConfigureAnalogInput => "configureAnalogInput",
            PluginMethod::GetAnalogInput => "getAnalogInput",
        }
    }
}

impl FromStr for PluginMethod {
    type Err = DispatchError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        PluginMethod::ALL
            .into_iter()
            .find(|method| method.name() == name)
            .or_else(|| legacy_alias(name))
            .ok_or_else(|| DispatchError::UnknownMethod(name.to_string()))
    }
}

/// Misspelled names that older plugin hosts still call
fn legacy_alias(name: &str) -> Option<PluginMethod> {
    match name {
        "GetBooloaderVersion" => Some(PluginMethod::GetBootloaderVersion),
        "GeHWVersion" => Some(PluginMethod::GetHardwareVersion),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no plugin method named '{0}'")]
    UnknownMethod(String),

    #[error("invalid parameters for {method}: {source}")]
    InvalidParams {
        method: &'static str,
        source: serde_json::Error,
    },

    #[error("unable to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Owns the controller and routes plugin calls onto it
#[derive(Debug)]
pub struct Dispatcher<D: UdDriver> {
    controller: U6Controller<D>,
}

impl<D: UdDriver> Dispatcher<D> {
    pub fn new(driver: D) -> Self {
        Self {
            controller: U6Controller::new(driver),
        }
    }

    pub fn controller(&self) -> &U6Controller<D> {
        &self.controller
    }

    pub fn invoke(&mut self, method: &str, params: &str) -> Result<String, DispatchError> {
        let method = method.parse::<PluginMethod>()?;
        debug!("{NAMESPACE}.{} invoked with {:?}", method.name(), params);
        self.invoke_method(method, params)
    }

    pub fn invoke_method(
        &mut self,
        method: PluginMethod,
        params: &str,
    ) -> Result<String, DispatchError> {
        let controller = &mut self.controller;
        let response = match method {
            PluginMethod::GetLastError => to_json(&LastErrorResponse {
                last_error: controller.last_error().to_string(),
            }),
            PluginMethod::GetDriverVersion => to_json(&DriverVersionResponse {
                driver_version: controller.get_driver_version().to_string(),
            }),
            PluginMethod::Connect => to_json(&ConnectResponse {
                connected: controller.connect().is_ok(),
            }),
            PluginMethod::GetBootloaderVersion => to_json(&BootloaderVersionResponse {
                bootloader_version: version_or_empty(controller.get_bootloader_version()),
            }),
            PluginMethod::GetHardwareVersion => to_json(&HardwareVersionResponse {
                hardware_version: version_or_empty(controller.get_hardware_version()),
            }),
            PluginMethod::GetFirmwareVersion => to_json(&FirmwareVersionResponse {
                firmware_version: version_or_empty(controller.get_firmware_version()),
            }),
            PluginMethod::SetDigitalOutput => {
                let OutputSet {
                    output_number,
                    state,
                } = parse_params(method, params)?;
                to_json(&OutputResponse {
                    output_result: controller.set_digital_output(output_number, state).is_ok(),
                })
            }
            PluginMethod::GetDigitalInput => {
                let InputGet { input } = parse_params(method, params)?;
                to_json(&InputResponse {
                    input_result: controller
                        .get_digital_input(input)
                        .map(i32::from)
                        .unwrap_or(READ_FAILED),
                })
            }
            PluginMethod::SetDac => {
                let DacSet { channel, value } = parse_params(method, params)?;
                to_json(&DacResponse {
                    dac_result: controller
                        .set_dac(channel, ElectricPotential::new::<volt>(value))
                        .is_ok(),
                })
            }
            PluginMethod::ConfigureAnalogInput => {
                let AnalogConfig {
                    channel,
                    range,
                    resolution,
                    settling_time,
                } = parse_params(method, params)?;
                // The session check comes before code validation
                let result = if controller.is_connected() {
                    AnalogInputConfig::from_codes(range, resolution, settling_time)
                        .map_err(|err| controller.record_error(ControllerError::from(err)))
                        .and_then(|config| controller.configure_analog_input(channel, config))
                } else {
                    Err(controller.record_error(ControllerError::NotConnected))
                };
                to_json(&AnalogConfigResponse {
                    analog_config_result: result.is_ok(),
                })
            }
            PluginMethod::GetAnalogInput => {
                let AnalogGet { channel } = parse_params(method, params)?;
                to_json(&AnalogValueResponse {
                    analog_value: controller
                        .get_analog_input(channel)
                        .map(|reading| reading.get::<volt>())
                        .unwrap_or(f64::from(READ_FAILED)),
                })
            }
        }?;

        info!("{NAMESPACE}.{} -> {}", method.name(), response);
        Ok(response)
    }
}

fn parse_params<T: DeserializeOwned>(
    method: PluginMethod,
    params: &str,
) -> Result<T, DispatchError> {
    serde_json::from_str(&normalize_quotes(params)).map_err(|source| {
        DispatchError::InvalidParams {
            method: method.name(),
            source,
        }
    })
}

/// Rewrites single-quoted strings as JSON strings, so `{'input': 2}` parses like `{"input": 2}`
fn normalize_quotes(params: &str) -> Cow<'_, str> {
    if !params.contains('\'') {
        return Cow::Borrowed(params);
    }

    let mut out = String::with_capacity(params.len());
    let mut open: Option<char> = None;
    let mut chars = params.chars();
    while let Some(c) = chars.next() {
        match (open, c) {
            (None, '\'' | '"') => {
                open = Some(c);
                out.push('"');
            }
            (Some(quote), _) if c == quote => {
                open = None;
                out.push('"');
            }
            (Some(quote), '\\') => match chars.next() {
                // \' is not a JSON escape
                Some('\'') if quote == '\'' => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            (Some('\''), '"') => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn to_json<T: Serialize>(response: &T) -> Result<String, DispatchError> {
    Ok(serde_json::to_string(response)?)
}

fn version_or_empty<V: ToString>(result: Result<V, ControllerError>) -> String {
    result.map(|version| version.to_string()).unwrap_or_default()
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::controller::backend::sim::SimulatedU6;

    fn call(dispatcher: &mut Dispatcher<SimulatedU6>, method: &str, params: &str) -> Value {
        let response = dispatcher.invoke(method, params).unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn method_names_round_trip() {
        for method in PluginMethod::ALL {
            assert_eq!(method.name().parse::<PluginMethod>().unwrap(), method);
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        assert!(matches!(
            dispatcher.invoke("getSerialNumber", ""),
            Err(DispatchError::UnknownMethod(name)) if name == "getSerialNumber"
        ));
    }

    #[test]
    fn misspelled_host_names_still_resolve() {
        assert_eq!(
            "GetBooloaderVersion".parse::<PluginMethod>().unwrap(),
            PluginMethod::GetBootloaderVersion
        );
        assert_eq!(
            "GeHWVersion".parse::<PluginMethod>().unwrap(),
            PluginMethod::GetHardwareVersion
        );

        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");
        assert_eq!(
            call(&mut dispatcher, "GeHWVersion", ""),
            json!({"HWVersion": "2.000"})
        );
    }

    #[test]
    fn disconnected_calls_return_legacy_failures() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());

        assert_eq!(
            call(&mut dispatcher, "getDigitalInput", r#"{"input":1}"#),
            json!({"InputResult": -99})
        );
        assert_eq!(
            call(&mut dispatcher, "getAnalogInput", r#"{"channel":0}"#),
            json!({"AnalogValue": -99.0})
        );
        assert_eq!(
            call(&mut dispatcher, "setDAC", r#"{"channel":0,"value":1.5}"#),
            json!({"DACResult": false})
        );
        assert_eq!(
            call(&mut dispatcher, "getFWVersion", ""),
            json!({"FWVersion": ""})
        );
        assert_eq!(
            call(&mut dispatcher, "getLastError", ""),
            json!({"lastError": "U6 not connected"})
        );
    }

    #[test]
    fn driver_version_is_available_before_connect() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        assert_eq!(
            call(&mut dispatcher, "getDriverVersion", ""),
            json!({"DriverVersion": "3.480"})
        );
    }

    #[test]
    fn digital_output_reads_back_after_connect() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        assert_eq!(
            call(&mut dispatcher, "connect", ""),
            json!({"Connected": true})
        );

        call(
            &mut dispatcher,
            "setDigitalOutput",
            r#"{"outputNumber":1,"state":true}"#,
        );
        assert_eq!(
            call(&mut dispatcher, "getDigitalInput", r#"{"input":1}"#),
            json!({"InputResult": 1})
        );

        call(
            &mut dispatcher,
            "setDigitalOutput",
            r#"{"outputNumber":1,"state":false}"#,
        );
        assert_eq!(
            call(&mut dispatcher, "getDigitalInput", r#"{"input":1}"#),
            json!({"InputResult": 0})
        );
    }

    #[test]
    fn second_connect_reports_false() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");
        assert_eq!(
            call(&mut dispatcher, "connect", ""),
            json!({"Connected": false})
        );
        assert_eq!(
            dispatcher.controller().last_error(),
            "U6 already connected"
        );
    }

    #[test]
    fn invalid_range_code_never_reaches_the_device() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");

        assert_eq!(
            call(
                &mut dispatcher,
                "configureAnalogInput",
                r#"{"channel":2,"range":55,"settlingTime":0,"resolution":0}"#,
            ),
            json!({"AnalogConfigResult": false})
        );
        assert_eq!(
            dispatcher.controller().last_error(),
            "Invalid analog range code 55"
        );
        assert_eq!(dispatcher.controller().driver().range(2), None);
    }

    #[test]
    fn configured_range_bounds_analog_reading() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");
        assert_eq!(
            call(
                &mut dispatcher,
                "configureAnalogInput",
                r#"{"channel":2,"range":103,"settlingTime":0,"resolution":0}"#,
            ),
            json!({"AnalogConfigResult": true})
        );

        let reading = call(&mut dispatcher, "getAnalogInput", r#"{"channel":2}"#)["AnalogValue"]
            .as_f64()
            .unwrap();
        assert!((0.0..=5.0).contains(&reading));
    }

    #[test]
    fn single_quoted_params_are_accepted() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");

        assert_eq!(
            call(
                &mut dispatcher,
                "setDigitalOutput",
                "{'outputNumber':1, 'state': true}",
            ),
            json!({"OutputResult": true})
        );
        assert_eq!(
            call(&mut dispatcher, "getDigitalInput", "{'input': 1}"),
            json!({"InputResult": 1})
        );
    }

    #[test]
    fn pascal_case_keys_are_accepted() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");

        call(
            &mut dispatcher,
            "setDigitalOutput",
            r#"{"OutputNumber":2,"State":true}"#,
        );
        assert_eq!(
            call(&mut dispatcher, "getDigitalInput", r#"{"Input":2}"#),
            json!({"InputResult": 1})
        );
    }

    #[test]
    fn single_quoted_strings_become_json_strings() {
        assert_eq!(normalize_quotes(r#"{"input":2}"#), r#"{"input":2}"#);
        assert_eq!(normalize_quotes("{'input': 2}"), r#"{"input": 2}"#);
        assert_eq!(normalize_quotes(r#"{'a': "it's"}"#), r#"{"a": "it's"}"#);
        assert_eq!(normalize_quotes(r#"{'a': 'say "hi"'}"#), r#"{"a": "say \"hi\""}"#);
        assert_eq!(normalize_quotes(r"{'a': 'it\'s'}"), r#"{"a": "it's"}"#);
    }

    #[test]
    fn malformed_params_are_a_dispatch_error() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        assert!(matches!(
            dispatcher.invoke("setDAC", "channel=0"),
            Err(DispatchError::InvalidParams { method: "setDAC", .. })
        ));
        assert!(matches!(
            dispatcher.invoke("setDAC", "{'channel':0}"),
            Err(DispatchError::InvalidParams { method: "setDAC", .. })
        ));
    }

    #[test]
    fn disconnected_configure_reports_the_session_first() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        assert_eq!(
            call(
                &mut dispatcher,
                "configureAnalogInput",
                r#"{"channel":2,"range":55,"settlingTime":0,"resolution":0}"#,
            ),
            json!({"AnalogConfigResult": false})
        );
        assert_eq!(dispatcher.controller().last_error(), "U6 not connected");
    }

    #[test]
    fn device_versions_after_connect() {
        let mut dispatcher = Dispatcher::new(SimulatedU6::new());
        call(&mut dispatcher, "connect", "");
        assert_eq!(
            call(&mut dispatcher, "getHWVersion", ""),
            json!({"HWVersion": "2.000"})
        );
        assert_eq!(
            call(&mut dispatcher, "getFWVersion", ""),
            json!({"FWVersion": "1.430"})
        );
        assert_eq!(
            call(&mut dispatcher, "getBootloaderVersion", ""),
            json!({"BootloaderVersion": "4.000"})
        );
    }
}
