use serde::{Deserialize, Serialize};

use crate::controller::ChannelIndex;

/// Legacy failure value for numeric reads
pub const READ_FAILED: i32 = -99;

// Parameter payloads, as sent by the plugin host. Older hosts capitalize the keys.

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSet {
    #[serde(alias = "OutputNumber")]
    pub output_number: ChannelIndex,
    #[serde(alias = "State")]
    pub state: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputGet {
    #[serde(alias = "Input")]
    pub input: ChannelIndex,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DacSet {
    #[serde(alias = "Channel")]
    pub channel: ChannelIndex,
    #[serde(alias = "Value")]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalogConfig {
    #[serde(alias = "Channel")]
    pub channel: ChannelIndex,
    #[serde(alias = "Range")]
    pub range: i32,
    #[serde(default, alias = "Resolution")]
    pub resolution: i32,
    #[serde(default, alias = "SettlingTime")]
    pub settling_time: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalogGet {
    #[serde(alias = "Channel")]
    pub channel: ChannelIndex,
}

// Responses, keyed the way existing callers parse them

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastErrorResponse {
    #[serde(rename = "lastError")]
    pub last_error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverVersionResponse {
    #[serde(rename = "DriverVersion")]
    pub driver_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectResponse {
    #[serde(rename = "Connected")]
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BootloaderVersionResponse {
    #[serde(rename = "BootloaderVersion")]
    pub bootloader_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardwareVersionResponse {
    #[serde(rename = "HWVersion")]
    pub hardware_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirmwareVersionResponse {
    #[serde(rename = "FWVersion")]
    pub firmware_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputResponse {
    #[serde(rename = "OutputResult")]
    pub output_result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputResponse {
    #[serde(rename = "InputResult")]
    pub input_result: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DacResponse {
    #[serde(rename = "DACResult")]
    pub dac_result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalogConfigResponse {
    #[serde(rename = "AnalogConfigResult")]
    pub analog_config_result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalogValueResponse {
    #[serde(rename = "AnalogValue")]
    pub analog_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analog_config_accepts_camel_case_and_defaults() {
        let config: AnalogConfig = serde_json::from_str(r#"{"channel":2,"range":103}"#).unwrap();
        assert_eq!(config.range, 103);
        assert_eq!(config.resolution, 0);
        assert_eq!(config.settling_time, 0);

        let config: AnalogConfig = serde_json::from_str(
            r#"{"channel":2,"range":103,"settlingTime":3,"resolution":8}"#,
        )
        .unwrap();
        assert_eq!(config.settling_time, 3);
        assert_eq!(config.resolution, 8);
    }

    #[test]
    fn capitalized_keys_are_accepted() {
        let config: AnalogConfig = serde_json::from_str(
            r#"{"Channel":1,"Range":2,"SettlingTime":4,"Resolution":12}"#,
        )
        .unwrap();
        assert_eq!(config.channel, 1);
        assert_eq!(config.range, 2);
        assert_eq!(config.settling_time, 4);
        assert_eq!(config.resolution, 12);

        let set: DacSet = serde_json::from_str(r#"{"Channel":0,"Value":2.5}"#).unwrap();
        assert_eq!(set.value, 2.5);

        let output: OutputSet =
            serde_json::from_str(r#"{"OutputNumber":3,"State":false}"#).unwrap();
        assert_eq!(output.output_number, 3);
        assert!(!output.state);
    }

    #[test]
    fn responses_use_legacy_keys() {
        let json = serde_json::to_string(&InputResponse {
            input_result: READ_FAILED,
        })
        .unwrap();
        assert_eq!(json, r#"{"InputResult":-99}"#);

        let json = serde_json::to_string(&LastErrorResponse {
            last_error: "U6 not connected".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"lastError":"U6 not connected"}"#);
    }

    #[test]
    fn negative_channels_are_rejected() {
        assert!(serde_json::from_str::<InputGet>(r#"{"input":-1}"#).is_err());
    }
}
