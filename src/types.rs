use crate::form::FieldValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Temperature in whatever unit the thermostat currently reports
pub type Temperature = f64;

/// Declares an integer-coded device enumeration.
///
/// Codes the firmware sends that are not listed here are kept in the
/// `Unknown` variant and render as the type name followed by the code.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i64", into = "i64")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Code not known to this library
            Unknown(i64),
        }

        impl $name {
            /// Integer code used on the wire
            pub fn code(self) -> i64 {
                match self {
                    $( $name::$variant => $code, )+
                    $name::Unknown(code) => code,
                }
            }

            /// Canonical label, if the code is known
            pub fn label(self) -> Option<&'static str> {
                match self {
                    $( $name::$variant => Some($label), )+
                    $name::Unknown(_) => None,
                }
            }
        }

        impl From<i64> for $name {
            fn from(code: i64) -> Self {
                match code {
                    $( $code => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.code()
            }
        }

        impl From<$name> for FieldValue {
            fn from(value: $name) -> Self {
                FieldValue::Int(value.code())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::from(0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.label() {
                    Some(label) => f.write_str(label),
                    None => write!(f, "{}{}", stringify!($name), self.code()),
                }
            }
        }
    };
}

coded_enum! {
    /// Operating mode
    pub enum ThermostatMode {
        Off = 0 => "off",
        Heat = 1 => "heat",
        Cool = 2 => "cool",
        Auto = 3 => "auto",
    }
}

coded_enum! {
    /// What the equipment is doing right now
    pub enum ThermostatState {
        Idle = 0 => "idle",
        Heating = 1 => "heating",
        Cooling = 2 => "cooling",
        Lockout = 3 => "lockout",
        Error = 4 => "error",
    }
}

coded_enum! {
    /// Active demand stage
    pub enum DemandStage {
        Off = 0 => "off",
        Heating1 = 1 => "heating1",
        Heating2 = 2 => "heating2",
        Cooling1 = 3 => "cooling1",
        Cooling2 = 4 => "cooling2",
    }
}

coded_enum! {
    /// Requested fan behaviour
    pub enum FanSetting {
        Auto = 0 => "auto",
        On = 1 => "on",
    }
}

coded_enum! {
    /// Whether the fan is running
    pub enum FanState {
        Off = 0 => "off",
        On = 1 => "on",
    }
}

coded_enum! {
    /// Display and setpoint temperature units
    pub enum TempUnits {
        Fahrenheit = 0 => "fahrenheit",
        Celsius = 1 => "celsius",
    }
}

impl TempUnits {
    /// Degree symbol for display
    pub fn symbol(self) -> &'static str {
        match self {
            TempUnits::Fahrenheit => "°F",
            TempUnits::Celsius => "°C",
            TempUnits::Unknown(_) => "°",
        }
    }
}

coded_enum! {
    pub enum ScheduleState {
        Disabled = 0 => "disabled",
        Enabled = 1 => "enabled",
    }
}

coded_enum! {
    /// Current part of the day's schedule
    pub enum SchedulePart {
        Morning = 0 => "morning",
        Day = 1 => "day",
        Evening = 2 => "evening",
        Night = 3 => "night",
        Inactive = 255 => "inactive",
    }
}

coded_enum! {
    pub enum AwayState {
        Home = 0 => "home",
        Away = 1 => "away",
    }
}

coded_enum! {
    pub enum HolidayState {
        Regular = 0 => "regular",
        Holiday = 1 => "holiday",
    }
}

coded_enum! {
    pub enum OverrideState {
        Off = 0 => "off",
        On = 1 => "on",
    }
}

coded_enum! {
    /// Forced unoccupied (commercial models)
    pub enum ForceUnoccupiedState {
        Off = 0 => "off",
        On = 1 => "on",
    }
}

coded_enum! {
    pub enum HumidifierState {
        Off = 0 => "off",
        On = 1 => "on",
    }
}

coded_enum! {
    /// Which modes the installed equipment supports
    pub enum AvailableModes {
        All = 0 => "all",
        HeatCool = 1 => "heat/cool",
        Heat = 2 => "heat",
        Cool = 3 => "cool",
    }
}

/// Decode an explicit `null` as the field's zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Full thermostat state, as returned by `/query/info`
///
/// Firmware omits fields it does not support; missing and `null` fields
/// take their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: ThermostatMode,
    #[serde(deserialize_with = "null_as_default")]
    pub state: ThermostatState,
    #[serde(rename = "activestage", deserialize_with = "null_as_default")]
    pub active_stage: DemandStage,
    #[serde(rename = "fan", deserialize_with = "null_as_default")]
    pub fan_setting: FanSetting,
    #[serde(rename = "fanstate", deserialize_with = "null_as_default")]
    pub fan_state: FanState,
    #[serde(rename = "tempunits", deserialize_with = "null_as_default")]
    pub temp_units: TempUnits,
    #[serde(deserialize_with = "null_as_default")]
    pub schedule: ScheduleState,
    #[serde(rename = "schedulepart", deserialize_with = "null_as_default")]
    pub schedule_part: SchedulePart,
    #[serde(deserialize_with = "null_as_default")]
    pub away: AwayState,
    #[serde(deserialize_with = "null_as_default")]
    pub holiday: HolidayState,
    #[serde(rename = "override", deserialize_with = "null_as_default")]
    pub override_state: OverrideState,
    /// Minutes left on the active override
    #[serde(rename = "overridetime", deserialize_with = "null_as_default")]
    pub override_time: i64,
    #[serde(rename = "forceunocc", deserialize_with = "null_as_default")]
    pub force_unoccupied: ForceUnoccupiedState,
    #[serde(rename = "spacetemp", deserialize_with = "null_as_default")]
    pub space_temp: Temperature,
    #[serde(rename = "heattemp", deserialize_with = "null_as_default")]
    pub heat_temp: Temperature,
    #[serde(rename = "cooltemp", deserialize_with = "null_as_default")]
    pub cool_temp: Temperature,
    #[serde(rename = "cooltempmin", deserialize_with = "null_as_default")]
    pub cool_temp_min: Temperature,
    #[serde(rename = "cooltempmax", deserialize_with = "null_as_default")]
    pub cool_temp_max: Temperature,
    #[serde(rename = "heattempmin", deserialize_with = "null_as_default")]
    pub heat_temp_min: Temperature,
    #[serde(rename = "heattempmax", deserialize_with = "null_as_default")]
    pub heat_temp_max: Temperature,
    #[serde(rename = "setpointdelta", deserialize_with = "null_as_default")]
    pub setpoint_delta: f64,
    #[serde(rename = "hum", deserialize_with = "null_as_default")]
    pub humidity: f64,
    #[serde(rename = "hum_setpoint", deserialize_with = "null_as_default")]
    pub humidify_setpoint: f64,
    #[serde(rename = "dehum_setpoint", deserialize_with = "null_as_default")]
    pub dehumidify_setpoint: f64,
    #[serde(rename = "hum_active", deserialize_with = "null_as_default")]
    pub humidifier: HumidifierState,
    #[serde(rename = "availablemodes", deserialize_with = "null_as_default")]
    pub available_modes: AvailableModes,
}

/// Kind of sensor reporting a reading
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorType {
    Outdoor,
    Return,
    Remote,
    Supply,
    /// Type string not known to this library
    Other(String),
}

impl From<String> for SensorType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Outdoor" => SensorType::Outdoor,
            "Return" => SensorType::Return,
            "Remote" => SensorType::Remote,
            "Supply" => SensorType::Supply,
            _ => SensorType::Other(value),
        }
    }
}

impl From<SensorType> for String {
    fn from(value: SensorType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorType::Outdoor => f.write_str("Outdoor"),
            SensorType::Return => f.write_str("Return"),
            SensorType::Remote => f.write_str("Remote"),
            SensorType::Supply => f.write_str("Supply"),
            SensorType::Other(other) => f.write_str(other),
        }
    }
}

/// A single sensor reading from `/query/sensors`
///
/// Only the readings a sensor supports are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub temp: Option<Temperature>,
    #[serde(default, rename = "hum")]
    pub humidity: Option<f64>,
    #[serde(default, rename = "intensity")]
    pub light: Option<f64>,
    #[serde(default, rename = "iaq")]
    pub indoor_air_quality: Option<f64>,
    #[serde(default, rename = "co2")]
    pub co2_ppm: Option<f64>,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default, rename = "type")]
    pub sensor_type: Option<SensorType>,
}

/// A named alert flag from `/query/alerts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
}

/// One runtime sample from `/query/runtimes`
///
/// Stage values are minutes of runtime within the sample period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeInfo {
    /// Unix timestamp of the sample
    #[serde(rename = "ts", deserialize_with = "null_as_default")]
    pub timestamp: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub heat: f64,
    #[serde(rename = "heat1", deserialize_with = "null_as_default")]
    pub heat_stage1: f64,
    #[serde(rename = "heat2", deserialize_with = "null_as_default")]
    pub heat_stage2: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cool: f64,
    #[serde(rename = "cool1", deserialize_with = "null_as_default")]
    pub cool_stage1: f64,
    #[serde(rename = "cool2", deserialize_with = "null_as_default")]
    pub cool_stage2: f64,
    #[serde(rename = "aux1", deserialize_with = "null_as_default")]
    pub auxiliary_stage1: f64,
    #[serde(rename = "aux2", deserialize_with = "null_as_default")]
    pub auxiliary_stage2: f64,
    #[serde(rename = "fc", deserialize_with = "null_as_default")]
    pub free_cooling: f64,
    #[serde(rename = "ov", deserialize_with = "null_as_default")]
    pub override_time: f64,
    #[serde(rename = "filterHours", deserialize_with = "null_as_default")]
    pub filter_hours: f64,
    #[serde(rename = "filterDays", deserialize_with = "null_as_default")]
    pub filter_days: f64,
}
