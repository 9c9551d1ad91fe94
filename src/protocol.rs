use crate::error::{EncodeError, Result, VenstarError};
use crate::form::{FormEncode, FormField};
use crate::types::{
    AlertInfo, AwayState, FanSetting, RuntimeInfo, ScheduleState, SensorInfo, TempUnits,
    Temperature, ThermostatInfo, ThermostatMode,
};
use serde::{Deserialize, Serialize};

/// Smallest allowed gap between the cool and heat setpoints
pub const MIN_SETPOINT_SPREAD: f64 = 2.0;

/// Device API endpoints, relative to the discovered base address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Info,
    Sensors,
    Alerts,
    Runtimes,
    Control,
    Settings,
}

impl Endpoint {
    /// Path segments appended to the base address
    pub fn segments(self) -> &'static [&'static str] {
        match self {
            Endpoint::Info => &["query", "info"],
            Endpoint::Sensors => &["query", "sensors"],
            Endpoint::Alerts => &["query", "alerts"],
            Endpoint::Runtimes => &["query", "runtimes"],
            Endpoint::Control => &["control"],
            Endpoint::Settings => &["settings"],
        }
    }
}

/// Mode and setpoint change posted to `/control`
///
/// Built from a [`ThermostatInfo`] snapshot and revised with the `with_*`
/// methods, each of which returns a modified copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMessage {
    /// Operating mode
    pub mode: ThermostatMode,
    /// Fan setting
    pub fan: FanSetting,
    /// Heat-to setpoint
    pub heat_temp: Temperature,
    /// Cool-to setpoint
    pub cool_temp: Temperature,
}

impl ControlMessage {
    /// Copy with a different operating mode
    pub fn with_mode(self, mode: ThermostatMode) -> Self {
        Self { mode, ..self }
    }

    /// Copy with a different fan setting
    pub fn with_fan(self, fan: FanSetting) -> Self {
        Self { fan, ..self }
    }

    /// Copy with a different heat setpoint
    pub fn with_heat_temp(self, heat_temp: Temperature) -> Self {
        Self { heat_temp, ..self }
    }

    /// Copy with a different cool setpoint
    pub fn with_cool_temp(self, cool_temp: Temperature) -> Self {
        Self { cool_temp, ..self }
    }

    /// Check that the cool setpoint sits at least two degrees above heat
    pub fn validate(&self) -> Result<()> {
        validate_setpoints(self.heat_temp, self.cool_temp)
    }
}

impl FormEncode for ControlMessage {
    fn form_fields(&self) -> std::result::Result<Vec<FormField>, EncodeError> {
        Ok(vec![
            FormField::new("Mode", self.mode).rename("mode"),
            FormField::new("Fan", self.fan).rename("fan"),
            FormField::new("HeatTemp", self.heat_temp).rename("heattemp"),
            FormField::new("CoolTemp", self.cool_temp).rename("cooltemp"),
        ])
    }
}

/// Check the heat/cool spread without building a message
pub(crate) fn validate_setpoints(heat: Temperature, cool: Temperature) -> Result<()> {
    let spread = cool - heat;
    if spread.is_nan() || spread < MIN_SETPOINT_SPREAD {
        return Err(VenstarError::SetpointSpread { spread });
    }
    Ok(())
}

/// Settings change posted to `/settings`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsMessage {
    /// Display and setpoint units
    pub temp_units: TempUnits,
    /// Home or away
    pub away: AwayState,
    /// Whether the schedule runs
    pub schedule: ScheduleState,
    /// Humidify-to relative humidity
    pub humidify_setpoint: f64,
    /// Dehumidify-to relative humidity
    pub dehumidify_setpoint: f64,
}

impl SettingsMessage {
    /// Copy with different temperature units
    pub fn with_temp_units(self, temp_units: TempUnits) -> Self {
        Self { temp_units, ..self }
    }

    /// Copy with a different away state
    pub fn with_away(self, away: AwayState) -> Self {
        Self { away, ..self }
    }

    /// Copy with the schedule enabled or disabled
    pub fn with_schedule(self, schedule: ScheduleState) -> Self {
        Self { schedule, ..self }
    }

    /// Copy with a different humidify setpoint
    pub fn with_humidify_setpoint(self, humidify_setpoint: f64) -> Self {
        Self {
            humidify_setpoint,
            ..self
        }
    }

    /// Copy with a different dehumidify setpoint
    pub fn with_dehumidify_setpoint(self, dehumidify_setpoint: f64) -> Self {
        Self {
            dehumidify_setpoint,
            ..self
        }
    }
}

impl FormEncode for SettingsMessage {
    fn form_fields(&self) -> std::result::Result<Vec<FormField>, EncodeError> {
        Ok(vec![
            FormField::new("TempUnits", self.temp_units).rename("tempunits"),
            FormField::new("Away", self.away).rename("away"),
            FormField::new("Schedule", self.schedule).rename("schedule"),
            FormField::new("HumidifySetpoint", self.humidify_setpoint).rename("hum_setpoint"),
            FormField::new("DehumidifySetpoint", self.dehumidify_setpoint)
                .rename("dehum_setpoint"),
        ])
    }
}

impl ThermostatInfo {
    /// Seed a control change from this snapshot
    pub fn control_message(&self) -> ControlMessage {
        ControlMessage {
            mode: self.mode,
            fan: self.fan_setting,
            heat_temp: self.heat_temp,
            cool_temp: self.cool_temp,
        }
    }

    /// Seed a settings change from this snapshot
    pub fn settings_message(&self) -> SettingsMessage {
        SettingsMessage {
            temp_units: self.temp_units,
            away: self.away,
            schedule: self.schedule,
            humidify_setpoint: self.humidify_setpoint,
            dehumidify_setpoint: self.dehumidify_setpoint,
        }
    }
}

/// Acknowledgement returned by `/control` and `/settings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub success: bool,
    pub error: bool,
    pub reason: String,
}

impl StatusResponse {
    /// Interpret the acknowledgement
    ///
    /// Only the error flag decides the outcome. A response with both flags
    /// false is a success; the success flag is never consulted.
    pub fn into_result(self) -> Result<()> {
        if self.error {
            return Err(VenstarError::ApiError {
                reason: self.reason,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SensorsResponse {
    #[serde(default)]
    pub sensors: Vec<SensorInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertsResponse {
    #[serde(default)]
    pub alerts: Vec<AlertInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuntimesResponse {
    #[serde(default)]
    pub runtimes: Vec<RuntimeInfo>,
}
