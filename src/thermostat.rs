use crate::connection::Connection;
use crate::error::{Result, VenstarError};
use crate::protocol::{
    validate_setpoints, AlertsResponse, ControlMessage, Endpoint, RuntimesResponse,
    SensorsResponse, SettingsMessage,
};
use crate::types::{
    AlertInfo, AwayState, FanSetting, RuntimeInfo, ScheduleState, SensorInfo, TempUnits,
    Temperature, ThermostatInfo, ThermostatMode,
};
use std::collections::BTreeMap;
use url::Url;

/// Control session for one thermostat
///
/// Holds only the device's base address and an HTTP client, so it is cheap
/// to clone and safe to share between tasks.
///
/// Every mutation reads the full thermostat state, revises the relevant
/// fields and posts the result. The read and the write are not atomic: a
/// change made to the same device by anyone else in between is silently
/// overwritten, and concurrent mutations of one device through this type
/// race in the same way.
#[derive(Debug, Clone)]
pub struct Thermostat {
    connection: Connection,
}

impl Thermostat {
    /// Session for the thermostat at `base_url`, with a default HTTP client
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Session using a caller-supplied HTTP client
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self {
            connection: Connection::new(base_url, client),
        }
    }

    /// Base address every request is resolved against
    pub fn base_url(&self) -> &Url {
        self.connection.base_url()
    }

    /// Read the full thermostat state
    pub async fn info(&self) -> Result<ThermostatInfo> {
        self.connection.get(Endpoint::Info).await
    }

    /// Read all sensors, keyed by sensor name
    pub async fn sensors(&self) -> Result<BTreeMap<String, SensorInfo>> {
        let response: SensorsResponse = self.connection.get(Endpoint::Sensors).await?;
        Ok(response
            .sensors
            .into_iter()
            .map(|sensor| (sensor.name.clone(), sensor))
            .collect())
    }

    /// Read all alert flags, keyed by alert name
    pub async fn alerts(&self) -> Result<BTreeMap<String, AlertInfo>> {
        let response: AlertsResponse = self.connection.get(Endpoint::Alerts).await?;
        Ok(response
            .alerts
            .into_iter()
            .map(|alert| (alert.name.clone(), alert))
            .collect())
    }

    /// Read the runtime history
    pub async fn runtimes(&self) -> Result<Vec<RuntimeInfo>> {
        let response: RuntimesResponse = self.connection.get(Endpoint::Runtimes).await?;
        Ok(response.runtimes)
    }

    /// Change the operating mode, leaving setpoints as they are
    pub async fn set_mode(&self, mode: ThermostatMode) -> Result<()> {
        self.control(|info| info.control_message().with_mode(mode))
            .await
    }

    /// Change the fan setting, leaving mode and setpoints as they are
    pub async fn set_fan_mode(&self, fan: FanSetting) -> Result<()> {
        self.control(|info| info.control_message().with_fan(fan)).await
    }

    /// Set the heating setpoint
    ///
    /// Auto and heat modes are kept; any other mode switches to heat.
    pub async fn set_heat_temp(&self, temp: Temperature) -> Result<()> {
        self.control(|info| {
            info.control_message()
                .with_mode(heating_mode(info.mode))
                .with_heat_temp(temp)
        })
        .await
    }

    /// Set the cooling setpoint
    ///
    /// Auto and cool modes are kept; any other mode switches to cool.
    pub async fn set_cool_temp(&self, temp: Temperature) -> Result<()> {
        self.control(|info| {
            info.control_message()
                .with_mode(cooling_mode(info.mode))
                .with_cool_temp(temp)
        })
        .await
    }

    /// Set both setpoints and switch to auto mode
    ///
    /// The lower value becomes the heat setpoint. The pair must be at least
    /// two degrees apart; if not, nothing is sent to the device.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use venstar::Thermostat;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let thermostat = Thermostat::new("http://192.168.1.50/".parse()?);
    ///     thermostat.set_heat_cool_temps(68.0, 76.0).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn set_heat_cool_temps(&self, heat: Temperature, cool: Temperature) -> Result<()> {
        let (heat, cool) = if heat > cool { (cool, heat) } else { (heat, cool) };
        validate_setpoints(heat, cool)?;

        self.control(|info| {
            info.control_message()
                .with_mode(ThermostatMode::Auto)
                .with_heat_temp(heat)
                .with_cool_temp(cool)
        })
        .await
    }

    /// Switch between Fahrenheit and Celsius
    pub async fn set_temp_units(&self, units: TempUnits) -> Result<()> {
        self.settings(|info| info.settings_message().with_temp_units(units))
            .await
    }

    /// Mark the building home or away
    pub async fn set_away(&self, away: AwayState) -> Result<()> {
        self.settings(|info| info.settings_message().with_away(away))
            .await
    }

    /// Enable or disable the programmed schedule
    pub async fn set_schedule(&self, schedule: ScheduleState) -> Result<()> {
        self.settings(|info| info.settings_message().with_schedule(schedule))
            .await
    }

    /// Set the humidify setpoint (percent relative humidity)
    pub async fn set_humidify_setpoint(&self, setpoint: f64) -> Result<()> {
        self.settings(|info| info.settings_message().with_humidify_setpoint(setpoint))
            .await
    }

    /// Set the dehumidify setpoint (percent relative humidity)
    pub async fn set_dehumidify_setpoint(&self, setpoint: f64) -> Result<()> {
        self.settings(|info| info.settings_message().with_dehumidify_setpoint(setpoint))
            .await
    }

    /// Read the state every mutation starts from
    async fn snapshot(&self) -> Result<ThermostatInfo> {
        self.info()
            .await
            .map_err(|e| VenstarError::Snapshot(Box::new(e)))
    }

    async fn control(&self, revise: impl FnOnce(&ThermostatInfo) -> ControlMessage) -> Result<()> {
        let info = self.snapshot().await?;
        let msg = revise(&info);
        msg.validate()?;

        tracing::info!(
            "Setting {} to mode {}, heat {}, cool {}, fan {}",
            self.base_url(),
            msg.mode,
            msg.heat_temp,
            msg.cool_temp,
            msg.fan
        );
        self.connection.post_form(Endpoint::Control, &msg).await
    }

    async fn settings(&self, revise: impl FnOnce(&ThermostatInfo) -> SettingsMessage) -> Result<()> {
        let info = self.snapshot().await?;
        let msg = revise(&info);

        tracing::info!("Updating settings on {}: {:?}", self.base_url(), msg);
        self.connection.post_form(Endpoint::Settings, &msg).await
    }
}

/// Mode to use when only the heat setpoint changes
fn heating_mode(current: ThermostatMode) -> ThermostatMode {
    match current {
        ThermostatMode::Auto | ThermostatMode::Heat => current,
        _ => ThermostatMode::Heat,
    }
}

/// Mode to use when only the cool setpoint changes
fn cooling_mode(current: ThermostatMode) -> ThermostatMode {
    match current {
        ThermostatMode::Auto | ThermostatMode::Cool => current,
        _ => ThermostatMode::Cool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_setpoint_keeps_auto_and_heat() {
        assert_eq!(heating_mode(ThermostatMode::Auto), ThermostatMode::Auto);
        assert_eq!(heating_mode(ThermostatMode::Heat), ThermostatMode::Heat);
        assert_eq!(heating_mode(ThermostatMode::Cool), ThermostatMode::Heat);
        assert_eq!(heating_mode(ThermostatMode::Off), ThermostatMode::Heat);
        assert_eq!(heating_mode(ThermostatMode::Unknown(6)), ThermostatMode::Heat);
    }

    #[test]
    fn cool_setpoint_keeps_auto_and_cool() {
        assert_eq!(cooling_mode(ThermostatMode::Auto), ThermostatMode::Auto);
        assert_eq!(cooling_mode(ThermostatMode::Cool), ThermostatMode::Cool);
        assert_eq!(cooling_mode(ThermostatMode::Heat), ThermostatMode::Cool);
        assert_eq!(cooling_mode(ThermostatMode::Off), ThermostatMode::Cool);
    }
}
