//! Rust library for discovering and controlling Venstar networked thermostats
//!
//! This library provides an async API for thermostats that speak the Venstar
//! local control protocol. It supports:
//!
//! - Discovery via SSDP multicast search
//! - Reading state, sensors, alerts and runtime history
//! - Mode, fan and setpoint control
//! - Settings: temperature units, away, schedule, humidity setpoints
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Search the local network for two seconds
//!     let mut found = venstar::discover(Duration::from_secs(2)).await?;
//!
//!     while let Some(device) = found.recv().await {
//!         println!("Found thermostat: {}", device);
//!
//!         let thermostat = device.connect();
//!         let info = thermostat.info().await?;
//!         println!("  {} at {}{}", info.mode, info.space_temp, info.temp_units.symbol());
//!
//!         // Heat to 68, cool to 76, auto mode
//!         thermostat.set_heat_cool_temps(68.0, 76.0).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Direct Connection
//!
//! If you know the address of a thermostat, you can skip discovery:
//!
//! ```no_run
//! use venstar::{Thermostat, ThermostatMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let thermostat = Thermostat::new("http://192.168.1.50/".parse()?);
//!     thermostat.set_mode(ThermostatMode::Heat).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Discovery**: SSDP search and the stream of discovered devices
//! - **Descriptor**: parsing of discovery responses into device identities
//! - **Thermostat**: high-level read and read-modify-write control API
//! - **Connection**: low-level HTTP requests against the device
//! - **Protocol**: request messages and acknowledgements
//! - **Form**: form encoding of request messages
//! - **Types**: device state and enumerations

mod connection;
mod descriptor;
mod discovery;
mod error;
pub mod form;
mod protocol;
mod stream;
mod thermostat;
mod types;

// Public exports
pub use descriptor::{DeviceDescriptor, SERVICE_TYPE};
pub use discovery::{
    discover, search_request, Discovery, DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
    SEARCH_TARGET, SSDP_MULTICAST_ADDR,
};
pub use error::{EncodeError, Result, VenstarError};
pub use protocol::{ControlMessage, Endpoint, SettingsMessage, StatusResponse, MIN_SETPOINT_SPREAD};
pub use stream::DiscoveryStream;
pub use thermostat::Thermostat;
pub use types::{
    AlertInfo, AvailableModes, AwayState, DemandStage, FanSetting, FanState,
    ForceUnoccupiedState, HolidayState, HumidifierState, OverrideState, RuntimeInfo,
    SchedulePart, ScheduleState, SensorInfo, SensorType, TempUnits, Temperature,
    ThermostatInfo, ThermostatMode, ThermostatState,
};
