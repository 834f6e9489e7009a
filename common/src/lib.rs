pub mod actuation;
pub mod config;
pub mod connectivity;
pub mod control;
pub mod convert;
pub mod error;
pub mod policy;
pub mod ports;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod fake;

pub use actuation::{brightness_from_rotary, ActuationController, ActuatorState};
pub use config::{ConnectivityConfig, MonitorConfig, NetworkConfig, RotaryCalibration, Thresholds};
pub use connectivity::ConnectivityManager;
pub use control::{CycleOutcome, Monitor};
pub use convert::{convert_temperature, whole_degrees};
pub use error::{ConversionError, RadioError, SensorError};
pub use policy::{PeriodicSchedule, PolicyAction};
pub use ports::{ActuatorPort, Board, ClockPort, RadioPort, SensorPort, TransportPort};
pub use telemetry::{ReportOutcome, TelemetryReporter};
pub use types::{
    ConnectivityState, SensorFrame, SensorKind, TelemetryField, TelemetryRecord, ADC_MAX,
};
