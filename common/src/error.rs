use thiserror::Error;

use crate::types::SensorKind;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConversionError {
    #[error("raw thermistor reading {raw} is outside the convertible range 1..=1022")]
    OutOfRange { raw: u16 },
    #[error("thermistor model produced a non-finite temperature for raw reading {raw}")]
    NonFinite { raw: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("failed to sample {} channel: {reason}", .sensor.as_str())]
    ReadFailed { sensor: SensorKind, reason: String },
}

impl SensorError {
    pub fn read_failed(sensor: SensorKind, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            sensor,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadioError {
    #[error("association with `{ssid}` failed: {reason}")]
    AssociationFailed { ssid: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radio_error_names_the_network() {
        let err = RadioError::AssociationFailed {
            ssid: "lab".to_string(),
            reason: "beacon timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "association with `lab` failed: beacon timeout"
        );
    }
}
