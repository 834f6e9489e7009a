use serde::{Deserialize, Serialize};

/// Full-scale value of the 10-bit ADC range every reading is normalized to.
pub const ADC_MAX: u16 = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Sound,
    Light,
    Temperature,
    Rotary,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [Self::Sound, Self::Light, Self::Temperature, Self::Rotary];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sound => "sound",
            Self::Light => "light",
            Self::Temperature => "temperature",
            Self::Rotary => "rotary",
        }
    }
}

/// All four raw readings captured at the top of one loop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorFrame {
    pub sound: u16,
    pub light: u16,
    pub temperature: u16,
    pub rotary: u16,
}

impl SensorFrame {
    pub fn get(&self, kind: SensorKind) -> u16 {
        match kind {
            SensorKind::Sound => self.sound,
            SensorKind::Light => self.light,
            SensorKind::Temperature => self.temperature,
            SensorKind::Rotary => self.rotary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryField {
    Alert,
    Sound,
    TemperatureOutOfBand,
    PeriodicTemperature,
}

impl TelemetryField {
    /// Query-string key understood by the ingestion channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "field1",
            Self::Sound => "field2",
            Self::TemperatureOutOfBand => "field3",
            Self::PeriodicTemperature => "field4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Sound => "sound",
            Self::TemperatureOutOfBand => "temperature-out-of-band",
            Self::PeriodicTemperature => "periodic-temperature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryRecord {
    pub field: TelemetryField,
    pub value: i32,
}

impl TelemetryRecord {
    pub fn new(field: TelemetryField, value: i32) -> Self {
        Self { field, value }
    }

    pub fn alert() -> Self {
        Self::new(TelemetryField::Alert, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectivityState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectivityState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_are_distinct() {
        let keys = [
            TelemetryField::Alert,
            TelemetryField::Sound,
            TelemetryField::TemperatureOutOfBand,
            TelemetryField::PeriodicTemperature,
        ]
        .map(TelemetryField::as_str);

        assert_eq!(keys, ["field1", "field2", "field3", "field4"]);
    }

    #[test]
    fn frame_lookup_matches_fields() {
        let frame = SensorFrame {
            sound: 1,
            light: 2,
            temperature: 3,
            rotary: 4,
        };

        let values: Vec<u16> = SensorKind::ALL.iter().map(|kind| frame.get(*kind)).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }
}
