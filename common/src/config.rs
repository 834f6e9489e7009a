use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub sound_threshold: u16,
    pub temp_low_c: i32,
    pub temp_high_c: i32,
    pub periodic_interval_secs: u64,
    pub buzzer_hold_ms: u64,
    pub buzzer_frequency_hz: u32,
    pub rule_settle_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sound_threshold: 750,
            temp_low_c: 0,
            temp_high_c: 50,
            periodic_interval_secs: 600,
            buzzer_hold_ms: 1_000,
            buzzer_frequency_hz: 1_000,
            rule_settle_ms: 500,
        }
    }
}

/// Reference constants of the rotary angle sensor voltage model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotaryCalibration {
    pub ref_voltage: f32,
    pub full_angle_deg: f32,
    pub supply_voltage: f32,
}

impl Default for RotaryCalibration {
    fn default() -> Self {
        Self {
            ref_voltage: 5.0,
            full_angle_deg: 300.0,
            supply_voltage: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub blink_ms: u64,
    pub blink_brightness: u8,
    pub initial_brightness: u8,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            blink_ms: 500,
            blink_brightness: 1,
            initial_brightness: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub ingest_host: String,
    pub ingest_port: u16,
    pub api_key: String,
    pub send_linger_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_pass: String::new(),
            ingest_host: "api.thingspeak.com".to_string(),
            ingest_port: 80,
            api_key: String::new(),
            send_linger_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub rotary: RotaryCalibration,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Thresholds {
    pub fn sanitize(&mut self) {
        if self.temp_low_c > self.temp_high_c {
            core::mem::swap(&mut self.temp_low_c, &mut self.temp_high_c);
        }

        // A zero interval would make every cycle a periodic boundary.
        self.periodic_interval_secs = self.periodic_interval_secs.max(1);
        self.buzzer_frequency_hz = self.buzzer_frequency_hz.clamp(20, 20_000);
    }
}

impl RotaryCalibration {
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        if !(self.ref_voltage.is_finite() && self.ref_voltage > 0.0) {
            self.ref_voltage = defaults.ref_voltage;
        }
        if !(self.full_angle_deg.is_finite() && self.full_angle_deg > 0.0) {
            self.full_angle_deg = defaults.full_angle_deg;
        }
        if !(self.supply_voltage.is_finite() && self.supply_voltage > 0.0) {
            self.supply_voltage = defaults.supply_voltage;
        }
    }
}

impl NetworkConfig {
    pub fn has_station_credentials(&self) -> bool {
        !self.wifi_ssid.trim().is_empty()
    }

    pub fn sanitize(&mut self) {
        if self.ingest_port == 0 {
            self.ingest_port = 80;
        }
        self.ingest_host = self.ingest_host.trim().to_string();
    }
}

impl MonitorConfig {
    pub fn sanitize(&mut self) {
        self.thresholds.sanitize();
        self.rotary.sanitize();
        self.network.sanitize();
        self.connectivity.blink_ms = self.connectivity.blink_ms.max(1);
    }
}
