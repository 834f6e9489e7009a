use std::{
    io,
    net::{Ipv4Addr, TcpStream},
    path::Path,
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use envmon_common::{
    ActuatorPort, ClockPort, Monitor, MonitorConfig, RadioError, RadioPort, SensorError,
    SensorKind, SensorPort, TransportPort, ADC_MAX,
};

use crate::{defaults::compiled_config, transport::TcpTransport};

/// Simulated sensor traces and radio behavior for a host run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Scenario {
    sound: Vec<u16>,
    light: Vec<u16>,
    temperature: Vec<u16>,
    rotary: Vec<u16>,
    /// Association requests that fail before each successful one.
    failed_associations: u32,
    /// Drop the link every N cycles; 0 keeps it up.
    drop_link_every: u64,
    /// Virtual milliseconds per real millisecond.
    speedup: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            sound: vec![180, 210, 240, 200, 820, 190, 230, 170],
            light: vec![420, 430, 445, 460, 470, 455, 440, 425],
            temperature: vec![500, 505, 510, 515, 520, 515, 510, 505],
            rotary: vec![0, 128, 256, 384, 512, 640, 768, 896, 1023],
            failed_associations: 2,
            drop_link_every: 25,
            speedup: 1,
        }
    }
}

impl Scenario {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let mut scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("invalid scenario {}", path.display()))?;
        scenario.sanitize();
        Ok(scenario)
    }

    fn sanitize(&mut self) {
        let defaults = Scenario::default();
        for (trace, fallback) in [
            (&mut self.sound, defaults.sound),
            (&mut self.light, defaults.light),
            (&mut self.temperature, defaults.temperature),
            (&mut self.rotary, defaults.rotary),
        ] {
            if trace.is_empty() {
                *trace = fallback;
            }
            for value in trace.iter_mut() {
                *value = (*value).min(ADC_MAX);
            }
        }
        self.speedup = self.speedup.max(1);
    }

    fn trace(&self, sensor: SensorKind) -> &[u16] {
        match sensor {
            SensorKind::Sound => &self.sound,
            SensorKind::Light => &self.light,
            SensorKind::Temperature => &self.temperature,
            SensorKind::Rotary => &self.rotary,
        }
    }
}

struct SimBoard {
    scenario: Scenario,
    cycle: u64,
    pending_failures: u32,
    associated: bool,
    led_level: u8,
    tone_hz: Option<u32>,
    transport: TcpTransport,
    started: Instant,
}

impl SimBoard {
    fn new(scenario: Scenario) -> Self {
        Self {
            pending_failures: scenario.failed_associations,
            scenario,
            cycle: 0,
            associated: false,
            led_level: 0,
            tone_hz: None,
            transport: TcpTransport::default(),
            started: Instant::now(),
        }
    }
}

impl SensorPort for SimBoard {
    fn read_raw(&mut self, sensor: SensorKind) -> Result<u16, SensorError> {
        // Sound is sampled first, so it marks the start of a new cycle.
        if sensor == SensorKind::Sound {
            self.cycle = self.cycle.saturating_add(1);
        }

        let trace = self.scenario.trace(sensor);
        if trace.is_empty() {
            return Err(SensorError::read_failed(sensor, "empty trace"));
        }
        let index = (self.cycle.saturating_sub(1) % trace.len() as u64) as usize;
        Ok(trace[index])
    }
}

impl ActuatorPort for SimBoard {
    fn write_led(&mut self, level: u8) {
        if level != self.led_level {
            info!("[led] brightness {} -> {}", self.led_level, level);
        }
        self.led_level = level;
    }

    fn start_tone(&mut self, frequency_hz: u32) {
        info!("[buzzer] on at {frequency_hz} Hz");
        self.tone_hz = Some(frequency_hz);
    }

    fn stop_tone(&mut self) {
        if self.tone_hz.take().is_some() {
            info!("[buzzer] off");
        }
    }
}

impl RadioPort for SimBoard {
    fn associate(&mut self, ssid: &str, _password: &str) -> Result<(), RadioError> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(RadioError::AssociationFailed {
                ssid: ssid.to_string(),
                reason: "simulated beacon timeout".to_string(),
            });
        }

        self.pending_failures = self.scenario.failed_associations;
        self.associated = true;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        let every = self.scenario.drop_link_every;
        if self.associated && every > 0 && self.cycle > 0 && self.cycle % every == 0 {
            warn!("[radio] simulated association loss after cycle {}", self.cycle);
            self.associated = false;
        }
        self.associated
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.associated.then_some(Ipv4Addr::new(192, 168, 4, 20))
    }
}

impl TransportPort for SimBoard {
    type Connection = TcpStream;

    fn open(&mut self, host: &str, port: u16) -> io::Result<Self::Connection> {
        self.transport.open(host, port)
    }
}

impl ClockPort for SimBoard {
    fn uptime_ms(&self) -> u64 {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        elapsed.saturating_mul(self.scenario.speedup)
    }

    fn delay_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms / self.scenario.speedup));
    }
}

fn host_config() -> MonitorConfig {
    let mut config = compiled_config();

    if let Ok(host) = std::env::var("INGEST_HOST") {
        config.network.ingest_host = host;
    } else if option_env!("INGEST_HOST").is_none() {
        config.network.ingest_host = "127.0.0.1".to_string();
    }
    if let Some(port) = std::env::var("INGEST_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
    {
        config.network.ingest_port = port;
    }
    if let Ok(key) = std::env::var("INGEST_API_KEY") {
        config.network.api_key = key;
    }
    if let Ok(ssid) = std::env::var("WIFI_SSID") {
        config.network.wifi_ssid = ssid;
    }

    config
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let scenario = match std::env::var_os("SIM_SCENARIO") {
        Some(path) => Scenario::load(Path::new(&path))?,
        None => Scenario::default(),
    };

    let config = host_config();
    info!(
        "simulated monitor reporting to {}:{} (speedup x{})",
        config.network.ingest_host, config.network.ingest_port, scenario.speedup
    );

    let mut board = SimBoard::new(scenario);
    let mut monitor = Monitor::new(config);
    monitor.run(&mut board)
}
