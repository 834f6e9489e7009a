use log::{debug, info, warn};

use crate::{
    actuation::{ActuationController, ActuatorState},
    config::MonitorConfig,
    connectivity::ConnectivityManager,
    convert::{convert_temperature, whole_degrees},
    policy::{sound_rule, temperature_band_rule, PeriodicSchedule, PolicyAction},
    ports::Board,
    telemetry::TelemetryReporter,
    types::SensorFrame,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    Completed {
        frame: SensorFrame,
        temperature_c: Option<f32>,
    },
    /// A channel could not be sampled; nothing past the connectivity check ran.
    SensorFault,
}

/// The device context: every piece of state that lives across loop cycles.
#[derive(Debug, Clone)]
pub struct Monitor {
    config: MonitorConfig,
    link: ConnectivityManager,
    actuators: ActuatorState,
    actuation: ActuationController,
    reporter: TelemetryReporter,
    periodic: PeriodicSchedule,
    cycles: u64,
}

impl Monitor {
    pub fn new(mut config: MonitorConfig) -> Self {
        config.sanitize();

        let link = ConnectivityManager::new(config.connectivity.clone(), &config.network);
        let actuators = ActuatorState::new(config.connectivity.initial_brightness);
        let actuation = ActuationController::new(
            config.rotary.clone(),
            config.thresholds.buzzer_frequency_hz,
        );
        let reporter = TelemetryReporter::new(&config.network);
        let periodic = PeriodicSchedule::new(config.thresholds.periodic_interval_secs);

        Self {
            config,
            link,
            actuators,
            actuation,
            reporter,
            periodic,
            cycles: 0,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn link(&self) -> &ConnectivityManager {
        &self.link
    }

    pub fn reporter(&self) -> &TelemetryReporter {
        &self.reporter
    }

    pub fn brightness(&self) -> u8 {
        self.actuators.brightness()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Initial blocking connect, before the first cycle.
    pub fn startup(&mut self, hw: &mut impl Board) {
        info!(
            "monitor starting: sound>{} band=[{}, {}]°C periodic={}s",
            self.config.thresholds.sound_threshold,
            self.config.thresholds.temp_low_c,
            self.config.thresholds.temp_high_c,
            self.config.thresholds.periodic_interval_secs
        );
        self.link.connect(hw, &mut self.actuators);
    }

    pub fn run(&mut self, hw: &mut impl Board) -> ! {
        self.startup(hw);
        loop {
            self.run_cycle(hw);
        }
    }

    pub fn run_cycle(&mut self, hw: &mut impl Board) -> CycleOutcome {
        self.cycles = self.cycles.saturating_add(1);

        self.link.ensure_connected(hw, &mut self.actuators);

        let frame = match hw.read_frame() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("skipping cycle {}: {err}", self.cycles);
                return CycleOutcome::SensorFault;
            }
        };
        debug!(
            "cycle {}: sound={} light={} temperature={} rotary={}",
            self.cycles, frame.sound, frame.light, frame.temperature, frame.rotary
        );

        let temperature_c = match convert_temperature(frame.temperature) {
            Ok(celsius) => Some(celsius),
            Err(err) => {
                warn!("temperature rules skipped this cycle: {err}");
                None
            }
        };

        let uptime_secs = hw.uptime_ms() / 1_000;
        let actions = match temperature_c {
            Some(celsius) => {
                self.periodic
                    .rule(uptime_secs, whole_degrees(celsius), &self.config.thresholds)
            }
            None => self.settle_only(),
        };
        self.apply(hw, actions);

        self.actuation
            .set_brightness_from_rotary(hw, &mut self.actuators, frame.rotary);
        self.apply(hw, sound_rule(frame.sound, &self.config.thresholds));

        let actions = match temperature_c {
            Some(celsius) => temperature_band_rule(whole_degrees(celsius), &self.config.thresholds),
            None => self.settle_only(),
        };
        self.apply(hw, actions);

        CycleOutcome::Completed {
            frame,
            temperature_c,
        }
    }

    /// Settle delay of a rule skipped for a rejected reading.
    fn settle_only(&self) -> Vec<PolicyAction> {
        vec![PolicyAction::Delay(self.config.thresholds.rule_settle_ms)]
    }

    fn apply(&mut self, hw: &mut impl Board, actions: Vec<PolicyAction>) {
        for action in actions {
            match action {
                PolicyAction::SoundAlarm { duration_ms } => {
                    self.actuation
                        .sound_alarm(hw, &mut self.reporter, &self.link, duration_ms);
                }
                PolicyAction::Report(record) => {
                    self.reporter.report(hw, &self.link, record);
                }
                PolicyAction::Delay(ms) => hw.delay_ms(ms),
            }
        }
    }
}
