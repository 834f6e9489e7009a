use log::{debug, info};

use crate::{
    config::RotaryCalibration,
    connectivity::ConnectivityManager,
    ports::{ActuatorPort, ClockPort, TransportPort},
    telemetry::TelemetryReporter,
    types::{TelemetryRecord, ADC_MAX},
};

/// Maps a raw rotary reading onto the 0..=255 LED range through the sensor's
/// voltage/angle model.
pub fn brightness_from_rotary(raw: u16, calibration: &RotaryCalibration) -> u8 {
    let adc_steps = f32::from(ADC_MAX) + 1.0;
    let voltage = (f32::from(raw) + 0.5) * calibration.ref_voltage / adc_steps;
    let degrees = voltage * calibration.full_angle_deg / calibration.supply_voltage;
    let level = degrees / calibration.full_angle_deg * 255.0;

    level.clamp(0.0, 255.0) as u8
}

/// LED level most recently written to the output, by whichever component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    brightness: u8,
}

impl ActuatorState {
    pub fn new(initial: u8) -> Self {
        Self {
            brightness: initial,
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn write(&mut self, hw: &mut impl ActuatorPort, level: u8) {
        hw.write_led(level);
        self.brightness = level;
    }
}

#[derive(Debug, Clone)]
pub struct ActuationController {
    calibration: RotaryCalibration,
    buzzer_frequency_hz: u32,
}

impl ActuationController {
    pub fn new(calibration: RotaryCalibration, buzzer_frequency_hz: u32) -> Self {
        Self {
            calibration,
            buzzer_frequency_hz,
        }
    }

    pub fn set_brightness_from_rotary(
        &self,
        hw: &mut impl ActuatorPort,
        state: &mut ActuatorState,
        raw: u16,
    ) -> u8 {
        let level = brightness_from_rotary(raw, &self.calibration);
        if level != state.brightness() {
            debug!("rotary {raw} -> brightness {level}");
        }
        state.write(hw, level);
        level
    }

    /// Holds the buzzer for `duration_ms`, reporting the alert while it sounds.
    pub fn sound_alarm<B>(
        &self,
        hw: &mut B,
        reporter: &mut TelemetryReporter,
        link: &ConnectivityManager,
        duration_ms: u64,
    ) where
        B: ActuatorPort + ClockPort + TransportPort,
    {
        info!(
            "alarm: buzzer {} Hz for {duration_ms} ms",
            self.buzzer_frequency_hz
        );
        hw.start_tone(self.buzzer_frequency_hz);
        hw.delay_ms(duration_ms);
        reporter.report(hw, link, TelemetryRecord::alert());
        hw.stop_tone();
    }
}
