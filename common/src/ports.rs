//! Hardware capabilities the monitor core drives.
//!
//! The firmware binary implements these against real peripherals; the host
//! simulator and the tests implement them in memory. [`Board`] bundles them so
//! the control loop takes a single `&mut impl Board`.

use std::{io, net::Ipv4Addr};

use crate::{
    error::{RadioError, SensorError},
    types::{SensorFrame, SensorKind},
};

pub trait SensorPort {
    /// Samples one analog channel, normalized to the 10-bit range `0..=1023`.
    fn read_raw(&mut self, sensor: SensorKind) -> Result<u16, SensorError>;

    fn read_frame(&mut self) -> Result<SensorFrame, SensorError> {
        Ok(SensorFrame {
            sound: self.read_raw(SensorKind::Sound)?,
            light: self.read_raw(SensorKind::Light)?,
            temperature: self.read_raw(SensorKind::Temperature)?,
            rotary: self.read_raw(SensorKind::Rotary)?,
        })
    }
}

pub trait ActuatorPort {
    /// Drives the LED PWM output, 0 = off, 255 = full brightness.
    fn write_led(&mut self, level: u8);

    fn start_tone(&mut self, frequency_hz: u32);

    fn stop_tone(&mut self);
}

pub trait RadioPort {
    /// Requests association and blocks until the driver reports the outcome.
    fn associate(&mut self, ssid: &str, password: &str) -> Result<(), RadioError>;

    fn is_associated(&mut self) -> bool;

    fn local_ip(&self) -> Option<Ipv4Addr>;
}

pub trait TransportPort {
    /// Closing happens when the connection is dropped.
    type Connection: io::Write;

    fn open(&mut self, host: &str, port: u16) -> io::Result<Self::Connection>;
}

pub trait ClockPort {
    fn uptime_ms(&self) -> u64;

    /// Blocks the whole device for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u64);
}

pub trait Board: SensorPort + ActuatorPort + RadioPort + TransportPort + ClockPort {}

impl<T> Board for T where T: SensorPort + ActuatorPort + RadioPort + TransportPort + ClockPort {}
