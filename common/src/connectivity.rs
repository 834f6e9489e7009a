use std::net::Ipv4Addr;

use log::{info, warn};

use crate::{
    actuation::ActuatorState,
    config::{ConnectivityConfig, NetworkConfig},
    ports::{ActuatorPort, ClockPort, RadioPort},
    types::ConnectivityState,
};

/// Owns the WiFi association state. Reconnection blocks until the radio
/// confirms; there is no attempt limit.
#[derive(Debug, Clone)]
pub struct ConnectivityManager {
    config: ConnectivityConfig,
    ssid: String,
    password: String,
    state: ConnectivityState,
    local_ip: Option<Ipv4Addr>,
    total_attempts: u64,
    reconnects: u64,
}

impl ConnectivityManager {
    pub fn new(config: ConnectivityConfig, network: &NetworkConfig) -> Self {
        Self {
            config,
            ssid: network.wifi_ssid.clone(),
            password: network.wifi_pass.clone(),
            state: ConnectivityState::Disconnected,
            local_ip: None,
            total_attempts: 0,
            reconnects: 0,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectivityState::Connected
    }

    pub fn local_ip(&self) -> Option<Ipv4Addr> {
        self.local_ip
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Associates with the configured network, blinking the LED between
    /// failed attempts. Returns the number of association requests it took.
    pub fn connect<B>(&mut self, hw: &mut B, led: &mut ActuatorState) -> u32
    where
        B: RadioPort + ActuatorPort + ClockPort,
    {
        let resume_level = led.brightness();
        led.write(hw, 0);
        self.state = ConnectivityState::Connecting;
        self.local_ip = None;
        info!("attempting connection to wifi `{}`", self.ssid);

        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            self.total_attempts = self.total_attempts.saturating_add(1);

            match hw.associate(&self.ssid, &self.password) {
                Ok(()) => break,
                Err(err) => {
                    led.write(hw, self.config.blink_brightness);
                    hw.delay_ms(self.config.blink_ms);
                    warn!("wifi attempt {attempts} failed ({err}); retrying");
                    led.write(hw, 0);
                    hw.delay_ms(self.config.blink_ms);
                }
            }
        }

        self.state = ConnectivityState::Connected;
        self.local_ip = hw.local_ip();
        match self.local_ip {
            Some(ip) => info!("connected to wifi after {attempts} attempt(s), ip {ip}"),
            None => info!("connected to wifi after {attempts} attempt(s), no ip yet"),
        }

        led.write(hw, resume_level);
        attempts
    }

    /// Liveness check run at the top of every cycle.
    pub fn ensure_connected<B>(&mut self, hw: &mut B, led: &mut ActuatorState)
    where
        B: RadioPort + ActuatorPort + ClockPort,
    {
        if self.is_connected() && hw.is_associated() {
            return;
        }

        if self.is_connected() {
            warn!("disconnected from wifi; reconnecting");
            self.reconnects = self.reconnects.saturating_add(1);
        }
        self.state = ConnectivityState::Disconnected;
        self.connect(hw, led);
    }
}
