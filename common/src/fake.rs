//! In-memory board used by the unit tests. Delays advance a simulated clock.

use std::{cell::RefCell, io, net::Ipv4Addr, rc::Rc};

use crate::{
    error::{RadioError, SensorError},
    ports::{ActuatorPort, ClockPort, RadioPort, SensorPort, TransportPort},
    types::{SensorFrame, SensorKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Led(u8),
    ToneOn(u32),
    ToneOff,
}

pub struct FakeBoard {
    pub frame: SensorFrame,
    pub outputs: Vec<Output>,
    pub failures_before_association: u32,
    pub associate_calls: u32,
    pub associated: bool,
    pub refuse_connections: bool,
    pub opened: Vec<(String, u16)>,
    pub requests: Rc<RefCell<Vec<String>>>,
    pub now_ms: u64,
    pub delays: Vec<u64>,
    pub fail_sensor: Option<SensorKind>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self {
            frame: SensorFrame {
                sound: 100,
                light: 400,
                temperature: 512,
                rotary: 0,
            },
            outputs: Vec::new(),
            failures_before_association: 0,
            associate_calls: 0,
            associated: false,
            refuse_connections: false,
            opened: Vec::new(),
            requests: Rc::new(RefCell::new(Vec::new())),
            now_ms: 0,
            delays: Vec::new(),
            fail_sensor: None,
        }
    }

    pub fn online() -> Self {
        let mut board = Self::new();
        board.associated = true;
        board
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn led_writes(&self) -> Vec<u8> {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Led(level) => Some(*level),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeConnection {
    buffer: Vec<u8>,
    sink: Rc<RefCell<Vec<String>>>,
}

impl io::Write for FakeConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        let request = String::from_utf8_lossy(&self.buffer).into_owned();
        self.sink.borrow_mut().push(request);
    }
}

impl SensorPort for FakeBoard {
    fn read_raw(&mut self, sensor: SensorKind) -> Result<u16, SensorError> {
        if self.fail_sensor == Some(sensor) {
            return Err(SensorError::read_failed(sensor, "adc timeout"));
        }
        Ok(self.frame.get(sensor))
    }
}

impl ActuatorPort for FakeBoard {
    fn write_led(&mut self, level: u8) {
        self.outputs.push(Output::Led(level));
    }

    fn start_tone(&mut self, frequency_hz: u32) {
        self.outputs.push(Output::ToneOn(frequency_hz));
    }

    fn stop_tone(&mut self) {
        self.outputs.push(Output::ToneOff);
    }
}

impl RadioPort for FakeBoard {
    fn associate(&mut self, ssid: &str, _password: &str) -> Result<(), RadioError> {
        self.associate_calls += 1;
        if self.failures_before_association > 0 {
            self.failures_before_association -= 1;
            return Err(RadioError::AssociationFailed {
                ssid: ssid.to_string(),
                reason: "no ap found".to_string(),
            });
        }
        self.associated = true;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.associated
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.associated.then_some(Ipv4Addr::new(192, 168, 1, 42))
    }
}

impl TransportPort for FakeBoard {
    type Connection = FakeConnection;

    fn open(&mut self, host: &str, port: u16) -> io::Result<Self::Connection> {
        if self.refuse_connections {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "endpoint unreachable",
            ));
        }
        self.opened.push((host.to_string(), port));
        Ok(FakeConnection {
            buffer: Vec::new(),
            sink: Rc::clone(&self.requests),
        })
    }
}

impl ClockPort for FakeBoard {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u64) {
        self.delays.push(ms);
        self.now_ms += ms;
    }
}
