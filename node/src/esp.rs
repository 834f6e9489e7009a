use std::{
    io,
    net::{Ipv4Addr, TcpStream},
    rc::Rc,
    time::Instant,
};

use anyhow::{anyhow, Context};
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::{
    adc::{
        attenuation::DB_11,
        oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
        ADCPin, ADC1,
    },
    delay::FreeRtos,
    gpio::{Gpio34, Gpio35, Gpio36, Gpio39},
    ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution},
    modem::Modem,
    peripherals::Peripherals,
    prelude::*,
};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    log::EspLogger,
    nvs::EspDefaultNvsPartition,
    wifi::{BlockingWifi, EspWifi},
};
use log::{info, warn};

use envmon_common::{
    ActuatorPort, ClockPort, Monitor, NetworkConfig, RadioError, RadioPort, SensorError,
    SensorKind, SensorPort, TransportPort,
};

use crate::{defaults::compiled_config, transport::TcpTransport};

// Pin map: analog sensors on ADC1 input-only pins, LED on GPIO2, buzzer on GPIO4.
const LED_PWM_HZ: u32 = 5_000;
const BUZZER_FREQUENCY_HZ: u32 = 1_000;
// The ESP32 ADC is 12-bit; the monitor works in 10-bit counts.
const ADC_DOWNSHIFT: u16 = 2;

type Adc = Rc<AdcDriver<'static, ADC1>>;
type Channel<P> = AdcChannelDriver<'static, P, Adc>;

struct AnalogChannels {
    sound: Channel<Gpio36>,
    light: Channel<Gpio39>,
    temperature: Channel<Gpio34>,
    rotary: Channel<Gpio35>,
}

struct EspBoard {
    analog: AnalogChannels,
    led: LedcDriver<'static>,
    buzzer: LedcDriver<'static>,
    wifi: BlockingWifi<EspWifi<'static>>,
    transport: TcpTransport,
    started: Instant,
    power_save_disabled: bool,
}

fn sample<P>(channel: &mut Channel<P>, sensor: SensorKind) -> Result<u16, SensorError>
where
    P: ADCPin<Adc = ADC1>,
{
    channel
        .read_raw()
        .map(|raw| raw >> ADC_DOWNSHIFT)
        .map_err(|err| SensorError::read_failed(sensor, format!("{err:?}")))
}

impl SensorPort for EspBoard {
    fn read_raw(&mut self, sensor: SensorKind) -> Result<u16, SensorError> {
        match sensor {
            SensorKind::Sound => sample(&mut self.analog.sound, sensor),
            SensorKind::Light => sample(&mut self.analog.light, sensor),
            SensorKind::Temperature => sample(&mut self.analog.temperature, sensor),
            SensorKind::Rotary => sample(&mut self.analog.rotary, sensor),
        }
    }
}

impl ActuatorPort for EspBoard {
    fn write_led(&mut self, level: u8) {
        let duty = u32::from(level) * self.led.get_max_duty() / 255;
        if let Err(err) = self.led.set_duty(duty) {
            warn!("failed to set led duty {duty}: {err:?}");
        }
    }

    fn start_tone(&mut self, frequency_hz: u32) {
        if frequency_hz != BUZZER_FREQUENCY_HZ {
            warn!("buzzer timer fixed at {BUZZER_FREQUENCY_HZ} Hz, ignoring {frequency_hz} Hz");
        }
        let duty = self.buzzer.get_max_duty() / 2;
        if let Err(err) = self.buzzer.set_duty(duty) {
            warn!("failed to start buzzer: {err:?}");
        }
    }

    fn stop_tone(&mut self) {
        if let Err(err) = self.buzzer.set_duty(0) {
            warn!("failed to silence buzzer: {err:?}");
        }
    }
}

impl RadioPort for EspBoard {
    fn associate(&mut self, ssid: &str, _password: &str) -> Result<(), RadioError> {
        let result = self
            .wifi
            .connect()
            .and_then(|()| self.wifi.wait_netif_up());

        match result {
            Ok(()) => {
                if !self.power_save_disabled {
                    disable_wifi_power_save();
                    self.power_save_disabled = true;
                }
                Ok(())
            }
            Err(err) => {
                let _ = self.wifi.disconnect();
                Err(RadioError::AssociationFailed {
                    ssid: ssid.to_string(),
                    reason: format!("{err:?}"),
                })
            }
        }
    }

    fn is_associated(&mut self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }
}

impl TransportPort for EspBoard {
    type Connection = TcpStream;

    fn open(&mut self, host: &str, port: u16) -> io::Result<Self::Connection> {
        self.transport.open(host, port)
    }
}

impl ClockPort for EspBoard {
    fn uptime_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn delay_ms(&mut self, ms: u64) {
        FreeRtos::delay_ms(u32::try_from(ms).unwrap_or(u32::MAX));
    }
}

pub fn run() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let config = compiled_config();
    if !config.network.has_station_credentials() {
        warn!("no wifi ssid compiled in; association will keep failing");
    }

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let adc: Adc = Rc::new(AdcDriver::new(peripherals.adc1).context("failed to init ADC1")?);
    let channel_config = AdcChannelConfig {
        attenuation: DB_11,
        ..Default::default()
    };
    let analog = AnalogChannels {
        sound: AdcChannelDriver::new(adc.clone(), pins.gpio36, &channel_config)?,
        light: AdcChannelDriver::new(adc.clone(), pins.gpio39, &channel_config)?,
        temperature: AdcChannelDriver::new(adc.clone(), pins.gpio34, &channel_config)?,
        rotary: AdcChannelDriver::new(adc, pins.gpio35, &channel_config)?,
    };

    let led_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(LED_PWM_HZ.Hz())
            .resolution(Resolution::Bits8),
    )
    .context("failed to init led timer")?;
    let led = LedcDriver::new(peripherals.ledc.channel0, led_timer, pins.gpio2)
        .context("failed to init led channel")?;

    let buzzer_timer = LedcTimerDriver::new(
        peripherals.ledc.timer1,
        &TimerConfig::default()
            .frequency(BUZZER_FREQUENCY_HZ.Hz())
            .resolution(Resolution::Bits10),
    )
    .context("failed to init buzzer timer")?;
    let mut buzzer = LedcDriver::new(peripherals.ledc.channel1, buzzer_timer, pins.gpio4)
        .context("failed to init buzzer channel")?;
    buzzer.set_duty(0)?;

    let wifi = start_station(peripherals.modem, sys_loop, nvs_partition, &config.network)
        .context("wifi startup failed")?;

    let mut board = EspBoard {
        analog,
        led,
        buzzer,
        wifi,
        transport: TcpTransport::default(),
        started: Instant::now(),
        power_save_disabled: false,
    };

    info!("monitor firmware started");
    let mut monitor = Monitor::new(config);
    monitor.run(&mut board)
}

fn start_station(
    modem: Modem,
    sys_loop: EspSystemEventLoop,
    nvs_partition: EspDefaultNvsPartition,
    network: &NetworkConfig,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs_partition))?;
    let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;

    let auth_method = if network.wifi_pass.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPAWPA2Personal
    };

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: network
            .wifi_ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi ssid too long"))?,
        password: network
            .wifi_pass
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("wifi started for `{}`", network.wifi_ssid);
    Ok(wifi)
}

fn disable_wifi_power_save() {
    let rc = unsafe { esp_idf_svc::sys::esp_wifi_set_ps(0) };
    if rc == esp_idf_svc::sys::ESP_OK {
        info!("wifi power save disabled");
    } else {
        warn!("failed to disable wifi power save: esp_err_t={rc}");
    }
}
