use log::debug;

use crate::{error::ConversionError, types::ADC_MAX};

/// Thermistor beta coefficient.
pub const THERMISTOR_B: f32 = 4275.0;
/// Thermistor resistance at the reference temperature, in ohms.
pub const THERMISTOR_R0: f32 = 100_000.0;
/// Reference temperature (25 °C) in kelvin.
pub const THERMISTOR_T0_K: f32 = 298.15;

const KELVIN_OFFSET: f32 = 273.15;

/// Converts a raw thermistor divider reading to degrees Celsius.
///
/// The divider model `R = R0 * (1023 / raw - 1)` divides by zero at `raw == 0`
/// and yields a non-positive resistance from `raw == 1023` upwards, so both ends
/// are rejected instead of producing NaN or infinity.
pub fn convert_temperature(raw: u16) -> Result<f32, ConversionError> {
    if raw == 0 || raw >= ADC_MAX {
        return Err(ConversionError::OutOfRange { raw });
    }

    let resistance = (f32::from(ADC_MAX) / f32::from(raw) - 1.0) * THERMISTOR_R0;
    let inv_t = (resistance / THERMISTOR_R0).ln() / THERMISTOR_B + 1.0 / THERMISTOR_T0_K;
    let celsius = 1.0 / inv_t - KELVIN_OFFSET;

    if !celsius.is_finite() {
        return Err(ConversionError::NonFinite { raw });
    }

    debug!("converted temperature: raw={raw} -> {celsius:.2}°C");
    Ok(celsius)
}

/// Whole degrees used by the alert rules and sent on the wire (truncates toward zero).
pub fn whole_degrees(celsius: f32) -> i32 {
    celsius as i32
}
