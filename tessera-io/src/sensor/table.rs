//! Table-interpolating thermistor sensor

use tessera_core::traits::{SensorError, TemperatureSensor};
use tessera_hal::AnalogChannel;

/// Piecewise-linear ADC-to-Celsius conversion
///
/// Entries are `(raw, celsius)` pairs sorted by ascending raw value.
/// For an NTC divider with a pull-up the temperatures descend as the raw
/// value rises; the interpolation only assumes raw monotonicity.
#[derive(Debug, Clone, Copy)]
pub struct ConversionTable<'a> {
    entries: &'a [(u16, f32)],
}

impl<'a> ConversionTable<'a> {
    /// Wrap a sorted table; must not be empty
    pub const fn new(entries: &'a [(u16, f32)]) -> Self {
        assert!(!entries.is_empty());
        Self { entries }
    }

    /// Convert a raw sample, clamping outside the table range
    pub fn convert(&self, raw: u16) -> f32 {
        let first = self.entries[0];
        if raw <= first.0 {
            return first.1;
        }
        let last = self.entries[self.entries.len() - 1];
        if raw >= last.0 {
            return last.1;
        }
        for window in self.entries.windows(2) {
            let (r0, t0) = window[0];
            let (r1, t1) = window[1];
            if raw <= r1 {
                let span = f32::from(r1 - r0);
                let frac = f32::from(raw - r0) / span;
                return t0 + (t1 - t0) * frac;
            }
        }
        last.1
    }
}

/// 100k NTC, beta 3950, 4.7k pull-up, 12-bit converter
///
/// Thermistor to ground, pull-up to the reference rail: raw readings
/// rise as the sensor cools.
pub const NTC100K_B3950: ConversionTable<'static> = ConversionTable::new(&[
    (92, 300.0),
    (135, 270.0),
    (206, 240.0),
    (328, 210.0),
    (531, 180.0),
    (847, 150.0),
    (1319, 120.0),
    (1896, 100.0),
    (2390, 85.0),
    (2892, 70.0),
    (3288, 55.0),
    (3558, 42.0),
    (3728, 30.0),
    (3828, 20.0),
    (3898, 10.0),
    (3946, 0.0),
]);

/// Thermistor sensor on one analog channel
///
/// Averages `oversample` raw reads per measurement, then checks the
/// average against the converter rails before table conversion. A
/// reading pinned at the top rail means the divider is open (broken
/// wire, unplugged connector); pinned at the bottom rail means it is
/// shorted.
pub struct TableSensor<A> {
    channel: A,
    table: ConversionTable<'static>,
    oversample: u8,
    low_rail: u16,
    high_rail: u16,
}

impl<A: AnalogChannel> TableSensor<A> {
    /// Rail margin as a fraction of full scale (1/64 on each end)
    const RAIL_DIVISOR: u16 = 64;

    pub fn new(channel: A, table: ConversionTable<'static>, oversample: u8) -> Self {
        let max = channel.max_value();
        let margin = max / Self::RAIL_DIVISOR;
        Self {
            channel,
            table,
            oversample: oversample.max(1),
            low_rail: margin,
            high_rail: max - margin,
        }
    }

    fn read_average(&mut self) -> Result<u16, SensorError> {
        let mut sum: u32 = 0;
        for _ in 0..self.oversample {
            let raw = self
                .channel
                .read_raw()
                .map_err(|_| SensorError::ConversionError)?;
            sum += u32::from(raw);
        }
        Ok((sum / u32::from(self.oversample)) as u16)
    }
}

impl<A: AnalogChannel> TemperatureSensor for TableSensor<A> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_average()?;
        if raw <= self.low_rail {
            return Err(SensorError::ShortCircuit);
        }
        if raw >= self.high_rail {
            return Err(SensorError::OpenCircuit);
        }
        Ok(self.table.convert(raw))
    }
}
