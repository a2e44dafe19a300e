//! Analog input abstractions
//!
//! A single trait for reading a raw device-range integer from an analog
//! pin. Conversion to physical units (temperature) happens in higher
//! layers through calibration tables; oversampling counts are carried by
//! the consumers that do the smoothing.

/// Errors from analog reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete
    Hardware,
}

/// Analog input channel
///
/// Reads take `&mut self` because ADC conversions typically require
/// mutable access to the peripheral.
pub trait AnalogChannel {
    /// Read a single raw sample
    fn read_raw(&mut self) -> Result<u16, AdcError>;

    /// Resolution of the converter in bits (typically 12)
    fn resolution_bits(&self) -> u8 {
        12
    }

    /// Largest raw value this channel can produce
    fn max_value(&self) -> u16 {
        ((1u32 << self.resolution_bits()) - 1) as u16
    }
}
