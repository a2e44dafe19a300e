//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs, plus a zero-cost polarity adapter so control code
//! never needs to know whether a signal is active-high or active-low.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading for
/// the specific chip. Pull-up activation is a construction-time parameter
/// of the concrete pin; by the time a capability holds it, the electrical
/// configuration is fixed.
///
/// Reads take `&mut self` because some hardware requires mutable access to
/// sample a pin.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// Polarity-inverting adapter
///
/// Wraps any pin and negates both directions transparently: writes invert
/// the requested state, reads invert the sampled state. Callers see the
/// logical signal; the physical polarity is decided once at configuration
/// time. Monomorphized, so there is no dispatch cost.
pub struct Inverted<P>(pub P);

impl<P> Inverted<P> {
    /// Wrap a pin with inverted polarity
    pub const fn new(pin: P) -> Self {
        Self(pin)
    }

    /// Access the underlying pin
    pub fn inner(&self) -> &P {
        &self.0
    }
}

impl<P: OutputPin> OutputPin for Inverted<P> {
    fn set_high(&mut self) {
        self.0.set_low();
    }

    fn set_low(&mut self) {
        self.0.set_high();
    }

    fn toggle(&mut self) {
        self.0.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_low()
    }
}

impl<P: InputPin> InputPin for Inverted<P> {
    fn is_high(&mut self) -> bool {
        self.0.is_low()
    }
}

/// Adapter for `embedded-hal` output pins
///
/// Lets any chip HAL pin that implements the `embedded-hal` digital traits
/// satisfy [`OutputPin`] without glue code. Errors from the underlying pin
/// are discarded; GPIO writes on the targets we support are infallible.
/// The logical state is shadowed locally so reads never touch hardware.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: embedded_hal::digital::OutputPin> EhOutput<P> {
    /// Wrap an `embedded-hal` output pin, driving it low initially
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn toggle(&mut self) {
        self.set_state(!self.high);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Adapter for `embedded-hal` input pins
pub struct EhInput<P>(pub P);

impl<P: embedded_hal::digital::InputPin> InputPin for EhInput<P> {
    fn is_high(&mut self) -> bool {
        self.0.is_high().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn toggle(&mut self) {
            self.high = !self.high;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_inverted_output() {
        let mut pin = Inverted::new(MockPin { high: false });

        pin.set_high();
        assert!(!pin.inner().high);
        assert!(pin.is_set_high());

        pin.set_low();
        assert!(pin.inner().high);
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_inverted_input() {
        let mut pin = Inverted::new(MockPin { high: true });
        assert!(pin.is_low());

        pin.0.high = false;
        assert!(pin.is_high());
    }

    #[test]
    fn test_double_inversion_is_identity() {
        let mut pin = Inverted::new(Inverted::new(MockPin { high: false }));

        pin.set_high();
        assert!(pin.is_set_high());
        assert!(pin.inner().inner().high);
    }

    #[test]
    fn test_set_state() {
        let mut pin = MockPin { high: false };
        pin.set_state(true);
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(pin.is_set_low());
    }
}
