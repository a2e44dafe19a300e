//! Axis limit switches

use tessera_hal::InputPin;

/// Machine axis a switch limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One axis limit switch
///
/// Active-low switches are wrapped in the HAL's
/// [`Inverted`](tessera_hal::Inverted) adapter at construction, so a
/// `true` read here always means "pressed".
pub struct Endstop<P> {
    pin: P,
    axis: Axis,
}

impl<P: InputPin> Endstop<P> {
    pub fn new(pin: P, axis: Axis) -> Self {
        Self { pin, axis }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Sample the switch
    pub fn triggered(&mut self) -> bool {
        self.pin.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_hal::Inverted;

    struct MockPin {
        high: bool,
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high_switch() {
        let mut stop = Endstop::new(MockPin { high: true }, Axis::X);
        assert!(stop.triggered());
        assert_eq!(stop.axis(), Axis::X);
    }

    #[test]
    fn test_active_low_switch_through_adapter() {
        // Physically low while pressed
        let mut stop = Endstop::new(Inverted::new(MockPin { high: false }), Axis::Z);
        assert!(stop.triggered());
    }
}
