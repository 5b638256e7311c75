use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

/// A GPIO line the bus master drives: the 1-Wire data line or the power-control line.
///
/// Every call must take effect before it returns; [`BusLine::read_level`]
/// reports the instantaneous electrical state of the line.
pub trait BusLine {
    /// Error reported by the GPIO driver.
    type Error;

    /// Sample the line.
    fn read_level(&mut self) -> Result<PinState, Self::Error>;

    /// Set the output level without changing the direction.
    fn write_level(&mut self, level: PinState) -> Result<(), Self::Error>;

    /// Stop driving the line, optionally enabling the internal pull-up.
    fn set_input(&mut self, pull_up: bool) -> Result<(), Self::Error>;

    /// Drive the line, starting at `level`.
    fn set_output(&mut self, level: PinState) -> Result<(), Self::Error>;
}

impl<T: BusLine + ?Sized> BusLine for &mut T {
    type Error = T::Error;

    fn read_level(&mut self) -> Result<PinState, Self::Error> {
        T::read_level(self)
    }

    fn write_level(&mut self, level: PinState) -> Result<(), Self::Error> {
        T::write_level(self, level)
    }

    fn set_input(&mut self, pull_up: bool) -> Result<(), Self::Error> {
        T::set_input(self, pull_up)
    }

    fn set_output(&mut self, level: PinState) -> Result<(), Self::Error> {
        T::set_output(self, level)
    }
}

/// [`BusLine`] over an `embedded-hal` pin already configured as open-drain with input enabled.
///
/// Releasing the line is a write-high; the pull-up is whatever the pin was configured with.
/// Such a pin cannot source current, so it is not suitable for parasitic power.
pub struct OpenDrain<P> {
    pin: P,
}

impl<P> OpenDrain<P> {
    /// Wrap an open-drain pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Return the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin + OutputPin> BusLine for OpenDrain<P> {
    type Error = <P as ErrorType>::Error;

    fn read_level(&mut self) -> Result<PinState, Self::Error> {
        Ok(PinState::from(self.pin.is_high()?))
    }

    fn write_level(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.pin.set_state(level)
    }

    fn set_input(&mut self, _pull_up: bool) -> Result<(), Self::Error> {
        self.pin.set_high()
    }

    fn set_output(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.pin.set_state(level)
    }
}
