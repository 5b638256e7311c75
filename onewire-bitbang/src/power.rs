use crate::{BitBangError, BitBangResult, BusLine};
use embedded_hal::digital::PinState;
use onewire_core::{OneWireError, OneWireResult, PowerMode};

/// Strategy for supplying strong power to the bus after a powered write slot.
///
/// `P` is the data line the bus master drives.
pub trait PowerControl<P: BusLine> {
    /// Power mode reported through [`OneWire::power_mode`](onewire_core::OneWire::power_mode).
    const MODE: PowerMode;

    /// Put the power circuit into its unpowered state.
    fn init(&mut self) -> BitBangResult<(), P::Error> {
        Ok(())
    }

    /// Switch strong power on. The data line is low or released when this is called.
    fn power_on(&mut self, data: &mut P, pull_up: bool) -> OneWireResult<(), BitBangError<P::Error>>;

    /// Switch strong power off and leave the data line released.
    fn power_off(&mut self, data: &mut P, pull_up: bool) -> OneWireResult<(), BitBangError<P::Error>>;

    /// Whether powered operations are possible.
    fn is_available(&self) -> bool {
        Self::MODE != PowerMode::None
    }
}

/// No power control: the bus is only ever fed by its pull-up resistor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPower;

impl<P: BusLine> PowerControl<P> for NoPower {
    const MODE: PowerMode = PowerMode::None;

    fn power_on(&mut self, _: &mut P, _: bool) -> OneWireResult<(), BitBangError<P::Error>> {
        Err(OneWireError::PowerControlUnavailable)
    }

    fn power_off(&mut self, _: &mut P, _: bool) -> OneWireResult<(), BitBangError<P::Error>> {
        Err(OneWireError::PowerControlUnavailable)
    }
}

/// Parasitic power: the data line is driven high while powered.
///
/// The data GPIO must be able to source the current the devices draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parasitic;

impl<P: BusLine> PowerControl<P> for Parasitic {
    const MODE: PowerMode = PowerMode::Parasitic;

    fn power_on(&mut self, data: &mut P, _: bool) -> OneWireResult<(), BitBangError<P::Error>> {
        data.set_output(PinState::High).map_err(BitBangError::Data)?;
        Ok(())
    }

    fn power_off(&mut self, data: &mut P, pull_up: bool) -> OneWireResult<(), BitBangError<P::Error>> {
        data.set_input(pull_up).map_err(BitBangError::Data)?;
        Ok(())
    }
}

/// Power switched onto the bus by a separate GPIO, e.g. the gate of a P-channel MOSFET.
///
/// Only the power-control line is ever touched; the data line stays released while powered.
#[derive(Debug)]
pub struct SwitchedPower<Q> {
    line: Q,
    active: PinState,
}

impl<Q> SwitchedPower<Q> {
    /// Control power through `line`, which switches power on when driven to `active`.
    pub fn new(line: Q, active: PinState) -> Self {
        Self { line, active }
    }

    /// Return the power-control line.
    pub fn into_inner(self) -> Q {
        self.line
    }
}

impl<P: BusLine, Q: BusLine<Error = P::Error>> PowerControl<P> for SwitchedPower<Q> {
    const MODE: PowerMode = PowerMode::SwitchedGpio;

    fn init(&mut self) -> BitBangResult<(), P::Error> {
        self.line
            .set_output(!self.active)
            .map_err(BitBangError::Power)
    }

    fn power_on(&mut self, _: &mut P, _: bool) -> OneWireResult<(), BitBangError<P::Error>> {
        self.line
            .write_level(self.active)
            .map_err(BitBangError::Power)?;
        Ok(())
    }

    fn power_off(&mut self, _: &mut P, _: bool) -> OneWireResult<(), BitBangError<P::Error>> {
        self.line
            .write_level(!self.active)
            .map_err(BitBangError::Power)?;
        Ok(())
    }
}
