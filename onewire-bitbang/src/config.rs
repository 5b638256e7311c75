use crate::{BitBang, BitBangError, BusLine, NoPower, Parasitic, PowerControl, SwitchedPower};
use embedded_hal::{delay::DelayNs, digital::PinState};
use onewire_core::{OneWireError, OneWireResult};

/// Builder for creating a [`BitBang`] bus master with custom configuration.
#[derive(Debug, Clone, Copy)]
pub struct BitBangBuilder {
    pub(crate) pull_up: bool,
    pub(crate) short_retries: u8,
}

impl Default for BitBangBuilder {
    fn default() -> Self {
        BitBangBuilder {
            pull_up: false,
            short_retries: 125,
        }
    }
}

impl BitBangBuilder {
    /// Enable the internal pull-up of the data line whenever it is released.
    ///
    /// Internal pull-ups are usually too weak for more than a device or two;
    /// an external 4.7 kOhm resistor is the normal setup.
    pub fn with_pull_up(mut self, pull_up: bool) -> Self {
        self.pull_up = pull_up;
        self
    }

    /// Sets how many times the line is polled, 2 us apart, for the bus to go
    /// idle before a reset. A line still low after that is reported as shorted.
    pub fn with_short_retries(mut self, retries: u8) -> Self {
        self.short_retries = retries;
        self
    }

    /// Builds a bus master without strong power.
    pub fn build<P: BusLine, D: DelayNs>(
        self,
        data: P,
        delay: D,
    ) -> OneWireResult<BitBang<P, D, NoPower>, BitBangError<P::Error>> {
        self.assemble(data, delay, NoPower)
    }

    /// Builds a bus master that powers the bus by driving the data line high.
    pub fn build_parasitic<P: BusLine, D: DelayNs>(
        self,
        data: P,
        delay: D,
    ) -> OneWireResult<BitBang<P, D, Parasitic>, BitBangError<P::Error>> {
        self.assemble(data, delay, Parasitic)
    }

    /// Builds a bus master that switches power through `power`, active at `active`.
    ///
    /// The power line is driven to its inactive level here.
    pub fn build_switched<P: BusLine, Q: BusLine<Error = P::Error>, D: DelayNs>(
        self,
        data: P,
        power: Q,
        active: PinState,
        delay: D,
    ) -> OneWireResult<BitBang<P, D, SwitchedPower<Q>>, BitBangError<P::Error>> {
        self.assemble(data, delay, SwitchedPower::new(power, active))
    }

    fn assemble<P: BusLine, D: DelayNs, W: PowerControl<P>>(
        self,
        data: P,
        delay: D,
        power: W,
    ) -> OneWireResult<BitBang<P, D, W>, BitBangError<P::Error>> {
        let mut dev = BitBang {
            data,
            delay,
            power,
            pull_up: self.pull_up,
            short_retries: self.short_retries,
            overdrive: false,
            needs_reset: true,
            powered: false,
        };
        if dev.data.set_input(dev.pull_up).is_err() {
            log::error!("1-Wire data line cannot be released");
            return Err(OneWireError::InvalidPinConfiguration);
        }
        if dev.power.init().is_err() {
            log::error!("1-Wire power-control line cannot be driven");
            return Err(OneWireError::InvalidPinConfiguration);
        }
        log::debug!(
            "1-Wire bit-bang master ready, power mode {:?}, pull-up {}",
            W::MODE,
            dev.pull_up
        );
        Ok(dev)
    }
}
