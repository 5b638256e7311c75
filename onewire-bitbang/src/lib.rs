#![no_std]
#![deny(missing_docs)]

/*! # onewire-bitbang
 *
 * A 1-Wire bus master that times every slot in software on a GPIO line.
 *
 * [`BitBang`] implements [`OneWire`] on top of a [`BusLine`] (the data line) and a
 * [`DelayNs`](embedded_hal::delay::DelayNs) timer. The timing-critical part of each slot
 * runs inside a [`critical_section`], so the platform must provide an implementation.
 * Strong power for parasitically powered devices is selected at build time through a
 * [`PowerControl`] strategy, see [`BitBangBuilder`].
 */

pub use onewire_core::{OneWire, OneWireError, OneWireResult};
mod config;
mod error;
mod line;
mod onewire;
mod power;
mod slot;
mod status;
mod timing;

pub use config::BitBangBuilder;
pub use error::BitBangError;
pub use line::{BusLine, OpenDrain};
pub use power::{NoPower, Parasitic, PowerControl, SwitchedPower};
pub use status::BusStatus;
pub use timing::TimingProfile;

/// Results of bit-bang line operations.
pub type BitBangResult<T, E> = Result<T, BitBangError<E>>;

/// A software-timed 1-Wire bus master.
///
/// Takes ownership of the data line (implementing [`BusLine`]), a timer object implementing
/// the [`DelayNs`](embedded_hal::delay::DelayNs) trait and a [`PowerControl`] strategy.
/// Build it with [`BitBangBuilder`].
pub struct BitBang<P, D, W = NoPower> {
    pub(crate) data: P,
    pub(crate) delay: D,
    pub(crate) power: W,
    pub(crate) pull_up: bool,
    pub(crate) short_retries: u8,
    pub(crate) overdrive: bool,
    pub(crate) needs_reset: bool, // speed changed, or never reset
    pub(crate) powered: bool,
}

impl<P, D, W> BitBang<P, D, W> {
    /// Whether strong power is currently applied to the bus.
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Current slot timing.
    pub fn timing(&self) -> &'static TimingProfile {
        TimingProfile::for_speed(self.overdrive)
    }

    /// Release the data line, timer and power control.
    ///
    /// The lines are handed back in whatever state they are in; call
    /// [`OneWire::set_bus_power`] first to drop strong power.
    pub fn into_inner(self) -> (P, D, W) {
        (self.data, self.delay, self.power)
    }
}
