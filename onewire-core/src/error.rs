#[allow(unused_imports)]
use crate::{OneWire, OneWireSearch};

/// One wire communication error type.
#[derive(Debug, PartialEq, Eq)]
pub enum OneWireError<E> {
    /// Encapsulates the error type from the underlying hardware.
    Other(E),
    /// No presence pulse followed the reset pulse.
    NoDevicePresent,
    /// Both the id bit and its complement read as 1 during a [`OneWireSearch`] pass,
    /// or the pass produced an all-zero ROM: the bus is shorted or every device dropped out.
    BusShortOrNoDevices,
    /// Computed CRC of a ROM code or data block does not match the received one.
    CrcMismatch,
    /// A powered slot or bus power was requested on a bus without power control.
    PowerControlUnavailable,
    /// A bus line could not be configured while constructing the bus master.
    InvalidPinConfiguration,
    /// A bit operation was attempted before the bus was reset at the current speed.
    /// Every speed change has to be followed by a [`OneWire::reset`].
    BusUninitialized,
    /// Indicates that the operation is not implemented by the bus master.
    Unimplemented,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for OneWireError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Other(e) => write!(f, "bus master error: {e:?}"),
            Self::NoDevicePresent => f.write_str("no device present on the bus"),
            Self::BusShortOrNoDevices => f.write_str("bus shorted or no devices responding"),
            Self::CrcMismatch => f.write_str("CRC mismatch"),
            Self::PowerControlUnavailable => f.write_str("bus power control unavailable"),
            Self::InvalidPinConfiguration => f.write_str("invalid bus line configuration"),
            Self::BusUninitialized => f.write_str("bus not reset at the current speed"),
            Self::Unimplemented => f.write_str("operation not implemented"),
        }
    }
}
