use bitfield_struct::bitfield;
use onewire_core::OneWireStatus;

/// Bus state sampled by a reset cycle.
///
/// Packed the way a bridge chip reports its status register, so it can be
/// logged or stored as a single byte.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct BusStatus {
    /// At least one device pulled the line low at the presence sample point.
    pub(crate) presence_detect: bool,
    /// The line was low before the reset pulse, or still low once the presence
    /// window closed. No reset pulse is driven in the first case.
    pub(crate) short_detect: bool,
    /// Level of the line at the end of the reset cycle.
    pub logic_level: bool,
    /// The reset ran at overdrive speed.
    pub overdrive: bool,
    #[bits(4)]
    __: u8,
}

impl OneWireStatus for BusStatus {
    fn presence(&self) -> bool {
        self.presence_detect()
    }

    fn shortcircuit(&self) -> bool {
        self.short_detect()
    }

    fn logic_level(&self) -> Option<bool> {
        Some(BusStatus::logic_level(self))
    }
}
