//! ROM command constants for 1-Wire communication.

/// Command to search for devices on the 1-Wire bus
pub const ONEWIRE_SEARCH_CMD: u8 = 0xf0;

/// Command to search for devices in alarm state on the 1-Wire bus
pub const ONEWIRE_CONDITIONAL_SEARCH_CMD: u8 = 0xec;

/// Read the ROM code of the only device on a single-drop bus.
/// On a bus with more than one device the wired-AND of all ROM codes is
/// returned, which fails the CRC check.
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Command to match a specific ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// The Overdrive-Match ROM command followed by a 64-bit
/// ROM sequence transmitted at overdrive speed addresses
/// a specific device on a multidrop bus and simultaneously
/// sets it in overdrive mode. Devices already in overdrive
/// mode remain there; all overdrive-capable devices return
/// to standard speed at the next reset pulse of standard
/// duration (at least 480μs).
pub const ONEWIRE_MATCH_ROM_CMD_OD: u8 = 0x69;

/// On a single-drop bus this command allows the bus master
/// to access the control functions without providing the
/// 64-bit ROM code. Unlike the normal Skip ROM command,
/// Overdrive-Skip ROM sets every overdrive-capable device
/// in overdrive mode. All communication following this
/// command has to occur at overdrive speed until a reset
/// pulse of standard duration returns the devices to
/// standard speed.
pub const ONEWIRE_SKIP_ROM_CMD_OD: u8 = 0x3c;

/// Re-select the device addressed by the last Match ROM or search
/// without sending its ROM code again.
pub const ONEWIRE_RESUME_CMD: u8 = 0xa5;
