use crate::{OneWireCrc, OneWireError};

/// The 64-bit registration number of a 1-Wire device.
///
/// | Byte | Description |
/// |------|-------------|
/// | 0 | Family code (e.g., 0x28 for DS18B20) |
/// | 1-6 | Serial number, least significant byte first |
/// | 7 | CRC-8 of bytes 0-6 |
///
/// A `RomId` can only be built from bytes whose CRC checks out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RomId([u8; 8]);

impl RomId {
    /// Family code of the device.
    pub fn family(&self) -> u8 {
        self.0[0]
    }

    /// The 48-bit serial number, least significant byte first.
    pub fn serial(&self) -> [u8; 6] {
        let mut serial = [0; 6];
        serial.copy_from_slice(&self.0[1..7]);
        serial
    }

    /// The CRC byte carried in the ROM code.
    pub fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Bytes in bus transmission order.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0
    }

    /// The ROM code as an integer, family code in the lowest byte.
    pub fn as_u64(&self) -> u64 {
        u64::from_le_bytes(self.0)
    }

    /// Check the CRC of a raw ROM code.
    pub fn from_bytes<E>(bytes: [u8; 8]) -> Result<Self, OneWireError<E>> {
        if OneWireCrc::validate(&bytes) {
            Ok(Self(bytes))
        } else {
            Err(OneWireError::CrcMismatch)
        }
    }
}

impl TryFrom<[u8; 8]> for RomId {
    type Error = OneWireError<()>;

    fn try_from(bytes: [u8; 8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<u64> for RomId {
    type Error = OneWireError<()>;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<RomId> for u64 {
    fn from(rom: RomId) -> Self {
        rom.as_u64()
    }
}

impl core::fmt::Display for RomId {
    /// Family, serial (most significant byte first) and CRC, e.g. `28-0000045a1bd3-7e`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}-", self.family())?;
        for b in self.serial().iter().rev() {
            write!(f, "{b:02x}")?;
        }
        write!(f, "-{:02x}", self.crc())
    }
}
