/// Reflected form of the Dallas/Maxim CRC-8 polynomial `x^8 + x^5 + x^4 + 1`.
const CRC8_POLY: u8 = 0x8c;

/// Reflected form of the 1-Wire CRC-16 polynomial `x^16 + x^15 + x^2 + 1`.
const CRC16_POLY: u16 = 0xa001;

/// Shift one byte through the CRC-8 register bit by bit.
pub const fn crc8_bitwise(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    let mut i = 0;
    while i < 8 {
        if crc & 0x1 == 0x1 {
            crc = (crc >> 1) ^ CRC8_POLY;
        } else {
            crc >>= 1;
        }
        i += 1;
    }
    crc
}

#[cfg(feature = "crc-table")]
const CRC8_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = crc8_bitwise(0, i as u8);
        i += 1;
    }
    table
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Calculate CRC-8 used in 1-Wire communications.
///
/// ROM codes and most scratchpad reads end with this checksum.
pub struct OneWireCrc(u8);

impl OneWireCrc {
    /// A CRC register in its initial (zero) state.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Return the register to its initial state.
    pub fn reset(&mut self) -> u8 {
        self.0 = 0;
        self.0
    }

    /// Update the CRC with the incoming byte and return the new value.
    pub fn update(&mut self, byte: u8) -> u8 {
        #[cfg(feature = "crc-table")]
        {
            self.0 = CRC8_TABLE[(self.0 ^ byte) as usize];
        }
        #[cfg(not(feature = "crc-table"))]
        {
            self.0 = crc8_bitwise(self.0, byte);
        }
        self.0
    }

    /// CRC-8 of a whole buffer, starting from the initial state.
    pub fn compute(data: &[u8]) -> u8 {
        let mut crc = OneWireCrc::new();
        for &byte in data {
            crc.update(byte);
        }
        crc.value()
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        // Running the CRC over data followed by its own CRC leaves zero behind.
        !sequence.is_empty() && Self::compute(sequence) == 0x0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Calculate the CRC-16 used by 1-Wire memory and counter devices.
///
/// Devices transmit the complement of this value, least significant byte first.
pub struct OneWireCrc16(u16);

impl OneWireCrc16 {
    /// A CRC register in its initial (zero) state.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Get the current CRC value
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Update the CRC with the incoming byte and return the new value.
    pub fn update(&mut self, byte: u8) -> u16 {
        let mut crc = self.0 ^ byte as u16;
        for _ in 0..8 {
            if crc & 0x1 == 0x1 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
        self.0 = crc;
        crc
    }

    /// CRC-16 of a whole buffer, starting from the initial state.
    pub fn compute(data: &[u8]) -> u16 {
        let mut crc = OneWireCrc16::new();
        for &byte in data {
            crc.update(byte);
        }
        crc.value()
    }

    /// Check `data` against the inverted CRC-16 bytes a device sent after it.
    pub fn validate(data: &[u8], inverted_crc: [u8; 2]) -> bool {
        !Self::compute(data) == u16::from_le_bytes(inverted_crc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn update_matches_bitwise_reference_for_every_byte() {
        for byte in 0..=255u8 {
            let mut crc = OneWireCrc::new();
            assert_eq!(crc.update(byte), crc8_bitwise(0, byte), "byte {byte:#04x}");
        }
        // A non-zero register exercises the table index path as well.
        for byte in 0..=255u8 {
            let mut crc = OneWireCrc(0x5a);
            assert_eq!(crc.update(byte), crc8_bitwise(0x5a, byte));
        }
    }

    #[test]
    fn known_rom_code() {
        // Serial 0x000000_01B81C, family 0x02, CRC 0xA2 (Maxim application note 27).
        let rom = [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2];
        assert_eq!(OneWireCrc::compute(&rom[..7]), 0xa2);
        assert!(OneWireCrc::validate(&rom));
        let mut broken = rom;
        broken[3] ^= 0x10;
        assert!(!OneWireCrc::validate(&broken));
    }

    #[test]
    fn appended_crc_checks_to_zero() {
        let mut rng = StdRng::seed_from_u64(0x1_3337);
        for len in 1..32 {
            let mut buf = [0u8; 33];
            rng.fill(&mut buf[..len]);
            buf[len] = OneWireCrc::compute(&buf[..len]);
            assert_eq!(OneWireCrc::compute(&buf[..=len]), 0);
        }
    }

    #[test]
    fn reset_returns_initial_state() {
        let mut crc = OneWireCrc::new();
        crc.update(0x28);
        assert_ne!(crc.value(), 0);
        assert_eq!(crc.reset(), 0);
        assert_eq!(crc, OneWireCrc::default());
        assert!(!OneWireCrc::validate(&[]));
    }

    #[test]
    fn crc16_check_value() {
        assert_eq!(OneWireCrc16::compute(b"123456789"), 0xbb3d);
        let data = [0x0f, 0x00, 0x00, 0xaa, 0x55];
        let crc = !OneWireCrc16::compute(&data);
        assert!(OneWireCrc16::validate(&data, crc.to_le_bytes()));
        assert!(!OneWireCrc16::validate(&data, (!crc).to_le_bytes()));
    }
}
