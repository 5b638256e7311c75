use crate::{
    OneWireCrc, OneWireError, OneWireResult, OneWireSearch, OneWireSearchKind, RomId, consts,
};

/// Outcome of the presence-detect phase of a bus reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceResult {
    /// At least one device pulled the line low after the reset pulse.
    Detected,
    /// The line stayed high through the presence window.
    Absent,
}

/// How the bus master supplies the extra current some device operations need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// No power control; powered operations fail with [`OneWireError::PowerControlUnavailable`].
    None,
    /// The data line itself is driven high to feed parasitically powered devices.
    Parasitic,
    /// A separate GPIO switches an external supply (e.g. a transistor) onto the bus.
    SwitchedGpio,
}

/// Trait for the status returned by a bus reset.
pub trait OneWireStatus {
    /// Whether a presence pulse was detected.
    fn presence(&self) -> bool;

    /// Whether the bus appeared shorted to ground.
    fn shortcircuit(&self) -> bool;

    /// Logic level of the line after the reset cycle, if the bus master samples it.
    fn logic_level(&self) -> Option<bool> {
        None
    }

    /// Presence as a [`PresenceResult`].
    fn presence_result(&self) -> PresenceResult {
        if self.presence() {
            PresenceResult::Detected
        } else {
            PresenceResult::Absent
        }
    }
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bits. Byte and block transfers are composed from bit slots,
/// least significant bit first; bus masters with a hardware byte engine may override them.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// A missing presence pulse is reported through the status, not as an error.
    ///
    /// # Errors
    /// This method returns an error if the underlying hardware fails.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit from the 1-Wire bus.
    /// # Returns
    /// The bit read from the bus.
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least significant bit first.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Reads a byte from the 1-Wire bus, least significant bit first.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let mut byte = 0;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    /// Writes every byte of `bytes` back to back.
    fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Fills `buf` with bytes read from the bus.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }

    /// Reads a block whose last byte is the CRC-8 of the preceding bytes.
    ///
    /// # Errors
    /// [`OneWireError::CrcMismatch`] if the checksum does not match.
    fn read_block_crc8(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        self.read_bytes(buf)?;
        if OneWireCrc::validate(buf) {
            Ok(())
        } else {
            log::debug!("CRC-8 mismatch on a {} byte block", buf.len());
            Err(OneWireError::CrcMismatch)
        }
    }

    /// ## This method is internally used by the [search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
    ///
    /// Generates three time slots: two read time slots and one write time slot. The
    /// type of write time slot depends on the result of the read time slots and the direction.
    /// The direction determines the written bit if both read time slots are 0 (a discrepancy).
    /// If the read time slots are 0 and 1, they are followed by a write-zero time slot.
    /// If the read time slots are 1 and 0, they are followed by a write-one time slot.
    /// If the read time slots are both 1 (error case), the subsequent write time slot is a write-one.
    ///
    /// # Returns
    /// The id bit, the complement bit and the direction taken.
    fn read_triplet(&mut self, direction: bool) -> OneWireResult<(bool, bool, bool), Self::BusError> {
        let id_bit = self.read_bit()?;
        let complement_bit = self.read_bit()?;
        let taken = match (id_bit, complement_bit) {
            (false, false) => direction,
            (id, _) => id,
        };
        self.write_bit(taken)?;
        Ok((id_bit, complement_bit, taken))
    }

    /// Check if the 1-Wire bus is in overdrive mode.
    fn get_overdrive_mode(&mut self) -> bool;

    /// Set the 1-Wire bus to overdrive mode.
    /// # Arguments
    /// * `enable` - A boolean indicating whether to enable or disable overdrive mode.
    /// # Returns
    /// A result indicating the success or failure of the operation.
    fn set_overdrive_mode(&mut self, _enable: bool) -> OneWireResult<(), Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// How the bus master powers the bus during powered slots.
    fn power_mode(&self) -> PowerMode {
        PowerMode::None
    }

    /// Switch bus power on or off.
    ///
    /// # Errors
    /// [`OneWireError::PowerControlUnavailable`] without power control.
    fn set_bus_power(&mut self, _on: bool) -> OneWireResult<(), Self::BusError> {
        Err(OneWireError::PowerControlUnavailable)
    }

    /// Writes a bit and leaves the bus powered when its slot ends.
    ///
    /// Power stays on until [`OneWire::set_bus_power`] turns it off or the next slot begins.
    fn write_bit_powered(&mut self, _bit: bool) -> OneWireResult<(), Self::BusError> {
        Err(OneWireError::PowerControlUnavailable)
    }

    /// Writes a byte whose last bit slot leaves the bus powered, e.g. a command
    /// that starts a temperature conversion on parasitically powered sensors.
    fn write_byte_powered(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        if self.power_mode() == PowerMode::None {
            return Err(OneWireError::PowerControlUnavailable);
        }
        for i in 0..7 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        self.write_bit_powered(byte & 0x80 != 0)
    }

    /// Addresses devices on the 1-Wire bus.
    /// The first [`OneWire::read_byte`], [`OneWire::read_bit`], [`OneWire::write_byte`], [`OneWire::write_bit`] operation should be preceded by this method to address devices on the bus.
    /// Note: A [`OneWire::read_byte`] or [`OneWire::read_bit`] call will return garbage data if this method is called without specifying a ROM address on a bus with multiple devices.
    /// # Arguments
    /// * `rom` - The ROM address of the device to address. Pass [`None`] to skip ROM addressing and address all devices on the bus.
    ///
    /// # Errors
    /// [`OneWireError::NoDevicePresent`] if no device answered the reset.
    fn address(&mut self, rom: Option<RomId>) -> OneWireResult<(), Self::BusError> {
        let od = self.get_overdrive_mode();
        let cmd = match (rom.is_some(), od) {
            (true, true) => consts::ONEWIRE_MATCH_ROM_CMD_OD,
            (true, false) => consts::ONEWIRE_MATCH_ROM_CMD,
            (false, true) => consts::ONEWIRE_SKIP_ROM_CMD_OD,
            (false, false) => consts::ONEWIRE_SKIP_ROM_CMD,
        };
        if !self.reset()?.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(cmd)?;
        if let Some(rom) = rom {
            self.write_bytes(&rom.to_le_bytes())?;
        }
        Ok(())
    }

    /// Re-selects the device addressed last, without sending its ROM code again.
    fn resume(&mut self) -> OneWireResult<(), Self::BusError> {
        if !self.reset()?.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(consts::ONEWIRE_RESUME_CMD)
    }

    /// Reads the ROM code of the only device on the bus.
    ///
    /// # Errors
    /// [`OneWireError::CrcMismatch`] when more than one device answered.
    fn read_rom(&mut self) -> OneWireResult<RomId, Self::BusError> {
        if !self.reset()?.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(consts::ONEWIRE_READ_ROM_CMD)?;
        let mut rom = [0; 8];
        self.read_bytes(&mut rom)?;
        RomId::from_bytes(rom)
    }

    /// Starts a device search over this bus.
    fn search(&mut self, kind: OneWireSearchKind) -> OneWireSearch<'_, Self>
    where
        Self: Sized,
    {
        OneWireSearch::new(self, kind)
    }
}
