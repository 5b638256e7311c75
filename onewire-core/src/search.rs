use crate::{
    OneWire, OneWireCrc, OneWireStatus, RomId,
    consts::{ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD},
    error::OneWireError,
};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`OneWireSearch`].
pub enum OneWireSearchKind {
    /// Normal search
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices with alarm
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

/// Cursor of a ROM search between passes.
///
/// Bit positions count from 1 (least significant bit of the family code) to 64.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    rom: [u8; 8],
    last_discrepancy: u8,
    last_family_discrepancy: u8,
    last_device: bool,
}

impl SearchState {
    /// ROM code found by the last completed pass.
    pub fn rom(&self) -> [u8; 8] {
        self.rom
    }

    /// Position of the branch the next pass takes the 1 side of, 0 when none is left.
    pub fn last_discrepancy(&self) -> u8 {
        self.last_discrepancy
    }

    /// Last discrepancy inside the family code, 0 when none.
    pub fn last_family_discrepancy(&self) -> u8 {
        self.last_family_discrepancy
    }

    /// Whether every device has been enumerated.
    pub fn is_done(&self) -> bool {
        self.last_device
    }

    fn rom_bit(&self, position: u8) -> bool {
        let i = position - 1;
        self.rom[(i / 8) as usize] & (1 << (i % 8)) != 0
    }
}

/// A structure for searching devices on a 1-Wire bus.
/// This structure implements the search algorithm for discovering devices on the 1-Wire bus.
/// It maintains the state of the search between calls to [next](OneWireSearch::next).
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    cmd: u8,
    family: u8,
    state: SearchState,
}

impl<T> core::fmt::Debug for OneWireSearch<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OneWireSearch")
            .field("cmd", &self.cmd)
            .field("family", &self.family)
            .field("state", &self.state)
            .finish()
    }
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Creates a new [`OneWireSearch`] instance.
    ///
    /// # Arguments
    /// * `onewire` - A mutable reference to a type that implements the `OneWire` trait.
    /// * `kind` - Search every device, or only those in alarm state.
    pub fn new(onewire: &'a mut T, kind: OneWireSearchKind) -> Self {
        Self {
            onewire,
            cmd: kind as _,
            family: 0,
            state: SearchState::default(),
        }
    }

    /// Creates a new [`OneWireSearch`] instance restricted to one family code.
    ///
    /// The first pass starts on the branch of `family`; the search ends as soon
    /// as a device of another family turns up.
    pub fn with_family(onewire: &'a mut T, kind: OneWireSearchKind, family: u8) -> Self {
        let mut search = Self::new(onewire, kind);
        search.family = family;
        search.restart();
        search
    }

    /// Current search state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Forget every discovered device; the next pass starts from scratch.
    pub fn restart(&mut self) {
        self.state = self.initial_state();
    }

    fn initial_state(&self) -> SearchState {
        let mut state = SearchState::default();
        if self.family != 0 {
            state.rom[0] = self.family;
            state.last_discrepancy = 64;
        }
        state
    }

    /// Skip the remaining devices sharing the family code of the last device found.
    pub fn skip_family(&mut self) {
        self.state.last_discrepancy = self.state.last_family_discrepancy;
        self.state.last_family_discrepancy = 0;
        if self.state.last_discrepancy == 0 {
            self.state.last_device = true;
        }
    }
}

impl<T: OneWire> OneWireSearch<'_, T> {
    /// Searches for devices on the 1-Wire bus.
    /// This method implements the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html) to discover devices connected to the bus.
    /// The [next](OneWireSearch::next) method can be called repeatedly to find all devices on the bus.
    /// Once every device has been found, this method returns `None` without touching the bus,
    /// until [restart](OneWireSearch::restart) is called.
    ///
    /// A pass that fails leaves the search state untouched, so calling this method again retries it.
    ///
    /// An empty bus ends the search on its first pass. Once devices have been found, a
    /// missing presence pulse is an error instead.
    ///
    /// # Errors
    /// * [`OneWireError::NoDevicePresent`] - no presence pulse after an earlier pass found devices.
    /// * [`OneWireError::BusShortOrNoDevices`] - the bus is shorted, or every device stopped answering mid-pass.
    /// * [`OneWireError::CrcMismatch`] - the ROM code read in this pass is corrupt.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<RomId>, OneWireError<T::BusError>> {
        if self.state.last_device {
            return Ok(None);
        }
        let status = self.onewire.reset()?;
        if status.shortcircuit() {
            log::warn!("1-Wire search: bus shorted");
            return Err(OneWireError::BusShortOrNoDevices);
        }
        if !status.presence() {
            if self.state != self.initial_state() {
                log::warn!("1-Wire search: devices left the bus mid-enumeration");
                return Err(OneWireError::NoDevicePresent);
            }
            log::debug!("1-Wire search: no presence pulse, search ends");
            self.state.last_device = true;
            return Ok(None);
        }
        self.onewire.write_byte(self.cmd)?; // Search ROM command

        let mut rom = self.state.rom;
        let mut last_zero: u8 = 0;
        let mut last_family_zero = self.state.last_family_discrepancy;
        for id_bit_num in 1..=64u8 {
            // Replay the previous path below the last discrepancy, take the 1 side
            // at it and the 0 side at any new branch beyond it.
            let dir = if id_bit_num < self.state.last_discrepancy {
                self.state.rom_bit(id_bit_num)
            } else {
                id_bit_num == self.state.last_discrepancy
            };
            let (id_bit, complement_bit, taken) = self.onewire.read_triplet(dir)?;
            if id_bit && complement_bit {
                log::debug!("1-Wire search: no response at bit {id_bit_num}");
                return Err(OneWireError::BusShortOrNoDevices);
            }
            if !id_bit && !complement_bit && !taken {
                last_zero = id_bit_num;
                if last_zero < 9 {
                    last_family_zero = last_zero;
                }
            }
            let idx = ((id_bit_num - 1) / 8) as usize;
            let mask = 1u8 << ((id_bit_num - 1) % 8);
            if taken {
                rom[idx] |= mask;
            } else {
                rom[idx] &= !mask;
            }
        }

        if rom == [0; 8] {
            // A line stuck low answers 0/0 at every position.
            log::warn!("1-Wire search: all-zero ROM code");
            return Err(OneWireError::BusShortOrNoDevices);
        }
        if !OneWireCrc::validate(&rom) {
            log::debug!("1-Wire search: CRC mismatch on {rom:02x?}");
            return Err(OneWireError::CrcMismatch);
        }
        self.state.rom = rom;
        self.state.last_discrepancy = last_zero;
        self.state.last_family_discrepancy = last_family_zero;
        self.state.last_device = last_zero == 0;

        let rom = RomId::from_bytes(rom)?;
        if self.family != 0 && rom.family() != self.family {
            log::trace!("1-Wire search: left family {:02x}", self.family);
            self.state.last_device = true;
            return Ok(None);
        }
        log::trace!("1-Wire search: found {rom}");
        Ok(Some(rom))
    }

    /// Verifies if the device with the given ROM code is present on the 1-Wire bus.
    ///
    /// This function resets the search state, and calling [next](OneWireSearch::next) after this call will start a new search.
    pub fn verify(&mut self, rom: RomId) -> Result<bool, OneWireError<T::BusError>> {
        self.state = SearchState {
            rom: rom.to_le_bytes(),
            last_discrepancy: 64,
            ..SearchState::default()
        };
        let family = core::mem::replace(&mut self.family, 0);
        let res = self.next();
        self.family = family;
        self.restart();
        match res {
            Ok(found) => Ok(found == Some(rom)),
            Err(OneWireError::NoDevicePresent) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<'a, T: OneWire> IntoIterator for OneWireSearch<'a, T> {
    type Item = Result<RomId, OneWireError<T::BusError>>;
    type IntoIter = OneWireDevices<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        OneWireDevices {
            search: self,
            finished: false,
        }
    }
}

/// Iterator over the devices found by a [`OneWireSearch`].
///
/// Yields each ROM code once, in search order. The first error is yielded and
/// ends the iteration.
pub struct OneWireDevices<'a, T> {
    search: OneWireSearch<'a, T>,
    finished: bool,
}

impl<T: OneWire> Iterator for OneWireDevices<'_, T> {
    type Item = Result<RomId, OneWireError<T::BusError>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.search.next() {
            Ok(Some(rom)) => Some(Ok(rom)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<T: OneWire> core::iter::FusedIterator for OneWireDevices<'_, T> {}
