use crate::{BitBang, BitBangError, BusLine, BusStatus, PowerControl};
use embedded_hal::delay::DelayNs;
use onewire_core::{
    OneWire, OneWireError, OneWireResult, OneWireStatus, PowerMode, consts::ONEWIRE_SKIP_ROM_CMD_OD,
};

impl<P: BusLine, D: DelayNs, W: PowerControl<P>> OneWire for BitBang<P, D, W> {
    type Status = BusStatus;

    type BusError = BitBangError<P::Error>;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        self.depower()?;
        let status = BusStatus::new().with_overdrive(self.overdrive);
        if !self.wait_idle()? {
            log::warn!("1-Wire line held low, reset not issued");
            return Ok(status.with_short_detect(true));
        }
        let presence = self.reset_slot()?;
        self.needs_reset = false;
        let level = self.line_high()?;
        if !level {
            log::warn!("1-Wire line still low after the presence window");
        }
        Ok(status
            .with_presence_detect(presence)
            .with_short_detect(!level)
            .with_logic_level(level))
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        if self.needs_reset {
            return Err(OneWireError::BusUninitialized);
        }
        self.write_slot(bit, false)
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        if self.needs_reset {
            return Err(OneWireError::BusUninitialized);
        }
        self.read_slot()
    }

    fn get_overdrive_mode(&mut self) -> bool {
        self.overdrive
    }

    fn set_overdrive_mode(&mut self, enable: bool) -> OneWireResult<(), Self::BusError> {
        if enable == self.overdrive {
            return Ok(());
        }
        if enable {
            // Every device has to be told to switch at standard speed first.
            if !self.reset()?.presence() {
                return Err(OneWireError::NoDevicePresent);
            }
            self.write_byte(ONEWIRE_SKIP_ROM_CMD_OD)?;
        }
        self.overdrive = enable;
        self.needs_reset = true;
        log::info!(
            "1-Wire speed: {}",
            if enable { "overdrive" } else { "standard" }
        );
        // When disabling, this standard-speed reset drops devices back out of overdrive.
        self.reset()?;
        Ok(())
    }

    fn power_mode(&self) -> PowerMode {
        W::MODE
    }

    fn set_bus_power(&mut self, on: bool) -> OneWireResult<(), Self::BusError> {
        if !self.power.is_available() {
            return Err(OneWireError::PowerControlUnavailable);
        }
        if on { self.power_up() } else { self.depower() }
    }

    fn write_bit_powered(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        if !self.power.is_available() {
            return Err(OneWireError::PowerControlUnavailable);
        }
        if self.needs_reset {
            return Err(OneWireError::BusUninitialized);
        }
        self.write_slot(bit, true)
    }
}

impl<P: BusLine, D: DelayNs, W: PowerControl<P>> BitBang<P, D, W> {
    /// Keep strong power on the bus for `ms` milliseconds, then release it.
    ///
    /// Typically follows [`OneWire::write_byte_powered`], for as long as the
    /// started operation (a temperature conversion, an EEPROM copy) needs.
    pub fn hold_power_ms(&mut self, ms: u32) -> OneWireResult<(), BitBangError<P::Error>> {
        if !self.power.is_available() {
            return Err(OneWireError::PowerControlUnavailable);
        }
        self.power_up()?;
        self.delay.delay_ms(ms);
        self.depower()
    }
}
