use crate::{BitBang, BitBangError, BitBangResult, BusLine, PowerControl, timing::IDLE_POLL_NS};
use embedded_hal::{delay::DelayNs, digital::PinState};
use onewire_core::{OneWireResult, PowerMode};

impl<P: BusLine, D: DelayNs, W: PowerControl<P>> BitBang<P, D, W> {
    pub(crate) fn release(&mut self) -> BitBangResult<(), P::Error> {
        self.data.set_input(self.pull_up).map_err(BitBangError::Data)
    }

    fn drive_low(&mut self) -> BitBangResult<(), P::Error> {
        self.data
            .set_output(PinState::Low)
            .map_err(BitBangError::Data)
    }

    pub(crate) fn line_high(&mut self) -> BitBangResult<bool, P::Error> {
        Ok(self.data.read_level().map_err(BitBangError::Data)? == PinState::High)
    }

    /// Leave the line released if a slot failed halfway.
    fn settle<T, X>(&mut self, res: Result<T, X>) -> Result<T, X> {
        if res.is_err() && self.release().is_err() {
            log::error!("1-Wire data line cannot be released");
        }
        res
    }

    pub(crate) fn power_up(&mut self) -> OneWireResult<(), BitBangError<P::Error>> {
        if !self.powered {
            self.power.power_on(&mut self.data, self.pull_up)?;
            self.powered = true;
            log::debug!("1-Wire strong power on");
        }
        Ok(())
    }

    pub(crate) fn depower(&mut self) -> OneWireResult<(), BitBangError<P::Error>> {
        if self.powered {
            self.power.power_off(&mut self.data, self.pull_up)?;
            self.powered = false;
            log::debug!("1-Wire strong power off");
        }
        Ok(())
    }

    /// Wait for the line to float high. `false` if it stays low through every retry.
    pub(crate) fn wait_idle(&mut self) -> BitBangResult<bool, P::Error> {
        if self.line_high()? {
            return Ok(true);
        }
        for _ in 0..self.short_retries {
            self.delay.delay_ns(IDLE_POLL_NS);
            if self.line_high()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Reset pulse and presence sample. Returns whether a presence pulse was seen.
    pub(crate) fn reset_slot(&mut self) -> BitBangResult<bool, P::Error> {
        let t = self.timing();
        let res = critical_section::with(|_| -> BitBangResult<bool, P::Error> {
            self.drive_low()?;
            self.delay.delay_ns(t.reset_low);
            self.release()?;
            self.delay.delay_ns(t.presence_sample);
            self.line_high()
        });
        let high = self.settle(res)?;
        self.delay.delay_ns(t.presence_window);
        Ok(!high)
    }

    /// Write slot. With `powered` the slot ends with strong power applied instead
    /// of releasing the line.
    pub(crate) fn write_slot(
        &mut self,
        bit: bool,
        powered: bool,
    ) -> OneWireResult<(), BitBangError<P::Error>> {
        self.depower()?;
        let t = self.timing();
        let low = if bit { t.write1_low } else { t.write0_low };
        let res = critical_section::with(|_| -> OneWireResult<(), BitBangError<P::Error>> {
            self.drive_low()?;
            self.delay.delay_ns(low);
            if powered {
                if W::MODE == PowerMode::SwitchedGpio {
                    self.release()?;
                }
                self.power_up()
            } else {
                Ok(self.release()?)
            }
        });
        self.settle(res)?;
        self.delay.delay_ns(t.write_tail(low));
        Ok(())
    }

    pub(crate) fn read_slot(&mut self) -> OneWireResult<bool, BitBangError<P::Error>> {
        self.depower()?;
        let t = self.timing();
        let res = critical_section::with(|_| -> BitBangResult<bool, P::Error> {
            self.drive_low()?;
            self.delay.delay_ns(t.write1_low);
            self.release()?;
            self.delay.delay_ns(t.read_wait());
            self.line_high()
        });
        let bit = self.settle(res)?;
        self.delay.delay_ns(t.read_tail());
        Ok(bit)
    }
}
