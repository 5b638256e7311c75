/// Slot timing of one bus speed, in nanoseconds.
///
/// All durations are measured from the falling edge that opens the slot, except
/// [`presence_window`](TimingProfile::presence_window) (from the presence sample to the end of
/// the reset cycle) and [`recovery`](TimingProfile::recovery) (appended after every slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingProfile {
    /// Length of the reset pulse (tRSTL).
    pub reset_low: u32,
    /// Delay from releasing the reset pulse to sampling presence (tMSP).
    pub presence_sample: u32,
    /// Remainder of the reset high time after the presence sample.
    pub presence_window: u32,
    /// Length of a read or write slot (tSLOT).
    pub slot: u32,
    /// Low time of a write-0 slot (tW0L).
    pub write0_low: u32,
    /// Low time of a write-1 slot and of the read slot initiation (tW1L, tRL).
    pub write1_low: u32,
    /// Delay from the falling edge to sampling a read slot (tMSR).
    pub read_sample: u32,
    /// Line recovery time between slots (tREC).
    pub recovery: u32,
}

impl TimingProfile {
    /// Standard speed, about 15.4 kbit/s.
    pub const STANDARD: Self = Self {
        reset_low: 480_000,
        presence_sample: 70_000,
        presence_window: 410_000,
        slot: 60_000,
        write0_low: 60_000,
        write1_low: 6_000,
        read_sample: 15_000,
        recovery: 10_000,
    };

    /// Overdrive speed, about 111 kbit/s.
    pub const OVERDRIVE: Self = Self {
        reset_low: 70_000,
        presence_sample: 8_500,
        presence_window: 40_000,
        slot: 7_500,
        write0_low: 7_500,
        write1_low: 1_000,
        read_sample: 2_000,
        recovery: 2_500,
    };

    /// Profile for the given speed.
    pub const fn for_speed(overdrive: bool) -> &'static Self {
        if overdrive {
            &Self::OVERDRIVE
        } else {
            &Self::STANDARD
        }
    }

    /// High time of a write slot with `low` ns low time, recovery included.
    pub(crate) const fn write_tail(&self, low: u32) -> u32 {
        self.slot.saturating_sub(low) + self.recovery
    }

    /// Delay from releasing a read slot to sampling it.
    pub(crate) const fn read_wait(&self) -> u32 {
        self.read_sample.saturating_sub(self.write1_low)
    }

    /// Rest of a read slot after the sample, recovery included.
    pub(crate) const fn read_tail(&self) -> u32 {
        self.slot.saturating_sub(self.read_sample) + self.recovery
    }
}

/// Poll interval while waiting for the line to float high before a reset.
pub(crate) const IDLE_POLL_NS: u32 = 2_000;
