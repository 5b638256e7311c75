//! Power control, slot timing and failure handling, observed through recording lines.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use embedded_hal::{delay::DelayNs, digital::PinState};
use onewire_bitbang::{BitBangBuilder, BitBangError, BusLine, OneWire, OneWireError};
use onewire_core::{OneWireSearchKind, OneWireStatus, PowerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Read,
    Write(PinState),
    Input(bool),
    Output(PinState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineFault;

/// Logs every call; reads pop scripted levels and default to high.
#[derive(Clone, Default)]
struct RecordingLine {
    events: Rc<RefCell<Vec<Event>>>,
    levels: Rc<RefCell<VecDeque<PinState>>>,
    fail_reads: Rc<Cell<bool>>,
    broken: Rc<Cell<bool>>,
}

impl RecordingLine {
    fn script(&self, levels: &[PinState]) {
        self.levels.borrow_mut().extend(levels.iter().copied());
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn last(&self) -> Option<Event> {
        self.events.borrow().last().copied()
    }

    fn record(&self, event: Event) -> Result<(), LineFault> {
        if self.broken.get() {
            return Err(LineFault);
        }
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

impl BusLine for RecordingLine {
    type Error = LineFault;

    fn read_level(&mut self) -> Result<PinState, LineFault> {
        if self.fail_reads.get() {
            return Err(LineFault);
        }
        self.record(Event::Read)?;
        Ok(self.levels.borrow_mut().pop_front().unwrap_or(PinState::High))
    }

    fn write_level(&mut self, level: PinState) -> Result<(), LineFault> {
        self.record(Event::Write(level))
    }

    fn set_input(&mut self, pull_up: bool) -> Result<(), LineFault> {
        self.record(Event::Input(pull_up))
    }

    fn set_output(&mut self, level: PinState) -> Result<(), LineFault> {
        self.record(Event::Output(level))
    }
}

#[derive(Clone, Default)]
struct RecordingDelay {
    waits: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    fn waits(&self) -> Vec<u32> {
        self.waits.borrow().clone()
    }

    fn clear(&self) {
        self.waits.borrow_mut().clear();
    }

    fn total(&self) -> u64 {
        self.waits.borrow().iter().map(|&w| u64::from(w)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits.borrow_mut().push(ns);
    }
}

/// Idle, presence, end-of-reset levels of a reset with one device answering.
const PRESENT: [PinState; 3] = [PinState::High, PinState::Low, PinState::High];

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn build_releases_the_data_line() {
    init();
    let data = RecordingLine::default();
    BitBangBuilder::default()
        .with_pull_up(true)
        .build(data.clone(), RecordingDelay::default())
        .unwrap();
    assert_eq!(data.events(), [Event::Input(true)]);
}

#[test]
fn unusable_lines_are_rejected() {
    init();
    let data = RecordingLine::default();
    data.broken.set(true);
    let res = BitBangBuilder::default().build(data, RecordingDelay::default());
    assert!(matches!(res, Err(OneWireError::InvalidPinConfiguration)));

    let power = RecordingLine::default();
    power.broken.set(true);
    let res = BitBangBuilder::default().build_switched(
        RecordingLine::default(),
        power,
        PinState::Low,
        RecordingDelay::default(),
    );
    assert!(matches!(res, Err(OneWireError::InvalidPinConfiguration)));
}

#[test]
fn standard_speed_timing() {
    init();
    let data = RecordingLine::default();
    let delay = RecordingDelay::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), delay.clone())
        .unwrap();

    data.script(&PRESENT);
    assert!(bus.reset().unwrap().presence());
    assert_eq!(delay.waits(), [480_000, 70_000, 410_000]);

    delay.clear();
    bus.write_bit(true).unwrap();
    bus.write_bit(false).unwrap();
    assert_eq!(delay.waits(), [6_000, 64_000, 60_000, 10_000]);

    delay.clear();
    bus.read_bit().unwrap();
    assert_eq!(delay.waits(), [6_000, 9_000, 55_000]);
}

#[test]
fn bytes_go_out_least_significant_bit_first() {
    init();
    let data = RecordingLine::default();
    let delay = RecordingDelay::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), delay.clone())
        .unwrap();
    data.script(&PRESENT);
    bus.reset().unwrap();

    delay.clear();
    bus.write_byte(0x81).unwrap();
    let lows: Vec<u32> = delay.waits().iter().step_by(2).copied().collect();
    assert_eq!(
        lows,
        [6_000, 60_000, 60_000, 60_000, 60_000, 60_000, 60_000, 6_000]
    );

    use PinState::{High as H, Low as L};
    data.script(&[H, L, H, L, L, H, L, H]);
    assert_eq!(bus.read_byte().unwrap(), 0xa5);
}

#[test]
fn overdrive_switch() {
    init();
    let data = RecordingLine::default();
    let delay = RecordingDelay::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), delay.clone())
        .unwrap();

    data.script(&PRESENT);
    data.script(&PRESENT);
    bus.set_overdrive_mode(true).unwrap();
    assert!(bus.get_overdrive_mode());
    let waits = delay.waits();
    assert_eq!(waits[..3], [480_000, 70_000, 410_000]);
    // Overdrive Skip ROM at standard speed
    let lows: Vec<u32> = waits[3..19].iter().step_by(2).copied().collect();
    assert_eq!(
        lows,
        [60_000, 60_000, 6_000, 6_000, 6_000, 6_000, 60_000, 60_000]
    );
    assert_eq!(waits[19..], [70_000, 8_500, 40_000]);

    delay.clear();
    bus.write_bit(true).unwrap();
    bus.read_bit().unwrap();
    assert_eq!(delay.waits(), [1_000, 9_000, 1_000, 1_000, 8_000]);

    data.script(&PRESENT);
    let status = bus.reset().unwrap();
    assert!(status.overdrive());

    delay.clear();
    data.script(&PRESENT);
    bus.set_overdrive_mode(false).unwrap();
    assert!(!bus.get_overdrive_mode());
    assert_eq!(delay.waits(), [480_000, 70_000, 410_000]);
}

#[test]
fn overdrive_needs_a_device() {
    init();
    let data = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), RecordingDelay::default())
        .unwrap();
    assert!(matches!(
        bus.set_overdrive_mode(true),
        Err(OneWireError::NoDevicePresent)
    ));
    assert!(!bus.get_overdrive_mode());
}

#[test]
fn failed_reset_after_speed_change_blocks_slots() {
    init();
    let data = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), RecordingDelay::default())
        .unwrap();
    data.script(&PRESENT);
    data.script(&PRESENT);
    bus.set_overdrive_mode(true).unwrap();

    data.fail_reads.set(true);
    assert_eq!(
        bus.set_overdrive_mode(false),
        Err(OneWireError::Other(BitBangError::Data(LineFault)))
    );
    data.fail_reads.set(false);
    assert_eq!(bus.write_bit(true), Err(OneWireError::BusUninitialized));

    data.script(&PRESENT);
    bus.reset().unwrap();
    assert_eq!(bus.write_bit(true), Ok(()));
}

#[test]
fn failed_slot_leaves_the_line_released() {
    init();
    let data = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), RecordingDelay::default())
        .unwrap();
    data.script(&PRESENT);
    bus.reset().unwrap();

    data.fail_reads.set(true);
    assert!(bus.read_bit().is_err());
    assert_eq!(data.last(), Some(Event::Input(false)));
}

#[test]
fn line_stuck_low_is_a_short() {
    init();
    let data = RecordingLine::default();
    let delay = RecordingDelay::default();
    let mut bus = BitBangBuilder::default()
        .with_short_retries(4)
        .build(data.clone(), delay.clone())
        .unwrap();
    data.clear();
    data.script(&[PinState::Low; 5]);
    let status = bus.reset().unwrap();
    assert!(status.shortcircuit());
    assert!(data.events().iter().all(|e| *e == Event::Read));
    assert_eq!(delay.waits(), [2_000; 4]);

    data.script(&[PinState::Low; 5]);
    assert_eq!(
        bus.search(OneWireSearchKind::Normal).next(),
        Err(OneWireError::BusShortOrNoDevices)
    );
}

#[test]
fn line_low_after_presence_is_a_short() {
    init();
    let data = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), RecordingDelay::default())
        .unwrap();
    data.script(&[PinState::High, PinState::Low, PinState::Low]);
    let status = bus.reset().unwrap();
    assert!(status.presence());
    assert!(status.shortcircuit());
    assert_eq!(OneWireStatus::logic_level(&status), Some(false));
}

#[test]
fn without_power_control_nothing_moves() {
    init();
    let data = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build(data.clone(), RecordingDelay::default())
        .unwrap();
    data.script(&PRESENT);
    bus.reset().unwrap();
    assert_eq!(bus.power_mode(), PowerMode::None);

    data.clear();
    assert_eq!(
        bus.write_byte_powered(0x44),
        Err(OneWireError::PowerControlUnavailable)
    );
    assert_eq!(
        bus.write_bit_powered(true),
        Err(OneWireError::PowerControlUnavailable)
    );
    assert_eq!(
        bus.set_bus_power(true),
        Err(OneWireError::PowerControlUnavailable)
    );
    assert!(data.events().is_empty());
}

#[test]
fn parasitic_power_drives_the_data_line() {
    init();
    let data = RecordingLine::default();
    let delay = RecordingDelay::default();
    let mut bus = BitBangBuilder::default()
        .build_parasitic(data.clone(), delay.clone())
        .unwrap();
    assert_eq!(bus.power_mode(), PowerMode::Parasitic);
    data.script(&PRESENT);
    bus.reset().unwrap();

    bus.write_byte_powered(0x44).unwrap();
    assert!(bus.is_powered());
    assert_eq!(data.last(), Some(Event::Output(PinState::High)));

    // the next slot drops power before it starts
    data.clear();
    bus.read_bit().unwrap();
    assert!(!bus.is_powered());
    assert_eq!(data.events()[..2], [Event::Input(false), Event::Output(PinState::Low)]);

    data.clear();
    delay.clear();
    bus.hold_power_ms(750).unwrap();
    assert_eq!(
        data.events(),
        [Event::Output(PinState::High), Event::Input(false)]
    );
    assert_eq!(delay.total(), 750_000_000);
    assert!(!bus.is_powered());

    bus.set_bus_power(true).unwrap();
    data.clear();
    data.script(&PRESENT);
    bus.reset().unwrap();
    assert_eq!(data.events()[0], Event::Input(false));
}

#[test]
fn switched_power_uses_its_own_line() {
    init();
    let data = RecordingLine::default();
    let power = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build_switched(
            data.clone(),
            power.clone(),
            PinState::High,
            RecordingDelay::default(),
        )
        .unwrap();
    assert_eq!(bus.power_mode(), PowerMode::SwitchedGpio);
    assert_eq!(power.events(), [Event::Output(PinState::Low)]);

    data.script(&PRESENT);
    bus.reset().unwrap();
    bus.write_byte_powered(0x44).unwrap();
    assert!(bus.is_powered());
    assert_eq!(data.last(), Some(Event::Input(false)));
    assert_eq!(power.last(), Some(Event::Write(PinState::High)));

    data.clear();
    bus.set_bus_power(false).unwrap();
    assert!(data.events().is_empty());
    assert_eq!(power.last(), Some(Event::Write(PinState::Low)));

    bus.set_bus_power(true).unwrap();
    assert!(bus.is_powered());
    assert!(data.events().is_empty());
    assert_eq!(power.last(), Some(Event::Write(PinState::High)));
    bus.set_bus_power(false).unwrap();
    assert!(data.events().is_empty());
}

#[test]
fn switched_power_active_low() {
    init();
    let power = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build_switched(
            RecordingLine::default(),
            power.clone(),
            PinState::Low,
            RecordingDelay::default(),
        )
        .unwrap();
    assert_eq!(power.events(), [Event::Output(PinState::High)]);
    bus.set_bus_power(true).unwrap();
    assert_eq!(power.last(), Some(Event::Write(PinState::Low)));
    // already on
    bus.set_bus_power(true).unwrap();
    assert_eq!(power.events().len(), 2);
    bus.set_bus_power(false).unwrap();
    assert_eq!(power.last(), Some(Event::Write(PinState::High)));
}

#[test]
fn power_line_failure_is_reported_as_such() {
    init();
    let power = RecordingLine::default();
    let mut bus = BitBangBuilder::default()
        .build_switched(
            RecordingLine::default(),
            power.clone(),
            PinState::High,
            RecordingDelay::default(),
        )
        .unwrap();
    power.broken.set(true);
    assert_eq!(
        bus.set_bus_power(true),
        Err(OneWireError::Other(BitBangError::Power(LineFault)))
    );
    assert!(!bus.is_powered());
}
