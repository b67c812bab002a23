/*
 * The digital I/O capabilities that the control logic consumes.
 *
 * The intersection state machine never touches device registers. It drives
 * its lamps through the `DigitalIo` trait and waits through the `Delay`
 * trait, both of which are implemented by the board layer on real hardware
 * and by `mock::MockBoard` on the host. The trait surface mirrors a classic
 * port/pin DIO layer: four addressable 8-line ports, per-pin and whole-port
 * direction and write operations, plus a pin read.
 */

pub mod mock;

use enum_ordinalize::Ordinalize;

/// The four addressable 8-line I/O port groups. A closed enumeration: there
/// is no way to address a fifth port.
#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Port {
    A,
    B,
    C,
    D,
}

pub const PINS_PER_PORT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    pub fn from_bool(on: bool) -> Self {
        if on { Level::High } else { Level::Low }
    }
}

/// Port/pin addressed digital I/O. For the whole-port operations the byte is
/// interpreted least-significant-bit-first: bit `n` controls pin `n`. For
/// direction bytes a set bit means output.
pub trait DigitalIo {
    fn set_pin_direction(&mut self, port: Port, pin: u8, direction: Direction);
    fn write_pin(&mut self, port: Port, pin: u8, level: Level);
    fn read_pin(&self, port: Port, pin: u8) -> Level;
    fn set_port_direction(&mut self, port: Port, directions: u8);
    fn write_port(&mut self, port: Port, levels: u8);
}

/// Blocking wait. This is a busy-wait with no early wake: the control loop
/// has nothing else to run, so there is nothing to yield to. A pedestrian
/// request raised mid-wait is observed at the top of the next iteration.
pub trait Delay {
    fn wait_millis(&mut self, millis: u64);
}

/*
 * The fixed wiring of the intersection. Vehicle lamps sit together on port B
 * so the whole port can be configured as output in one write; the walk lamps
 * and the two crossing buttons live on ports C and D.
 */
pub const NS_GREEN: (Port, u8) = (Port::B, 0);
pub const NS_YELLOW: (Port, u8) = (Port::B, 1);
pub const NS_RED: (Port, u8) = (Port::B, 2);
pub const EW_GREEN: (Port, u8) = (Port::B, 3);
pub const EW_YELLOW: (Port, u8) = (Port::B, 4);
pub const EW_RED: (Port, u8) = (Port::B, 5);

pub const WALK_NS: (Port, u8) = (Port::C, 2);
pub const WALK_EW: (Port, u8) = (Port::C, 3);

pub const BUTTON_NS: (Port, u8) = (Port::D, 2);
pub const BUTTON_EW: (Port, u8) = (Port::D, 3);

/// Direction byte that makes the six vehicle-lamp lines on port B outputs.
pub const LAMP_PORT_DIRECTIONS: u8 = 0b0011_1111;
