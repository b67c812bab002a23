/*
 * Host-side test double for the I/O capabilities.
 *
 * `MockBoard` implements both `DigitalIo` and `Delay`. It keeps the
 * instantaneous level and direction of every line, and it journals every
 * write and wait in order, so tests can replay a whole control-loop
 * iteration and check what the lamps showed at each observable instant.
 */

use enum_ordinalize::Ordinalize;
use heapless::Vec;

use super::{Delay, DigitalIo, Direction, Level, PINS_PER_PORT, Port};

pub const JOURNAL_CAPACITY: usize = 256;

/// One observable side effect of the control loop, in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write { port: Port, pin: u8, level: Level },
    Wait { millis: u64 },
}

pub struct MockBoard {
    levels: [[Level; PINS_PER_PORT]; Port::VARIANT_COUNT],
    directions: [[Direction; PINS_PER_PORT]; Port::VARIANT_COUNT],
    pub journal: Vec<Event, JOURNAL_CAPACITY>,
}

impl MockBoard {
    pub fn new() -> Self {
        MockBoard {
            levels: [[Level::Low; PINS_PER_PORT]; Port::VARIANT_COUNT],
            directions: [[Direction::Input; PINS_PER_PORT]; Port::VARIANT_COUNT],
            journal: Vec::new(),
        }
    }

    pub fn level(&self, line: (Port, u8)) -> Level {
        self.levels[line.0.ordinal()][line.1 as usize]
    }

    pub fn is_high(&self, line: (Port, u8)) -> bool {
        self.level(line).is_high()
    }

    pub fn direction(&self, line: (Port, u8)) -> Direction {
        self.directions[line.0.ordinal()][line.1 as usize]
    }

    /// Drive an input line from the "outside world" without journaling,
    /// the way a button or sensor would.
    pub fn set_input_level(&mut self, line: (Port, u8), level: Level) {
        self.levels[line.0.ordinal()][line.1 as usize] = level;
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn record(&mut self, event: Event) {
        self.journal.push(event).expect("mock journal full");
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalIo for MockBoard {
    fn set_pin_direction(&mut self, port: Port, pin: u8, direction: Direction) {
        self.directions[port.ordinal()][pin as usize] = direction;
    }

    fn write_pin(&mut self, port: Port, pin: u8, level: Level) {
        self.levels[port.ordinal()][pin as usize] = level;
        self.record(Event::Write { port, pin, level });
    }

    fn read_pin(&self, port: Port, pin: u8) -> Level {
        self.levels[port.ordinal()][pin as usize]
    }

    fn set_port_direction(&mut self, port: Port, directions: u8) {
        for pin in 0..PINS_PER_PORT {
            let direction = if directions & (1 << pin) != 0 {
                Direction::Output
            } else {
                Direction::Input
            };
            self.directions[port.ordinal()][pin] = direction;
        }
    }

    fn write_port(&mut self, port: Port, levels: u8) {
        // Journaled pin by pin so replays see every line change.
        for pin in 0..PINS_PER_PORT as u8 {
            let level = Level::from_bool(levels & (1 << pin) != 0);
            self.write_pin(port, pin, level);
        }
    }
}

impl Delay for MockBoard {
    fn wait_millis(&mut self, millis: u64) {
        self.record(Event::Wait { millis });
    }
}
