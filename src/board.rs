/*
 * The STM32 realization of the I/O capabilities.
 *
 * This module is the only part of the firmware that touches real hardware.
 * It maps the port/pin addresses the control logic uses onto the GPIO lines
 * that are actually wired up, implements the blocking delay over the embassy
 * time driver, and hosts the button task that latches pedestrian requests
 * from interrupt context.
 */

use embassy_futures::select::{Either, select};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Flex, Pull, Speed};
use embassy_time::{Duration, block_for};

use crate::intersection::crossing_request::CROSSING_REQUEST;
use crate::io::{Delay, DigitalIo, Direction, Level, PINS_PER_PORT, Port};

/// The eight output lines the intersection drives: six vehicle lamps and
/// two walk lamps.
pub const LINE_COUNT: usize = 8;

/// Port/pin addressed access to the wired GPIO lines. Writes to addresses
/// that have no line behind them go nowhere, the same as an unconnected
/// pin on the real part.
pub struct Board {
    lines: [((Port, u8), Flex<'static>); LINE_COUNT],
}

impl Board {
    pub fn new(lines: [((Port, u8), Flex<'static>); LINE_COUNT]) -> Self {
        Board { lines }
    }

    fn line(&self, port: Port, pin: u8) -> Option<&Flex<'static>> {
        self.lines
            .iter()
            .find(|(address, _)| *address == (port, pin))
            .map(|(_, line)| line)
    }

    fn line_mut(&mut self, port: Port, pin: u8) -> Option<&mut Flex<'static>> {
        self.lines
            .iter_mut()
            .find(|(address, _)| *address == (port, pin))
            .map(|(_, line)| line)
    }
}

impl DigitalIo for Board {
    fn set_pin_direction(&mut self, port: Port, pin: u8, direction: Direction) {
        if let Some(line) = self.line_mut(port, pin) {
            match direction {
                Direction::Input => line.set_as_input(Pull::None),
                Direction::Output => line.set_as_output(Speed::Low),
            }
        }
    }

    fn write_pin(&mut self, port: Port, pin: u8, level: Level) {
        if let Some(line) = self.line_mut(port, pin) {
            line.set_level(match level {
                Level::Low => embassy_stm32::gpio::Level::Low,
                Level::High => embassy_stm32::gpio::Level::High,
            });
        }
    }

    fn read_pin(&self, port: Port, pin: u8) -> Level {
        match self.line(port, pin) {
            Some(line) if line.is_high() => Level::High,
            _ => Level::Low,
        }
    }

    fn set_port_direction(&mut self, port: Port, directions: u8) {
        for pin in 0..PINS_PER_PORT as u8 {
            let direction = if directions & (1 << pin) != 0 {
                Direction::Output
            } else {
                Direction::Input
            };
            self.set_pin_direction(port, pin, direction);
        }
    }

    fn write_port(&mut self, port: Port, levels: u8) {
        for pin in 0..PINS_PER_PORT as u8 {
            self.write_pin(port, pin, Level::from_bool(levels & (1 << pin) != 0));
        }
    }
}

impl Delay for Board {
    // A pure busy-wait. The control loop is the only thing running on the
    // thread-mode executor, so there is nothing to yield to; requests
    // raised mid-wait are picked up at the top of the next iteration.
    fn wait_millis(&mut self, millis: u64) {
        block_for(Duration::from_millis(millis));
    }
}

/*
 * The pedestrian buttons. Two independent falling-edge lines, no debounce,
 * no distinction between which one fired: either edge latches the same
 * request. This task is spawned on an interrupt executor so the latch
 * write preempts the busy-waiting control loop.
 */
#[embassy_executor::task]
pub async fn crossing_buttons(
    mut button_ns: ExtiInput<'static>,
    mut button_ew: ExtiInput<'static>,
) -> ! {
    loop {
        match select(
            button_ns.wait_for_falling_edge(),
            button_ew.wait_for_falling_edge(),
        )
        .await
        {
            Either::First(()) | Either::Second(()) => CROSSING_REQUEST.raise(),
        }
    }
}
