#![no_std]
#![no_main]

/*
 * Firmware entry point. Brings up the peripherals, starts the button task
 * on an interrupt executor, and then hands the thread-mode executor over
 * to the control loop forever.
 */

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::exti::{Channel, ExtiInput};
use embassy_stm32::gpio::{Flex, Pin, Pull};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::usart::{Config, Uart};
use embassy_stm32::{bind_interrupts, peripherals, usart};
use panic_halt as _;

use intersection_control::board::{Board, crossing_buttons};
use intersection_control::intersection::Intersection;
use intersection_control::intersection::crossing_request::CROSSING_REQUEST;
use intersection_control::io;

// The button task lives on its own interrupt executor so that a press is
// latched even while the control loop sits in a busy-wait. UART4 is unused
// by the board; its vector is borrowed to run the executor.
static BUTTON_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn UART4() {
    unsafe { BUTTON_EXECUTOR.on_interrupt() }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());

    bind_interrupts!(struct Irqs {
        USART1 => usart::InterruptHandler<peripherals::USART1>;
    });
    let mut usart = Uart::new(
        peripherals.USART1,
        peripherals.PA10,
        peripherals.PA9,
        Irqs,
        peripherals.DMA1_CH4,
        peripherals.DMA1_CH5,
        Config::default(), // 115200 baud
    )
    .unwrap();
    usart.write(b"intersection controller starting\n").await.unwrap();

    let button_ns = ExtiInput::new(
        peripherals.PD2.degrade(),
        peripherals.EXTI2.degrade(),
        Pull::Up,
    );
    let button_ew = ExtiInput::new(
        peripherals.PD3.degrade(),
        peripherals.EXTI3.degrade(),
        Pull::Up,
    );

    interrupt::UART4.set_priority(Priority::P6);
    let button_spawner = BUTTON_EXECUTOR.start(interrupt::UART4);
    button_spawner
        .spawn(crossing_buttons(button_ns, button_ew))
        .unwrap();

    // The lamp wiring, addressed the way the control logic knows it.
    let board = Board::new([
        (io::NS_GREEN, Flex::new(peripherals.PB0.degrade())),
        (io::NS_YELLOW, Flex::new(peripherals.PB1.degrade())),
        (io::NS_RED, Flex::new(peripherals.PB2.degrade())),
        (io::EW_GREEN, Flex::new(peripherals.PB3.degrade())),
        (io::EW_YELLOW, Flex::new(peripherals.PB4.degrade())),
        (io::EW_RED, Flex::new(peripherals.PB5.degrade())),
        (io::WALK_NS, Flex::new(peripherals.PC2.degrade())),
        (io::WALK_EW, Flex::new(peripherals.PC3.degrade())),
    ]);

    let mut intersection = Intersection::new(board, &CROSSING_REQUEST);
    intersection.run();
}
