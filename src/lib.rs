/*
 * Firmware for a four-phase traffic-light intersection with a pedestrian
 * crossing override.
 *
 * The control logic in `intersection` is device-independent: it drives its
 * lamps and waits through the capabilities in `io`, so it runs the same
 * against the STM32 board layer and against the host-side mock used by the
 * tests. The `board` module (behind the `stm32` feature) is the only part of
 * the crate that touches real hardware.
 */
#![cfg_attr(not(test), no_std)]

pub mod intersection;
pub mod io;

#[cfg(feature = "stm32")]
pub mod board;
