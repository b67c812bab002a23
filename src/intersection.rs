/*
 * The four-phase intersection state machine.
 *
 * The intersection cycles North-South green, North-South yellow, East-West
 * green, East-West yellow, forever. When a pedestrian request is latched,
 * the iteration that observes it runs the crossing sequence instead of the
 * normal step: any in-progress yellow completes its full dwell, a green is
 * cut short, then all vehicle directions go red for a clearance interval
 * before the walk lamps light. The clearance before the walk signal is a
 * safety interlock; no path through this module ever shows green (or
 * yellow) to both directions at once.
 */

pub mod crossing_request;

use crate::io::{self, Delay, DigitalIo, Direction, Level};
use crossing_request::CrossingRequest;

/* Dwell times, in milliseconds. */
pub const GREEN_MILLIS: u64 = 3000;
pub const YELLOW_MILLIS: u64 = 1000;
pub const ALL_RED_MILLIS: u64 = 100;
pub const WALK_MILLIS: u64 = 3000;

/// The four steady lamp configurations of the normal cycle. Closed and
/// exhaustively matched everywhere: there is no unreachable-state arm to
/// recover from, because no fifth value can be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NsGreenEwRed,
    NsYellowEwRed,
    NsRedEwGreen,
    NsRedEwYellow,
}

impl Phase {
    /*
     * Determine the phase that follows in the normal cycle, without
     * changing anything.
     */
    fn next(self) -> Phase {
        match self {
            Phase::NsGreenEwRed => Phase::NsYellowEwRed,
            Phase::NsYellowEwRed => Phase::NsRedEwGreen,
            Phase::NsRedEwGreen => Phase::NsRedEwYellow,
            Phase::NsRedEwYellow => Phase::NsGreenEwRed,
        }
    }

    fn dwell_millis(self) -> u64 {
        match self {
            Phase::NsGreenEwRed | Phase::NsRedEwGreen => GREEN_MILLIS,
            Phase::NsYellowEwRed | Phase::NsRedEwYellow => YELLOW_MILLIS,
        }
    }

    fn lamps(self) -> Lamps {
        match self {
            Phase::NsGreenEwRed => Lamps::new(true, false, false, false, false, true),
            Phase::NsYellowEwRed => Lamps::new(false, true, false, false, false, true),
            Phase::NsRedEwGreen => Lamps::new(false, false, true, true, false, false),
            Phase::NsRedEwYellow => Lamps::new(false, false, true, false, true, false),
        }
    }
}

/// One fixed assignment of the six vehicle signal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lamps {
    pub ns_green: bool,
    pub ns_yellow: bool,
    pub ns_red: bool,
    pub ew_green: bool,
    pub ew_yellow: bool,
    pub ew_red: bool,
}

impl Lamps {
    /// Both directions red: the clearance interlock shown before the walk
    /// lamps light.
    pub const ALL_RED: Lamps = Lamps::new(false, false, true, false, false, true);

    /// Everything off, as at power-up before the first phase is shown.
    pub const DARK: Lamps = Lamps::new(false, false, false, false, false, false);

    const fn new(
        ns_green: bool,
        ns_yellow: bool,
        ns_red: bool,
        ew_green: bool,
        ew_yellow: bool,
        ew_red: bool,
    ) -> Self {
        Lamps {
            ns_green,
            ns_yellow,
            ns_red,
            ew_green,
            ew_yellow,
            ew_red,
        }
    }
}

/// The intersection controller. Owns the board capabilities and the current
/// phase; shares the request latch with whatever interrupt context raises it.
pub struct Intersection<'a, B: DigitalIo + Delay> {
    board: B,
    request: &'a CrossingRequest,
    phase: Phase,
}

impl<'a, B: DigitalIo + Delay> Intersection<'a, B> {
    pub fn new(board: B, request: &'a CrossingRequest) -> Self {
        Intersection {
            board,
            request,
            phase: Phase::NsGreenEwRed,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Configure line directions and darken every lamp. The vehicle lamps
    /// share port B, so their directions are set with one port write.
    pub fn init(&mut self) {
        self.board
            .set_port_direction(io::Port::B, io::LAMP_PORT_DIRECTIONS);
        let (walk_ns_port, walk_ns_pin) = io::WALK_NS;
        let (walk_ew_port, walk_ew_pin) = io::WALK_EW;
        self.board
            .set_pin_direction(walk_ns_port, walk_ns_pin, Direction::Output);
        self.board
            .set_pin_direction(walk_ew_port, walk_ew_pin, Direction::Output);
        let (button_ns_port, button_ns_pin) = io::BUTTON_NS;
        let (button_ew_port, button_ew_pin) = io::BUTTON_EW;
        self.board
            .set_pin_direction(button_ns_port, button_ns_pin, Direction::Input);
        self.board
            .set_pin_direction(button_ew_port, button_ew_pin, Direction::Input);

        self.show(Lamps::DARK);
        self.set(io::WALK_NS, false);
        self.set(io::WALK_EW, false);
    }

    /// The control loop. Never returns; the only exit is power-down.
    pub fn run(&mut self) -> ! {
        self.init();
        loop {
            self.step();
        }
    }

    /// One loop iteration: observe the latch, then either take the normal
    /// step or serve the crossing.
    pub fn step(&mut self) {
        if self.request.is_raised() {
            self.serve_crossing();
            // Single-shot consumption: presses latched while the sequence
            // ran are discarded along with the one being served.
            self.request.clear();
        } else {
            self.dwell_in(self.phase);
            self.phase = self.phase.next();
        }
    }

    /*
     * The crossing sequence. A yellow phase completes its full dwell before
     * traffic is halted; a green phase is cut short and goes straight to
     * all-red. The clearance interval always separates vehicle traffic from
     * the walk signal.
     */
    fn serve_crossing(&mut self) {
        match self.phase {
            Phase::NsYellowEwRed | Phase::NsRedEwYellow => self.dwell_in(self.phase),
            Phase::NsGreenEwRed | Phase::NsRedEwGreen => {}
        }

        self.show(Lamps::ALL_RED);
        self.board.wait_millis(ALL_RED_MILLIS);
        self.walk_signal();

        self.phase = match self.phase {
            // The skipped green restarts once the pedestrians have crossed.
            Phase::NsGreenEwRed => Phase::NsGreenEwRed,
            Phase::NsRedEwGreen => Phase::NsRedEwGreen,
            // A completed yellow advances as it would have normally.
            Phase::NsYellowEwRed => Phase::NsRedEwGreen,
            Phase::NsRedEwYellow => Phase::NsGreenEwRed,
        };
    }

    /// Both walk lamps on, hold for the crossing time, both off. Invoked
    /// identically no matter which phase the request interrupted.
    fn walk_signal(&mut self) {
        self.set(io::WALK_NS, true);
        self.set(io::WALK_EW, true);
        self.board.wait_millis(WALK_MILLIS);
        self.set(io::WALK_NS, false);
        self.set(io::WALK_EW, false);
    }

    fn dwell_in(&mut self, phase: Phase) {
        self.show(phase.lamps());
        self.board.wait_millis(phase.dwell_millis());
    }

    // North-South lines are written before East-West lines, so a lamp is
    // always extinguished before the opposing direction's comes on.
    fn show(&mut self, lamps: Lamps) {
        self.set(io::NS_GREEN, lamps.ns_green);
        self.set(io::NS_YELLOW, lamps.ns_yellow);
        self.set(io::NS_RED, lamps.ns_red);
        self.set(io::EW_GREEN, lamps.ew_green);
        self.set(io::EW_YELLOW, lamps.ew_yellow);
        self.set(io::EW_RED, lamps.ew_red);
    }

    fn set(&mut self, line: (io::Port, u8), on: bool) {
        self.board.write_pin(line.0, line.1, Level::from_bool(on));
    }
}
