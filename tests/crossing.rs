/*
 * End-to-end scenarios for the intersection control loop, replayed against
 * the journaling mock board. The journal records every lamp write and every
 * wait in program order, so these tests can check not only where the state
 * machine ended up but what the lamps showed at each observable instant on
 * the way there.
 */

use intersection_control::intersection::crossing_request::CrossingRequest;
use intersection_control::intersection::{
    ALL_RED_MILLIS, Intersection, Phase, WALK_MILLIS, YELLOW_MILLIS,
};
use intersection_control::io::mock::{Event, MockBoard};
use intersection_control::io::{self, Level, Port};

/// Instantaneous levels of the six vehicle lamps, reconstructed by
/// replaying a journal prefix.
#[derive(Debug, Default, Clone, Copy)]
struct LampTrace {
    ns_green: bool,
    ns_yellow: bool,
    ns_red: bool,
    ew_green: bool,
    ew_yellow: bool,
    ew_red: bool,
}

impl LampTrace {
    fn apply(&mut self, event: &Event) {
        if let Event::Write { port, pin, level } = event {
            let on = *level == Level::High;
            match (*port, *pin) {
                addr if addr == io::NS_GREEN => self.ns_green = on,
                addr if addr == io::NS_YELLOW => self.ns_yellow = on,
                addr if addr == io::NS_RED => self.ns_red = on,
                addr if addr == io::EW_GREEN => self.ew_green = on,
                addr if addr == io::EW_YELLOW => self.ew_yellow = on,
                addr if addr == io::EW_RED => self.ew_red = on,
                _ => {}
            }
        }
    }

    fn assert_safe(&self) {
        assert!(
            !(self.ns_green && self.ew_green),
            "both directions green: {self:?}"
        );
        assert!(
            !(self.ns_yellow && self.ew_yellow),
            "both directions yellow: {self:?}"
        );
    }

    fn is_all_red(&self) -> bool {
        self.ns_red
            && self.ew_red
            && !self.ns_green
            && !self.ns_yellow
            && !self.ew_green
            && !self.ew_yellow
    }
}

fn ready(request: &CrossingRequest) -> Intersection<'_, MockBoard> {
    let mut intersection = Intersection::new(MockBoard::new(), request);
    intersection.init();
    intersection.board_mut().clear_journal();
    intersection
}

fn advance_to(intersection: &mut Intersection<'_, MockBoard>, phase: Phase) {
    for _ in 0..4 {
        if intersection.phase() == phase {
            return;
        }
        intersection.step();
    }
    panic!("phase {phase:?} not reachable");
}

fn position(journal: &[Event], wanted: Event) -> Option<usize> {
    journal.iter().position(|event| *event == wanted)
}

#[test]
fn no_unsafe_lamp_combination_at_any_instant() {
    // Two full normal cycles, then an override from every entry phase, all
    // on one board; the safety invariant must hold at every journal point.
    let request = CrossingRequest::new();
    let mut intersection = ready(&request);

    for _ in 0..8 {
        intersection.step();
    }
    for entry in [
        Phase::NsGreenEwRed,
        Phase::NsYellowEwRed,
        Phase::NsRedEwGreen,
        Phase::NsRedEwYellow,
    ] {
        advance_to(&mut intersection, entry);
        request.raise();
        intersection.step();
    }

    let mut trace = LampTrace::default();
    for event in intersection.board().journal.iter() {
        trace.apply(event);
        trace.assert_safe();
    }
}

#[test]
fn first_iteration_shows_green_then_hands_over_to_yellow() {
    let request = CrossingRequest::new();
    let mut intersection = ready(&request);

    intersection.step();
    assert_eq!(intersection.phase(), Phase::NsYellowEwRed);
    assert!(intersection.board().is_high(io::NS_GREEN));
    assert!(intersection.board().is_high(io::EW_RED));

    // The yellow assignment goes onto the lines as its iteration starts.
    intersection.step();
    let board = intersection.board();
    assert!(board.is_high(io::NS_YELLOW));
    assert!(board.is_high(io::EW_RED));
    assert!(!board.is_high(io::NS_GREEN));
}

#[test]
fn crossing_during_ew_green_never_shows_ew_green() {
    let request = CrossingRequest::new();
    let mut intersection = ready(&request);
    advance_to(&mut intersection, Phase::NsRedEwGreen);
    intersection.board_mut().clear_journal();

    request.raise();
    intersection.step();

    let journal: &[Event] = &intersection.board().journal;

    // The EW green lamp is cut out entirely.
    let (ew_green_port, ew_green_pin) = io::EW_GREEN;
    assert_eq!(
        position(
            journal,
            Event::Write {
                port: ew_green_port,
                pin: ew_green_pin,
                level: Level::High,
            },
        ),
        None
    );

    // The clearance dwell happens with every vehicle direction on red.
    let clearance =
        position(journal, Event::Wait { millis: ALL_RED_MILLIS }).expect("no clearance dwell");
    let mut trace = LampTrace::default();
    for event in &journal[..clearance] {
        trace.apply(event);
    }
    assert!(trace.is_all_red(), "clearance began at {trace:?}");

    // Walk lamps pulse after the clearance, then everything returns.
    let (walk_port, walk_pin) = io::WALK_NS;
    let walk_on = position(
        journal,
        Event::Write {
            port: walk_port,
            pin: walk_pin,
            level: Level::High,
        },
    )
    .expect("walk lamp never lit");
    let walk_off = position(
        journal,
        Event::Write {
            port: walk_port,
            pin: walk_pin,
            level: Level::Low,
        },
    )
    .expect("walk lamp never cleared");
    assert!(clearance < walk_on && walk_on < walk_off);

    assert_eq!(intersection.phase(), Phase::NsRedEwGreen);
    assert!(!request.is_raised());
}

#[test]
fn crossing_during_yellow_lets_the_yellow_finish() {
    let request = CrossingRequest::new();
    let mut intersection = ready(&request);
    advance_to(&mut intersection, Phase::NsYellowEwRed);
    intersection.board_mut().clear_journal();

    request.raise();
    intersection.step();

    let journal: &[Event] = &intersection.board().journal;
    let dwells: Vec<u64> = journal
        .iter()
        .filter_map(|event| match event {
            Event::Wait { millis } => Some(*millis),
            Event::Write { .. } => None,
        })
        .collect();
    assert_eq!(dwells, [YELLOW_MILLIS, ALL_RED_MILLIS, WALK_MILLIS]);

    // The yellow dwell ran with the yellow assignment on the lines.
    let yellow_dwell =
        position(journal, Event::Wait { millis: YELLOW_MILLIS }).expect("yellow dwell missing");
    let mut trace = LampTrace::default();
    for event in &journal[..yellow_dwell] {
        trace.apply(event);
    }
    assert!(trace.ns_yellow && trace.ew_red && !trace.ns_green);

    assert_eq!(intersection.phase(), Phase::NsRedEwGreen);
    assert!(!request.is_raised());
}

#[test]
fn held_button_crosses_once_and_traffic_resumes() {
    let request = CrossingRequest::new();
    let mut intersection = ready(&request);

    // A bouncing, held button latches any number of times before the loop
    // looks at it.
    for _ in 0..5 {
        request.raise();
    }
    intersection.step();
    assert!(!request.is_raised());
    assert_eq!(intersection.phase(), Phase::NsGreenEwRed);

    let walk_pulses = intersection
        .board()
        .journal
        .iter()
        .filter(|event| matches!(event, Event::Wait { millis } if *millis == WALK_MILLIS))
        .count();
    assert_eq!(walk_pulses, 1);

    // With the latch consumed, the cycle restarts normally.
    intersection.board_mut().clear_journal();
    for expected in [
        Phase::NsYellowEwRed,
        Phase::NsRedEwGreen,
        Phase::NsRedEwYellow,
        Phase::NsGreenEwRed,
    ] {
        intersection.step();
        assert_eq!(intersection.phase(), expected);
    }
}

#[test]
fn init_leaves_every_lamp_dark_and_buttons_as_inputs() {
    use intersection_control::io::Direction;

    let request = CrossingRequest::new();
    let mut intersection = Intersection::new(MockBoard::new(), &request);
    intersection.init();

    let board = intersection.board();
    for line in [
        io::NS_GREEN,
        io::NS_YELLOW,
        io::NS_RED,
        io::EW_GREEN,
        io::EW_YELLOW,
        io::EW_RED,
        io::WALK_NS,
        io::WALK_EW,
    ] {
        assert!(!board.is_high(line), "{line:?} lit at init");
        assert_eq!(board.direction(line), Direction::Output);
    }
    assert_eq!(board.direction(io::BUTTON_NS), Direction::Input);
    assert_eq!(board.direction(io::BUTTON_EW), Direction::Input);

    // Ports are a closed four-group enumeration; the lamp ports are B and C.
    assert_eq!(board.level((Port::A, 0)), Level::Low);
}
