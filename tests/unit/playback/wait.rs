use std::collections::VecDeque;

use super::*;

#[derive(Default)]
struct ScriptedEvents {
    batches: VecDeque<Vec<InputEvent>>,
    polls: usize,
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.polls += 1;
        self.batches.pop_front().unwrap_or_default()
    }
}

#[test]
fn returns_first_available_value() {
    let mut events = ScriptedEvents::default();
    let mut tries = 0;
    let out = poll_until(&mut events, Duration::from_millis(1), |_| {
        tries += 1;
        (tries == 3).then_some(42)
    });
    assert_eq!(out, WaitOutcome::Ready(42));
    assert_eq!(events.polls, 3);
}

#[test]
fn quit_cancels_before_the_next_attempt() {
    let mut events = ScriptedEvents::default();
    events.batches.push_back(vec![InputEvent::Key("x".to_string())]);
    events.batches.push_back(vec![InputEvent::Quit]);
    let mut tries = 0;
    let out: WaitOutcome<()> = poll_until(&mut events, Duration::from_millis(1), |_| {
        tries += 1;
        None
    });
    assert_eq!(out, WaitOutcome::Cancelled);
    assert_eq!(tries, 1);
}

#[test]
fn attempt_receives_the_source() {
    let mut events = ScriptedEvents::default();
    let out = poll_until(&mut events, Duration::ZERO, |src| Some(src.polls));
    assert_eq!(out, WaitOutcome::Ready(1));
}
