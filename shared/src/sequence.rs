//! Time-delayed continuations polled by their owner every tick.
//!
//! A [`DelayedSequence`] is a list of steps that either fire an action or wait
//! for some seconds. A [`SequenceSlot`] holds at most one sequence: starting a
//! new one drops the previous one, and a dropped sequence never resumes.
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq)]
pub enum Step<T> {
    Fire(T),
    Wait(f32),
}

#[derive(Clone, Debug)]
pub struct DelayedSequence<T> {
    steps: VecDeque<Step<T>>,
    waiting: f32,
}

impl<T> DelayedSequence<T> {
    pub fn new(steps: impl IntoIterator<Item = Step<T>>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            waiting: 0.0,
        }
    }

    /// Consumes `dt` from the current wait, then runs steps until the next
    /// unfinished wait. Fired actions are appended to `fired`.
    /// Returns true once every step has run.
    pub fn advance(&mut self, dt: f32, fired: &mut Vec<T>) -> bool {
        self.waiting -= dt;
        while self.waiting <= 0.0 {
            match self.steps.pop_front() {
                Some(Step::Fire(action)) => fired.push(action),
                Some(Step::Wait(secs)) => self.waiting = secs,
                None => return true,
            }
        }
        false
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty() && self.waiting <= 0.0
    }
}

/// Holds the single outstanding sequence of one logical slot.
#[derive(Clone, Debug)]
pub struct SequenceSlot<T> {
    running: Option<DelayedSequence<T>>,
}

impl<T> Default for SequenceSlot<T> {
    fn default() -> Self {
        Self { running: None }
    }
}

impl<T> SequenceSlot<T> {
    /// Replaces whatever is running and executes the leading steps right away.
    /// The new sequence does not consume the current tick's delta.
    pub fn start(&mut self, mut sequence: DelayedSequence<T>, fired: &mut Vec<T>) {
        let done = sequence.advance(0.0, fired);
        self.running = if done { None } else { Some(sequence) };
    }

    pub fn cancel(&mut self) {
        self.running = None;
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn poll(&mut self, dt: f32, fired: &mut Vec<T>) {
        if let Some(sequence) = self.running.as_mut() {
            if sequence.advance(dt, fired) {
                self.running = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Beep {
        First,
        Second,
        Done,
    }

    fn two_beeps() -> DelayedSequence<Beep> {
        DelayedSequence::new([
            Step::Fire(Beep::First),
            Step::Wait(3.0),
            Step::Fire(Beep::Second),
            Step::Wait(1.0),
            Step::Fire(Beep::Done),
        ])
    }

    #[test]
    fn leading_steps_fire_on_start() {
        let mut slot = SequenceSlot::default();
        let mut fired = Vec::new();
        slot.start(two_beeps(), &mut fired);
        assert_eq!(fired, vec![Beep::First]);
        assert!(slot.is_running());
    }

    #[test]
    fn waits_are_measured_in_polled_time() {
        let mut slot = SequenceSlot::default();
        let mut fired = Vec::new();
        slot.start(two_beeps(), &mut fired);
        fired.clear();

        for _ in 0..5 {
            slot.poll(0.5, &mut fired);
        }
        assert!(fired.is_empty(), "only 2.5s of the 3s wait elapsed");

        slot.poll(0.5, &mut fired);
        assert_eq!(fired, vec![Beep::Second]);

        slot.poll(0.5, &mut fired);
        slot.poll(0.5, &mut fired);
        assert_eq!(fired, vec![Beep::Second, Beep::Done]);
        assert!(!slot.is_running());
    }

    #[test]
    fn cancelled_sequence_never_resumes() {
        let mut slot = SequenceSlot::default();
        let mut fired = Vec::new();
        slot.start(two_beeps(), &mut fired);
        slot.cancel();
        fired.clear();

        slot.poll(10.0, &mut fired);
        assert!(fired.is_empty());
    }

    #[test]
    fn starting_again_replaces_the_previous_sequence() {
        let mut slot = SequenceSlot::default();
        let mut fired = Vec::new();
        slot.start(two_beeps(), &mut fired);
        slot.poll(2.0, &mut fired);
        slot.start(DelayedSequence::new([Step::Wait(5.0), Step::Fire(Beep::Done)]), &mut fired);
        fired.clear();

        slot.poll(1.5, &mut fired);
        assert!(fired.is_empty(), "the old 3s wait must not fire its Second beep");
        slot.poll(3.5, &mut fired);
        assert_eq!(fired, vec![Beep::Done]);
    }

    #[test]
    fn a_long_tick_runs_at_most_past_one_wait_per_step() {
        let mut sequence = two_beeps();
        let mut fired = Vec::new();
        assert!(!sequence.advance(0.0, &mut fired));
        // 10s jump covers the 3s wait; the 1s wait starts fresh afterwards
        assert!(!sequence.advance(10.0, &mut fired));
        assert_eq!(fired, vec![Beep::First, Beep::Second]);
        assert!(sequence.advance(1.0, &mut fired));
        assert!(sequence.is_finished());
    }
}
