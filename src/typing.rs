use crate::{
    config::TypingTimings,
    dom::Element,
    timer::{RepeatingTask, Scheduler},
};
use std::rc::Rc;

pub const PHRASES: [&str; 4] = [
    "Aspiring AI & ML Engineer",
    "Data Science Enthusiast",
    "Building predictive models",
    "Data Analytics and Visualization",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tick {
    pub text: String,
    pub next_delay_ms: u32,
}

/// Position within the phrase cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypingState {
    pub phrase_index: usize,
    pub char_index: usize,
    pub deleting: bool,
}

pub struct TypingCycle {
    phrases: Vec<Vec<char>>,
    timings: TypingTimings,
    state: TypingState,
}

impl TypingCycle {
    /// Empty phrases are dropped. Returns `None` when nothing is left to type.
    pub fn new<S: AsRef<str>>(phrases: &[S], timings: TypingTimings) -> Option<Self> {
        let phrases: Vec<Vec<char>> = phrases
            .iter()
            .map(|phrase| phrase.as_ref().chars().collect())
            .filter(|chars: &Vec<char>| !chars.is_empty())
            .collect();
        if phrases.is_empty() {
            return None;
        }

        Some(Self {
            phrases,
            timings,
            state: TypingState::default(),
        })
    }

    pub fn state(&self) -> &TypingState {
        &self.state
    }

    pub fn tick(&mut self) -> Tick {
        let phrase = &self.phrases[self.state.phrase_index];
        let mut next_delay_ms;

        if self.state.deleting {
            self.state.char_index -= 1;
            next_delay_ms = self.timings.delete_interval_ms;
        } else {
            self.state.char_index += 1;
            next_delay_ms = self.timings.type_interval_ms;
        }
        let text: String = phrase[..self.state.char_index].iter().collect();

        if !self.state.deleting && self.state.char_index == phrase.len() {
            self.state.deleting = true;
            next_delay_ms = self.timings.hold_full_ms;
        } else if self.state.deleting && self.state.char_index == 0 {
            self.state.deleting = false;
            self.state.phrase_index = (self.state.phrase_index + 1) % self.phrases.len();
            next_delay_ms = self.timings.hold_empty_ms;
        }

        Tick { text, next_delay_ms }
    }
}

/// Starts the endless typing loop on `target`.
pub fn start_typing<E: Element, S: AsRef<str>>(
    target: E,
    phrases: &[S],
    timings: TypingTimings,
    scheduler: Rc<dyn Scheduler>,
) -> Option<RepeatingTask> {
    let mut cycle = TypingCycle::new(phrases, timings)?;

    Some(RepeatingTask::start(scheduler, timings.start_delay_ms, move || {
        let tick = cycle.tick();
        target.set_text(&tick.text);
        Some(tick.next_delay_ms)
    }))
}
