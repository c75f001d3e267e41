use crate::{
    dom::Element,
    logging::{LogLevel, Logger},
    outcome::{BestEffort, Ignored},
    reveal::ObserverAction,
    timer::{RepeatingTask, Scheduler},
};
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

pub const COUNTER_THRESHOLD: f64 = 0.5;

/// Reads the integer at the start of `text`, ignoring leading whitespace and
/// anything after the digits (so `"50+"` is 50).
pub fn parse_leading_int(text: &str) -> BestEffort<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(value) => BestEffort::Applied(sign * value),
        Err(_) => BestEffort::Ignored(Ignored::InvalidNumber(text.to_string())),
    }
}

/// Progress of one count-up.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterState {
    target: i64,
    current: f64,
    increment: f64,
}

impl CounterState {
    pub fn new(target: i64, steps: u32) -> Self {
        Self {
            target,
            current: 0.0,
            increment: target as f64 / f64::from(steps.max(1)),
        }
    }

    /// Advances one step. Returns the text to show and whether the count is
    /// complete.
    pub fn step(&mut self) -> (String, bool) {
        self.current += self.increment;
        if self.current >= self.target as f64 {
            (format!("{}+", self.target), true)
        } else {
            (format!("{}+", self.current.floor() as i64), false)
        }
    }
}

pub struct CounterAnimator {
    scheduler: Rc<dyn Scheduler>,
    interval_ms: u32,
    steps: u32,
    logger: Logger,
    started: RefCell<Vec<bool>>,
    tasks: RefCell<Vec<RepeatingTask>>,
}

impl CounterAnimator {
    pub fn new(scheduler: Rc<dyn Scheduler>, interval_ms: u32, steps: u32, logger: Logger) -> Self {
        Self {
            scheduler,
            interval_ms,
            steps,
            logger,
            started: RefCell::new(Vec::new()),
            tasks: RefCell::new(Vec::new()),
        }
    }

    /// Starts the count-up when the counter at `index` first becomes visible.
    ///
    /// Text that is not an integer is left untouched and the element stays
    /// observed. A counter that already started is never restarted.
    pub fn on_intersection<E: Element>(
        &self,
        index: usize,
        element: &E,
        is_intersecting: bool,
    ) -> ObserverAction {
        if self.has_started(index) {
            return ObserverAction::Unobserve;
        }
        if !is_intersecting {
            return ObserverAction::Keep;
        }

        let text = element.text();
        let target = match parse_leading_int(&text) {
            BestEffort::Applied(target) => target,
            BestEffort::Ignored(reason) => {
                self.logger.event(
                    LogLevel::Debug,
                    "counter.parse_ignored",
                    json!({ "reason": reason.to_string() }),
                );
                return ObserverAction::Keep;
            }
        };

        self.mark_started(index);
        element.set_text("0+");
        let mut state = CounterState::new(target, self.steps);
        let element = element.clone();
        let interval_ms = self.interval_ms;
        let task = RepeatingTask::start(Rc::clone(&self.scheduler), interval_ms, move || {
            let (text, done) = state.step();
            element.set_text(&text);
            (!done).then_some(interval_ms)
        });
        self.tasks.borrow_mut().push(task);

        ObserverAction::Unobserve
    }

    fn has_started(&self, index: usize) -> bool {
        self.started.borrow().get(index).copied().unwrap_or(false)
    }

    fn mark_started(&self, index: usize) {
        let mut started = self.started.borrow_mut();
        if started.len() <= index {
            started.resize(index + 1, false);
        }
        started[index] = true;
    }

    pub fn running(&self) -> usize {
        self.tasks.borrow().iter().filter(|task| task.is_running()).count()
    }

    pub fn cancel_all(&self) {
        for task in self.tasks.borrow_mut().drain(..) {
            task.cancel();
        }
    }
}
