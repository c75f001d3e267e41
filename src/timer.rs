use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// One-shot timers on the page's event loop.
pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TimerId>;
    fn clear_timeout(&self, id: TimerId);
}

struct TaskInner {
    scheduler: Rc<dyn Scheduler>,
    step: RefCell<Box<dyn FnMut() -> Option<u32>>>,
    pending: Cell<Option<TimerId>>,
    cancelled: Cell<bool>,
    finished: Cell<bool>,
}

/// A self-rescheduling timer loop.
///
/// `step` runs on every tick and returns the delay before the next tick, or
/// `None` to finish. Dropping the handle does not stop the loop; call
/// [`RepeatingTask::cancel`].
#[derive(Clone)]
pub struct RepeatingTask {
    inner: Rc<TaskInner>,
}

impl RepeatingTask {
    pub fn start(
        scheduler: Rc<dyn Scheduler>,
        initial_delay_ms: u32,
        step: impl FnMut() -> Option<u32> + 'static,
    ) -> Self {
        let inner = Rc::new(TaskInner {
            scheduler,
            step: RefCell::new(Box::new(step)),
            pending: Cell::new(None),
            cancelled: Cell::new(false),
            finished: Cell::new(false),
        });
        schedule_tick(&inner, initial_delay_ms);
        Self { inner }
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.inner.pending.take() {
            self.inner.scheduler.clear_timeout(id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.finished.get()
    }

    pub fn is_running(&self) -> bool {
        !self.is_cancelled() && !self.is_finished()
    }
}

fn schedule_tick(inner: &Rc<TaskInner>, delay_ms: u32) {
    let task = Rc::clone(inner);
    let id = inner.scheduler.set_timeout(
        delay_ms,
        Box::new(move || {
            task.pending.set(None);
            if task.cancelled.get() {
                return;
            }

            let next = {
                let mut step = task.step.borrow_mut();
                step()
            };
            match next {
                Some(delay_ms) if !task.cancelled.get() => schedule_tick(&task, delay_ms),
                Some(_) => {}
                None => task.finished.set(true),
            }
        }),
    );

    match id {
        Some(id) => inner.pending.set(Some(id)),
        // The browser refused the timer; nothing will ever tick again.
        None => inner.finished.set(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualScheduler;

    #[test]
    fn task_reschedules_until_step_returns_none() {
        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));

        let task = {
            let ticks = Rc::clone(&ticks);
            RepeatingTask::start(scheduler.handle(), 10, move || {
                ticks.set(ticks.get() + 1);
                (ticks.get() < 3).then_some(5)
            })
        };

        scheduler.advance(9);
        assert_eq!(ticks.get(), 0);
        scheduler.advance(1);
        assert_eq!(ticks.get(), 1);
        scheduler.advance(10);
        assert_eq!(ticks.get(), 3);
        assert!(task.is_finished());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancel_clears_pending_timer() {
        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));

        let task = {
            let ticks = Rc::clone(&ticks);
            RepeatingTask::start(scheduler.handle(), 10, move || {
                ticks.set(ticks.get() + 1);
                Some(10)
            })
        };

        scheduler.advance(25);
        assert_eq!(ticks.get(), 2);

        task.cancel();
        scheduler.advance(100);

        assert_eq!(ticks.get(), 2);
        assert!(task.is_cancelled());
        assert!(!task.is_running());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancel_from_inside_step_stops_the_loop() {
        let scheduler = ManualScheduler::new();
        let slot: Rc<RefCell<Option<RepeatingTask>>> = Rc::new(RefCell::new(None));
        let ticks = Rc::new(Cell::new(0));

        let task = {
            let slot = Rc::clone(&slot);
            let ticks = Rc::clone(&ticks);
            RepeatingTask::start(scheduler.handle(), 1, move || {
                ticks.set(ticks.get() + 1);
                if let Some(task) = slot.borrow().as_ref() {
                    task.cancel();
                }
                Some(1)
            })
        };
        *slot.borrow_mut() = Some(task.clone());

        scheduler.advance(10);

        assert_eq!(ticks.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }
}
