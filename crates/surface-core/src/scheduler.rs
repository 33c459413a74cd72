//! Delayed one-shot callbacks on the control-surface event thread
//!
//! Used to debounce bursts of updates (e.g. note mapping refreshes while a
//! scale knob is turned). The host's event loop calls [`TaskQueue::run_due`]
//! on every tick. Tasks run once, in the order they were scheduled; there is
//! no cancellation and no coalescing, so a task may find that state changed
//! again since it was scheduled.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

type Task = Box<dyn FnOnce()>;

struct Scheduled {
    due: Instant,
    task: Task,
}

/// Single-threaded queue of delayed tasks
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<Vec<Scheduled>>,
    executed: Cell<u64>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once after `delay`
    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) {
        self.schedule_at(Instant::now() + delay, task);
    }

    /// Run `task` once at or after `due`
    pub fn schedule_at(&self, due: Instant, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push(Scheduled {
            due,
            task: Box::new(task),
        });
    }

    /// Number of tasks waiting
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Total number of tasks run so far
    pub fn executed(&self) -> u64 {
        self.executed.get()
    }

    /// Run every task due at `now`, in scheduling order
    ///
    /// Tasks scheduled while running are left for a later call. Returns the
    /// number of tasks run.
    pub fn run_due(&self, now: Instant) -> usize {
        let due: Vec<Scheduled> = {
            let mut tasks = self.tasks.borrow_mut();
            let (due, waiting): (Vec<_>, Vec<_>) =
                tasks.drain(..).partition(|scheduled| scheduled.due <= now);
            *tasks = waiting;
            due
        };

        let count = due.len();
        for scheduled in due {
            (scheduled.task)();
        }
        if count > 0 {
            self.executed.set(self.executed.get() + count as u64);
            log::trace!("TaskQueue: Ran {} task(s), {} pending", count, self.pending());
        }
        count
    }
}
