//! Tick sources that pace stimulus presentation.

use std::{
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::session::Input;

/// Blocking source of periodic ticks.
pub(crate) trait TickSource {
    /// Blocks until the next tick is due.
    fn wait_for_tick(&mut self);
}

/// Fixed cadence measured from the previous deadline, so sleeps do not drift.
#[derive(Debug)]
pub(crate) struct IntervalTicker {
    interval: Duration,
    next_deadline: Instant,
}

impl IntervalTicker {
    /// Starts counting from `now`; the first tick fires one interval later.
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_deadline: now + interval,
        }
    }
}

impl TickSource for IntervalTicker {
    fn wait_for_tick(&mut self) {
        let now = Instant::now();
        if let Some(remaining) = self.next_deadline.checked_duration_since(now) {
            thread::sleep(remaining);
        }
        self.next_deadline += self.interval;
    }
}

/// Forwards ticks from `source` into `inputs` until the receiver hangs up.
pub(crate) fn spawn<T>(mut source: T, inputs: Sender<Input>) -> JoinHandle<()>
where
    T: TickSource + Send + 'static,
{
    thread::spawn(move || loop {
        source.wait_for_tick();
        if inputs.send(Input::Tick).is_err() {
            break;
        }
    })
}
