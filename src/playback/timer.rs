//! One-shot timers used to advance to the next track

use std::{thread, time::Duration};

use crossbeam::channel::{Sender, after, bounded, select};

pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle of an armed timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: Option<Sender<()>>,
}

impl TimerHandle {
    pub fn new(cancel: Sender<()>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    /// a handle with nothing behind it, for schedulers that track tasks themselves
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            // the timer thread may already be gone
            let _ = cancel.send(());
        }
    }
}

pub trait Scheduler: Send + Sync {
    /// runs `task` once after `delay`, unless the returned handle is cancelled or dropped first
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Runs every timer on its own thread, racing expiry against the cancel channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let (tx, rx) = bounded::<()>(1);

        thread::spawn(move || {
            select! {
                // an explicit cancel or a dropped handle
                recv(rx) -> _ => log::debug!("timer cancelled before expiry"),
                recv(after(delay)) -> _ => task(),
            }
        });

        TimerHandle::new(tx)
    }
}
