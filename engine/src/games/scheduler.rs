use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What a periodic callback wants its timer to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerControl {
    Continue,
    /// Replace the period. The next firing happens one new period from now.
    Reschedule(Duration),
    Stop,
}

/// Cancellable handle to a scheduled periodic task. Dropping the handle
/// does not cancel the task.
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub trait Scheduler: Send + Sync + 'static {
    /// First firing after `first_delay`, then every `period`.
    fn schedule_periodic_at<F>(&self, first_delay: Duration, period: Duration, callback: F) -> TimerHandle
    where
        F: FnMut() -> TimerControl + Send + 'static;

    fn schedule_periodic<F>(&self, period: Duration, callback: F) -> TimerHandle
    where
        F: FnMut() -> TimerControl + Send + 'static,
    {
        self.schedule_periodic_at(period, period, callback)
    }
}

/// Runs each periodic callback on its own tokio task. Must be used from
/// within a tokio runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_periodic_at<F>(&self, first_delay: Duration, period: Duration, mut callback: F) -> TimerHandle
    where
        F: FnMut() -> TimerControl + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut timer = periodic_at(first_delay, period);

            loop {
                timer.tick().await;

                match callback() {
                    TimerControl::Continue => {}
                    TimerControl::Reschedule(new_period) => timer = periodic_at(new_period, new_period),
                    TimerControl::Stop => break,
                }
            }
        });

        TimerHandle { task }
    }
}

fn periodic_at(first_delay: Duration, period: Duration) -> tokio::time::Interval {
    let period = period.max(Duration::from_millis(1));
    let mut timer = interval_at(Instant::now() + first_delay, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
