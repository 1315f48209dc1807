mod broadcaster;
mod scheduler;
mod session_rng;

pub mod snake;

pub use broadcaster::{GameBroadcaster, NullBroadcaster};
#[cfg(test)]
pub(crate) use broadcaster::RecordingBroadcaster;
pub use scheduler::{Scheduler, TimerControl, TimerHandle, TokioScheduler};
pub use session_rng::SessionRng;
