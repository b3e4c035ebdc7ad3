//! Idle Timer.
//!
//! Periodic tokio task that runs the controller's idle check. The handle
//! owns the task: cancelling or dropping it stops the ticks.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::controller::MoodController;

/// Default spacing between idle checks.
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// Running idle check. Must be started inside a tokio runtime.
#[derive(Debug)]
pub struct IdleTimer {
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl IdleTimer {
    /// Starts ticking every `period`; the first tick lands one period from now.
    ///
    /// The task only holds a weak handle and ends on its own once the
    /// controller is gone.
    pub fn start(controller: &MoodController, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let weak = controller.downgrade();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // A late tick fires once and the schedule restarts from there.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(controller) = weak.upgrade() else {
                    debug!("Controller dropped, idle timer exiting");
                    break;
                };
                if controller.check_idle() {
                    debug!(idle_for = ?controller.idle_for(), "Idle tick put companion to sleep");
                }
            }
        });

        info!(?period, timeout = ?controller.idle_timeout(), "Idle timer started");
        Self {
            handle: Some(handle),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the ticks. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Idle timer stopped");
        }
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
