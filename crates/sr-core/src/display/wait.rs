use std::thread;
use std::time::Duration;

use tracing::debug;

/// Number of polls and the pause between them for a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub attempts: u32,
    pub interval: Duration,
}

impl PollBudget {
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }
}

/// Wait for the window manager to react to a raise or an unmap
pub const EVENT_SETTLE_BUDGET: PollBudget = PollBudget::new(30, Duration::from_millis(10));

/// Retry a keyboard grab held by another client
pub const KEYBOARD_GRAB_BUDGET: PollBudget = PollBudget::new(20, Duration::from_millis(50));

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Poll `check` until it reports true or the budget runs out.
///
/// Returns `Ok(false)` on timeout; errors from `check` end the wait
/// immediately. Sleeps only between attempts.
pub fn wait_for<E, F>(budget: PollBudget, sleeper: &dyn Sleeper, mut check: F) -> Result<bool, E>
where
    F: FnMut() -> Result<bool, E>,
{
    for attempt in 0..budget.attempts {
        if check()? {
            debug!(event = "core.display.wait_satisfied", attempt = attempt);
            return Ok(true);
        }
        if attempt + 1 < budget.attempts {
            sleeper.sleep(budget.interval);
        }
    }

    debug!(
        event = "core.display.wait_timed_out",
        attempts = budget.attempts
    );
    Ok(false)
}
