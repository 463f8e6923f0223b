//! Periodic background tasks.
//!
//! [`PeriodicTask`] runs a tick closure on its own named thread at a
//! fixed period, replacing an external timer facility with plain threads.
//! Shutdown is signalled through a flag + condvar so `stop()` takes
//! effect at the next wakeup instead of waiting out a full period; an
//! in-flight tick may still complete.
//!
//! A tick that panics is caught and logged; one failing tick must never
//! terminate the schedule, because the cache relies on these tasks for
//! its forced-eviction and stats-reporting contracts.

use std::panic::{self, AssertUnwindSafe};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

struct Signal {
    stopped: Mutex<bool>,
    wakeup: Condvar,
}

/// A background thread invoking a tick closure at a fixed period.
///
/// The first tick fires one full period after spawn. Dropping the task
/// stops it.
pub struct PeriodicTask {
    signal: Arc<Signal>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicTask {
    /// Spawns the task thread. `name` labels the thread and log events.
    pub fn spawn<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let signal = Arc::new(Signal {
            stopped: Mutex::new(false),
            wakeup: Condvar::new(),
        });

        let thread_signal = Arc::clone(&signal);
        let handle = std::thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                loop {
                    let deadline = Instant::now() + period;
                    {
                        let mut stopped = thread_signal.stopped.lock();
                        // Re-arm on spurious wakeups until the deadline
                        // actually passes or shutdown is requested.
                        while !*stopped {
                            if thread_signal
                                .wakeup
                                .wait_until(&mut stopped, deadline)
                                .timed_out()
                            {
                                break;
                            }
                        }
                        if *stopped {
                            return;
                        }
                    }
                    if panic::catch_unwind(AssertUnwindSafe(|| tick())).is_err() {
                        tracing::error!(task = name, "periodic task tick panicked");
                    }
                }
            })
            .expect("failed to spawn periodic task thread");

        Self {
            signal,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Stops the task and joins its thread. Idempotent.
    pub fn stop(&self) {
        {
            let mut stopped = self.signal.stopped.lock();
            *stopped = true;
        }
        self.signal.wakeup.notify_all();
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("stopped", &*self.signal.stopped.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn ticks_repeat_until_stopped() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let task = PeriodicTask::spawn("test-tick", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        std::thread::sleep(Duration::from_millis(120));
        task.stop();
        let seen = ticks.load(Ordering::Relaxed);
        assert!(seen >= 3, "expected several ticks, saw {seen}");

        // No ticks after stop.
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(ticks.load(Ordering::Relaxed), seen);
    }

    #[test]
    fn stop_before_first_tick_runs_nothing() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let task = PeriodicTask::spawn("test-early-stop", Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        // stop() must not wait for the 60s period to elapse.
        let start = Instant::now();
        task.stop();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(ticks.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let task = PeriodicTask::spawn("test-idempotent", Duration::from_millis(10), || {});
        task.stop();
        task.stop();
        task.stop();
    }

    #[test]
    fn panicking_tick_does_not_kill_the_schedule() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let task = PeriodicTask::spawn("test-panic", Duration::from_millis(10), move || {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            if n == 0 {
                panic!("first tick fails");
            }
        });

        std::thread::sleep(Duration::from_millis(100));
        task.stop();
        assert!(ticks.load(Ordering::Relaxed) >= 2);
    }
}
