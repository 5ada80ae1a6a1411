use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Daily countdown. Only the owner ticks it; everyone else reads through a
/// [`ClockHandle`].
#[derive(Debug)]
pub struct CountdownClock {
    remaining: Arc<AtomicU64>,
}

impl CountdownClock {
    pub fn new(seconds: u64) -> Self {
        Self {
            remaining: Arc::new(AtomicU64::new(seconds)),
        }
    }

    /// Take one second off, stopping at zero. Returns what is left.
    pub fn tick(&self) -> u64 {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                Some(s.saturating_sub(1))
            })
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            remaining: Arc::clone(&self.remaining),
        }
    }

    /// Tick on a background thread every `interval` until zero or until the
    /// returned ticker is dropped.
    pub fn start(self, interval: Duration) -> CountdownTicker {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if self.tick() == 0 {
                            debug!("countdown reached zero");
                            return;
                        }
                    }
                    _ => return,
                }
            }
        });

        CountdownTicker {
            stop: Some(stop_tx),
            thread: Some(thread),
        }
    }
}

/// Read-only view of a running countdown.
#[derive(Clone, Debug)]
pub struct ClockHandle {
    remaining: Arc<AtomicU64>,
}

impl ClockHandle {
    pub fn seconds_remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn formatted(&self) -> String {
        format_hms(self.seconds_remaining())
    }
}

/// Owns the ticking thread; dropping it stops the countdown.
pub struct CountdownTicker {
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        // Closing the channel wakes the thread out of recv_timeout.
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_floors_at_zero() {
        let clock = CountdownClock::new(2);
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.seconds_remaining(), 0);
    }

    #[test]
    fn handle_sees_ticks() {
        let clock = CountdownClock::new(10);
        let handle = clock.handle();
        clock.tick();
        clock.tick();
        assert_eq!(handle.seconds_remaining(), 8);
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(23 * 60 + 45), "00:23:45");
        assert_eq!(format_hms(23 * 3600 + 45 * 60 + 1), "23:45:01");
    }

    #[test]
    fn background_ticker_runs_down_and_holds() {
        let clock = CountdownClock::new(3);
        let handle = clock.handle();
        let ticker = clock.start(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(200));
        assert_eq!(handle.seconds_remaining(), 0);
        drop(ticker);
        assert_eq!(handle.formatted(), "00:00:00");
    }

    #[test]
    fn dropping_ticker_stops_countdown() {
        let clock = CountdownClock::new(1_000);
        let handle = clock.handle();
        let ticker = clock.start(Duration::from_secs(60));
        drop(ticker);
        assert_eq!(handle.seconds_remaining(), 1_000);
    }
}
