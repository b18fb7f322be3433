// crates/npxl-playback/src/clock.rs
//
// C3 — Seek-Position Clock. A start/stop elapsed-time counter with a
// settable offset, used as the playhead. Resolution is whatever the host's
// wall clock gives us (`std::time::Instant`) — there is no catch-up or drift
// compensation.

use std::time::Instant;

use npxl_core::duration::Duration;

#[derive(Debug)]
pub struct SeekClock {
    offset: Duration,
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Default for SeekClock {
    fn default() -> Self {
        Self { offset: Duration::ZERO, accumulated: Duration::ZERO, running_since: None }
    }
}

impl SeekClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose `elapsed()` equals `offset + underlying_elapsed`,
    /// starting in the stopped state. `seek(to)` is implemented by replacing
    /// the running clock with `with_offset(to)` — see `Coordinator::seek`.
    pub fn with_offset(offset: Duration) -> Self {
        Self { offset, accumulated: Duration::ZERO, running_since: None }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated = self.accumulated + wall_to_core(since.elapsed());
        }
    }

    /// Stop and zero the underlying elapsed counter, keeping the current
    /// offset. Used by `Coordinator::stop` which resets the playhead
    /// to `0`, i.e. callers pair this with setting `offset = Duration::ZERO`
    /// at the coordinator level via a fresh `with_offset`.
    pub fn reset(&mut self) {
        self.running_since = None;
        self.accumulated = Duration::ZERO;
    }

    pub fn elapsed(&self) -> Duration {
        let running_extra = self.running_since.map(|since| wall_to_core(since.elapsed())).unwrap_or(Duration::ZERO);
        self.offset + self.accumulated + running_extra
    }
}

fn wall_to_core(d: std::time::Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    #[test]
    fn stopped_clock_does_not_advance() {
        let clock = SeekClock::new();
        sleep(StdDuration::from_millis(20));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn running_clock_advances_monotonically() {
        let mut clock = SeekClock::new();
        clock.start();
        sleep(StdDuration::from_millis(15));
        let a = clock.elapsed();
        sleep(StdDuration::from_millis(15));
        let b = clock.elapsed();
        assert!(b >= a);
    }

    #[test]
    fn with_offset_starts_stopped_and_adds_offset() {
        let clock = SeekClock::with_offset(Duration::from_secs(5));
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn stop_then_start_preserves_accumulated_time() {
        let mut clock = SeekClock::new();
        clock.start();
        sleep(StdDuration::from_millis(10));
        clock.stop();
        let after_stop = clock.elapsed();
        sleep(StdDuration::from_millis(10));
        assert_eq!(clock.elapsed(), after_stop); // stopped — no further advance
        clock.start();
        sleep(StdDuration::from_millis(10));
        assert!(clock.elapsed() > after_stop);
    }

    #[test]
    fn reset_zeroes_accumulated_time() {
        let mut clock = SeekClock::with_offset(Duration::from_secs(3));
        clock.start();
        sleep(StdDuration::from_millis(10));
        clock.stop();
        clock.reset();
        assert_eq!(clock.elapsed(), Duration::from_secs(3)); // offset untouched by reset
    }
}
