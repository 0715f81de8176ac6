use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time source of the race lifecycle, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock, milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Simulated clock that only moves when advanced. Clones share the same time, so a driver can
/// keep a handle while the race manager owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_us: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> ManualClock {
        ManualClock::default()
    }

    pub fn starting_at(now_ms: u64) -> ManualClock {
        let clock = ManualClock::new();
        clock.now_us.store(now_ms * 1_000, Ordering::SeqCst);
        clock
    }

    pub fn advance(&self, dt: Duration) {
        self.now_us
            .fetch_add(dt.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, dt: f64) {
        self.advance(Duration::from_secs_f64(dt));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst) / 1_000
    }
}
