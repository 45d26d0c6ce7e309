use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use atomic_float::AtomicF64;
use level_schema::Millis;

/// The run's only time source. Readings are monotonic milliseconds from an
/// arbitrary origin.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Clones share the same reading, so a
/// test can keep one handle and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicF64>,
}

impl ManualClock {
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now_ms: Arc::new(AtomicF64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: Millis) {
        self.now_ms.store(now_ms, Ordering::Release);
    }

    pub fn advance(&self, delta_ms: Millis) {
        self.now_ms.fetch_add(delta_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now_ms.load(Ordering::Acquire)
    }
}
