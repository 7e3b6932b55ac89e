// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Fixed-step time provider for deterministic tests: each call advances the
/// clock by `step_millis`.
pub struct TickingTimeProvider {
    current: std::sync::atomic::AtomicI64,
    step_millis: i64,
}

impl TickingTimeProvider {
    pub fn new(start_millis: i64, step_millis: i64) -> Self {
        Self {
            current: std::sync::atomic::AtomicI64::new(start_millis),
            step_millis,
        }
    }
}

impl TimeProvider for TickingTimeProvider {
    fn now_millis(&self) -> i64 {
        self.current
            .fetch_add(self.step_millis, std::sync::atomic::Ordering::SeqCst)
    }
}
