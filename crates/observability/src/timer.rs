//! Operation timers
//!
//! A `TimerRegistry` maps stable timer names to `OperationTimer`s and lives for
//! the whole process. Each invocation takes a `TimerHandle` from a timer; the
//! handle records its elapsed time exactly once, either on `stop` or on drop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::time::{Duration, Instant};

use metrics::{describe_histogram, histogram, Unit};
use tracing::{debug, warn};

static GLOBAL_REGISTRY: LazyLock<TimerRegistry> = LazyLock::new(TimerRegistry::new);

/// Name -> timer mapping
///
/// Lookups and registrations may happen concurrently from any task.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: RwLock<HashMap<String, Arc<OperationTimer>>>,
}

impl TimerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry
    pub fn global() -> &'static TimerRegistry {
        &GLOBAL_REGISTRY
    }

    /// Get the timer registered under `name`, registering it first if needed
    ///
    /// The description of an existing timer is kept.
    pub fn timer(&self, name: &str, description: &str) -> Arc<OperationTimer> {
        if let Some(timer) = self.get(name) {
            return timer;
        }

        let mut timers = self.timers.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(timers.entry(name.to_string()).or_insert_with(|| {
            describe_histogram!(name.to_string(), Unit::Seconds, description.to_string());
            debug!(timer = %name, "Registered operation timer");
            Arc::new(OperationTimer::new(name, description))
        }))
    }

    /// Look up a registered timer
    pub fn get(&self, name: &str) -> Option<Arc<OperationTimer>> {
        self.timers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all registered timers, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .timers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// Named duration timer with aggregate statistics
#[derive(Debug)]
pub struct OperationTimer {
    name: String,
    description: String,
    count: AtomicU64,
    active: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
    last_nanos: AtomicU64,
}

impl OperationTimer {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            count: AtomicU64::new(0),
            active: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
            last_nanos: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Start timing one invocation
    pub fn start(self: &Arc<Self>) -> TimerHandle {
        self.active.fetch_add(1, Ordering::Relaxed);
        TimerHandle {
            timer: Arc::clone(self),
            started: Instant::now(),
            stopped: false,
        }
    }

    fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);

        self.active.fetch_sub(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
        self.last_nanos.store(nanos, Ordering::Relaxed);

        histogram!(self.name.clone()).record(elapsed.as_secs_f64());
    }

    /// Get snapshot of the aggregate statistics
    pub fn snapshot(&self) -> TimerSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let min = if count == 0 {
            0
        } else {
            self.min_nanos.load(Ordering::Relaxed)
        };

        TimerSnapshot {
            count,
            active: self.active.load(Ordering::Relaxed),
            total: Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed)),
            min: Duration::from_nanos(min),
            max: Duration::from_nanos(self.max_nanos.load(Ordering::Relaxed)),
            last: Duration::from_nanos(self.last_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// Snapshot of timer statistics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Completed timings
    pub count: u64,
    /// Handles started but not yet stopped
    pub active: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
    pub last: Duration,
}

impl TimerSnapshot {
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos((self.total.as_nanos() / u128::from(self.count)) as u64)
        }
    }
}

impl std::fmt::Display for TimerSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:?}, max={:?}, mean={:?}, last={:?} (n={})",
                self.min,
                self.max,
                self.mean(),
                self.last,
                self.count
            )
        }
    }
}

/// Single-use stopwatch for one invocation
///
/// Records into its timer at most once. A handle dropped without `stop` is
/// stopped at that point.
#[derive(Debug)]
pub struct TimerHandle {
    timer: Arc<OperationTimer>,
    started: Instant,
    stopped: bool,
}

impl TimerHandle {
    /// Stop the stopwatch and record the elapsed time
    ///
    /// Returns `None` if the handle was already stopped; nothing is recorded then.
    pub fn stop(&mut self) -> Option<Duration> {
        if self.stopped {
            warn!(timer = %self.timer.name, "Timer handle already stopped");
            return None;
        }
        self.stopped = true;

        let elapsed = self.started.elapsed();
        self.timer.record(elapsed);
        Some(elapsed)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Time since start
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn timer_name(&self) -> &str {
        &self.timer.name
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if !self.stopped {
            debug!(timer = %self.timer.name, "Timer handle dropped while running");
            self.stop();
        }
    }
}
