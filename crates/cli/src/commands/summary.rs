//! Stream run summary.

use std::time::Duration;

use observability::{RelayStatus, TimerSnapshot};

/// Result of one streaming command
#[derive(Debug, Clone)]
pub struct StreamSummary {
    pub operation: String,
    pub status: RelayStatus,
    /// Movies accepted by the sink
    pub written: u64,
    /// Wall time seen by the command, including task scheduling
    pub elapsed: Duration,
    pub timer_name: String,
    pub timer: TimerSnapshot,
}

impl StreamSummary {
    /// Movies per second over the command's wall time
    pub fn throughput(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.written as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Stream Summary ===\n");
        println!("Operation: {}", self.operation);
        println!("  Status: {}", self.status.as_str());
        println!("  Movies written: {}", self.written);
        println!("  Elapsed: {:.3}s", self.elapsed.as_secs_f64());
        println!("  Throughput: {:.2} movies/s", self.throughput());

        println!("\nTimer {}:", self.timer_name);
        println!("  {}", self.timer);
        if self.timer.active > 0 {
            println!("  Still running: {}", self.timer.active);
        }
        println!();
    }
}
