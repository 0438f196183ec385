//! Build phase timing.

use std::time::{Duration, Instant};

/// Measures a single build phase and reports it on finish.
pub struct Timer {
    phase: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(phase: &'static str) -> Self {
        Self {
            phase,
            start: Instant::now(),
        }
    }

    /// Print the elapsed time and hand it back.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        println!("  [{}] {}", format_duration(elapsed), self.phase);
        elapsed
    }
}

/// Run `f` as a named phase, reporting its duration only when it succeeds.
pub fn timed<T, E>(phase: &'static str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let timer = Timer::start(phase);
    let value = f()?;
    timer.finish();
    Ok(value)
}

fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}
