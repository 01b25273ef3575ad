//! CPU-time measurement for the driver.

use cpu_time::ProcessTime;

pub struct ResourceMeasure {
    start: ProcessTime,
}

impl ResourceMeasure {
    pub fn new() -> Self {
        Self {
            start: ProcessTime::now(),
        }
    }

    /// Seconds of CPU time used by this process since creation.
    pub fn cpu_time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
