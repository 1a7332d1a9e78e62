//! Resource monitor for memory backpressure
//!
//! The batch scheduler samples memory before each batch and pauses when
//! usage crosses the configured threshold. Sampling goes through the
//! [`MemoryProbe`] trait so tests can script readings.

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// A source of memory usage readings
pub trait MemoryProbe: Send {
    /// Returns the current memory usage as a percentage in `[0, 100]`
    ///
    /// Returns None if no reading is available.
    fn used_memory_pct(&mut self) -> Option<f64>;
}

/// Host memory probe backed by sysinfo
pub struct SystemMemoryProbe {
    sys: System,
}

impl SystemMemoryProbe {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        Self { sys }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn used_memory_pct(&mut self) -> Option<f64> {
        self.sys.refresh_memory();

        let total_mem = self.sys.total_memory();
        if total_mem == 0 {
            return None;
        }

        Some(self.sys.used_memory() as f64 / total_mem as f64 * 100.0)
    }
}

/// Result of one memory check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pressure {
    /// Usage is at or below the threshold
    Normal(f64),
    /// Usage exceeds the threshold
    High(f64),
    /// The probe returned no reading
    Unknown,
}

impl Pressure {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High(_))
    }
}

/// Compares probe readings against a memory threshold
pub struct ResourceMonitor {
    probe: Box<dyn MemoryProbe>,
    threshold_pct: f64,
    samples: u64,
}

impl ResourceMonitor {
    /// Creates a monitor from a probe and a threshold percentage
    pub fn new(probe: Box<dyn MemoryProbe>, threshold_pct: f64) -> Self {
        Self {
            probe,
            threshold_pct,
            samples: 0,
        }
    }

    /// Creates a monitor that samples host memory
    pub fn system(threshold_pct: f64) -> Self {
        Self::new(Box::new(SystemMemoryProbe::new()), threshold_pct)
    }

    /// Takes one reading and classifies it
    ///
    /// A missing reading never counts as pressure.
    pub fn check(&mut self) -> Pressure {
        self.samples += 1;

        match self.probe.used_memory_pct() {
            Some(pct) if pct > self.threshold_pct => Pressure::High(pct),
            Some(pct) => Pressure::Normal(pct),
            None => {
                tracing::debug!("Memory reading unavailable");
                Pressure::Unknown
            }
        }
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    /// Number of readings taken so far
    pub fn samples(&self) -> u64 {
        self.samples
    }
}
