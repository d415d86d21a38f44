//! System capacity detection.
//!
//! Capacity is detected once at startup and passed around as a plain
//! value, so admission checks stay pure and testable with synthetic
//! figures.

use tracing::info;

/// Detected hardware capacity of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemCapacity {
    pub cpu_count: u32,
    pub memory_mb: u64,
    pub gpu_count: u32,
}

impl SystemCapacity {
    /// Probe the host once. CPU and memory come from the kernel, the GPU
    /// count from `nvidia-smi` (0 when the tool is absent or fails).
    pub fn detect() -> Self {
        use sysinfo::System;

        let sys = System::new_all();
        let capacity = Self {
            cpu_count: sys.cpus().len() as u32,
            memory_mb: sys.total_memory() / 1_000_000,
            gpu_count: detect_gpu_count(),
        };
        info!(
            "Detected system capacity: {} cpus, {} MB memory, {} gpus",
            capacity.cpu_count, capacity.memory_mb, capacity.gpu_count
        );
        capacity
    }
}

/// Count GPUs via `nvidia-smi -L`, which prints one line per device.
fn detect_gpu_count() -> u32 {
    match std::process::Command::new("nvidia-smi").arg("-L").output() {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| line.starts_with("GPU "))
            .count() as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_reports_nonzero_cpu_and_memory() {
        let capacity = SystemCapacity::detect();
        assert!(capacity.cpu_count > 0);
        assert!(capacity.memory_mb > 0);
    }
}
