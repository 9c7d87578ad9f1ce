//! Best-effort host stats for the dashboard's server panel.
//!
//! Only values observable from user space without privileges are collected.
//! Anything unavailable on this platform is left as `None` rather than
//! guessed.

use serde::{Deserialize, Serialize};

/// Point-in-time view of the machine the sink runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub os: String,
    pub arch: String,
    pub cpu_count: usize,
    pub loadavg_1m: Option<f64>,
    pub memory_total_bytes: Option<u64>,
    pub memory_available_bytes: Option<u64>,
}

impl HostSnapshot {
    /// Sample the current host state.
    pub fn collect() -> Self {
        let (total, available) = collect_meminfo();
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_count: std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(1),
            loadavg_1m: collect_loadavg_1m(),
            memory_total_bytes: total,
            memory_available_bytes: available,
        }
    }

    /// Used memory as a percentage of total, when both are known.
    pub fn memory_used_pct(&self) -> Option<f64> {
        let total = self.memory_total_bytes.filter(|&t| t > 0)? as f64;
        let available = self.memory_available_bytes? as f64;
        Some(((total - available) / total * 100.0).clamp(0.0, 100.0))
    }
}

fn collect_loadavg_1m() -> Option<f64> {
    #[cfg(unix)]
    {
        let mut values = [0.0_f64; 1];
        // SAFETY: `getloadavg` writes at most `n` doubles into a valid buffer.
        let n = unsafe { libc::getloadavg(values.as_mut_ptr(), 1) };
        (n > 0).then_some(values[0])
    }
    #[cfg(not(unix))]
    {
        None
    }
}

fn collect_meminfo() -> (Option<u64>, Option<u64>) {
    #[cfg(target_os = "linux")]
    {
        match std::fs::read_to_string("/proc/meminfo") {
            Ok(raw) => parse_meminfo(&raw),
            Err(e) => {
                log::debug!("/proc/meminfo unavailable: {e}");
                (None, None)
            }
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        (None, None)
    }
}

/// Extract `MemTotal` and `MemAvailable` (kB in procfs) as bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo(raw: &str) -> (Option<u64>, Option<u64>) {
    let mut total = None;
    let mut available = None;
    for line in raw.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(kb) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        match key {
            "MemTotal" => total = Some(kb * 1024),
            "MemAvailable" => available = Some(kb * 1024),
            _ => {}
        }
    }
    (total, available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_has_identity() {
        let h = HostSnapshot::collect();
        assert!(!h.os.is_empty());
        assert!(!h.arch.is_empty());
        assert!(h.cpu_count >= 1);
    }

    #[test]
    fn meminfo_parsing() {
        let raw = "MemTotal:       16000000 kB\nMemFree:         2000000 kB\nMemAvailable:    4000000 kB\n";
        let (total, available) = parse_meminfo(raw);
        assert_eq!(total, Some(16_000_000 * 1024));
        assert_eq!(available, Some(4_000_000 * 1024));
    }

    #[test]
    fn meminfo_tolerates_garbage() {
        assert_eq!(parse_meminfo("nonsense\nMemTotal: lots kB\n"), (None, None));
    }

    #[test]
    fn memory_used_pct_math() {
        let h = HostSnapshot {
            os: "test".into(),
            arch: "test".into(),
            cpu_count: 1,
            loadavg_1m: None,
            memory_total_bytes: Some(1000),
            memory_available_bytes: Some(250),
        };
        assert!((h.memory_used_pct().unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn memory_used_pct_unknown() {
        let h = HostSnapshot {
            os: "test".into(),
            arch: "test".into(),
            cpu_count: 1,
            loadavg_1m: None,
            memory_total_bytes: Some(0),
            memory_available_bytes: Some(0),
        };
        assert_eq!(h.memory_used_pct(), None);
    }
}
