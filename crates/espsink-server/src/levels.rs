//! Traffic-light thresholds for the dashboard bars.

/// Color band of a dashboard indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthLevel {
    Good,
    Warning,
    Critical,
    /// Value could not be measured on this host.
    Unknown,
}

impl HealthLevel {
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#4CAF50",
            Self::Warning => "#FFC107",
            Self::Critical => "#F44336",
            Self::Unknown => "#9E9E9E",
        }
    }
}

/// Host memory in use, percent.
pub fn memory_level(used_pct: Option<f64>) -> HealthLevel {
    match used_pct {
        None => HealthLevel::Unknown,
        Some(p) if p < 60.0 => HealthLevel::Good,
        Some(p) if p < 80.0 => HealthLevel::Warning,
        Some(_) => HealthLevel::Critical,
    }
}

/// One-minute load average. Negative means "not available" and reads as idle.
pub fn load_level(load: f64) -> HealthLevel {
    if load < 0.25 {
        HealthLevel::Good
    } else if load < 0.75 {
        HealthLevel::Warning
    } else {
        HealthLevel::Critical
    }
}

/// Average I2C latency in microseconds.
pub fn latency_level(avg_us: f64) -> HealthLevel {
    if avg_us < 10_000.0 {
        HealthLevel::Good
    } else if avg_us < 20_000.0 {
        HealthLevel::Warning
    } else {
        HealthLevel::Critical
    }
}

/// Wi-Fi link uptime, percent.
pub fn uptime_level(pct: f64) -> HealthLevel {
    if pct > 95.0 {
        HealthLevel::Good
    } else if pct > 85.0 {
        HealthLevel::Warning
    } else {
        HealthLevel::Critical
    }
}

/// Bar width in percent, clamped to what a progress bar can show.
pub fn bar_width(pct: f64) -> u32 {
    if pct.is_nan() {
        0
    } else {
        pct.clamp(0.0, 100.0) as u32
    }
}
