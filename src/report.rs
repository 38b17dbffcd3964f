use std::fmt;

/// Physical memory reading in kilobytes. A `total_kb` of zero means the
/// source could not be read; percent derivations are undefined in that case.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MemorySnapshot {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemorySnapshot {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn used_kb(&self) -> u64 {
        self.total_kb.saturating_sub(self.available_kb)
    }

    pub fn used_percent(&self) -> Option<f64> {
        if self.total_kb == 0 {
            return None;
        }
        Some((self.used_kb() as f64 / self.total_kb as f64) * 100.0)
    }

    pub fn available_percent(&self) -> Option<f64> {
        if self.total_kb == 0 {
            return None;
        }
        Some((self.available_kb as f64 / self.total_kb as f64) * 100.0)
    }
}

/// Filesystem space for one mount path. `total_bytes == 0` is the
/// "could not stat" sentinel.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DiskSnapshot {
    pub path: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskSnapshot {
    pub fn unknown(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            total_bytes: 0,
            free_bytes: 0,
        }
    }

    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn used_percent(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some((self.used_bytes() as f64 / self.total_bytes as f64) * 100.0)
    }

    pub fn free_percent(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some((self.free_bytes as f64 / self.total_bytes as f64) * 100.0)
    }
}

/// Raw OS load averages. Absent entirely (`Option::None` at the collection
/// boundary) on platforms without a load-average facility.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LoadSnapshot {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadSnapshot {
    /// Load normalized against the core count, as a percentage.
    pub fn percent(load: f64, cores: u32) -> f64 {
        (load / cores.max(1) as f64) * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct UptimeSnapshot {
    pub total_seconds: u64,
}

impl UptimeSnapshot {
    pub fn days(&self) -> u64 {
        self.total_seconds / 86_400
    }

    pub fn hours(&self) -> u64 {
        (self.total_seconds % 86_400) / 3_600
    }

    pub fn minutes(&self) -> u64 {
        (self.total_seconds % 3_600) / 60
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DatabaseStatus {
    pub connected: bool,
    pub server_version: Option<String>,
}

/// One point-in-time view of the host, assembled per invocation and
/// discarded after rendering.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    pub host_name: Option<String>,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub app_version: &'static str,
    pub checked_at: String,
    pub memory: MemorySnapshot,
    pub root_disk: DiskSnapshot,
    pub tmp_disk: DiskSnapshot,
    pub home_disk: DiskSnapshot,
    pub load: Option<LoadSnapshot>,
    pub cpu_cores: u32,
    pub uptime: UptimeSnapshot,
    pub database: DatabaseStatus,
}

/// Closed set of findings the evaluator can produce. The rendered text is a
/// contract; tests match it literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    HighCpu,
    LowFreeRam,
    LowRootDisk,
    LowTmpDisk,
    LowHomeDisk,
    LongUptime,
    DatabaseDown,
}

impl Issue {
    pub fn text(&self) -> &'static str {
        match self {
            Issue::HighCpu => "High CPU usage",
            Issue::LowFreeRam => "Free RAM < 20%",
            Issue::LowRootDisk => "Disk «/» Free < 10%",
            Issue::LowTmpDisk => "/tmp Free < 20%",
            Issue::LowHomeDisk => "/home Free < 20%",
            Issue::LongUptime => "Uptime > 365 days",
            Issue::DatabaseDown => "MySQL not connected",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Human-readable byte count, 1024-based, two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let pow = (63 - bytes.leading_zeros() as u64) / 10;
    let pow = pow.min(UNITS.len() as u64 - 1);
    let value = bytes as f64 / (1u64 << (10 * pow)) as f64;
    format!("{} {}", round2(value), UNITS[pow as usize])
}

/// Round to two decimal places, dropping a trailing ".0"/".00" the way the
/// dashboard displays values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_percents_are_complementary() {
        let mem = MemorySnapshot {
            total_kb: 1_000_000,
            available_kb: 150_000,
        };
        let used = mem.used_percent().unwrap();
        let available = mem.available_percent().unwrap();
        assert!((used - 85.0).abs() < 0.01);
        assert!((used + available - 100.0).abs() < 0.01);
    }

    #[test]
    fn zero_total_memory_has_no_percent() {
        let mem = MemorySnapshot::unknown();
        assert!(mem.used_percent().is_none());
        assert!(mem.available_percent().is_none());
    }

    #[test]
    fn disk_derivations() {
        let disk = DiskSnapshot {
            path: "/".to_string(),
            total_bytes: 100,
            free_bytes: 9,
        };
        assert_eq!(disk.used_bytes(), 91);
        assert!((disk.free_percent().unwrap() - 9.0).abs() < f64::EPSILON);
        assert!(DiskSnapshot::unknown("/tmp").free_percent().is_none());
    }

    #[test]
    fn uptime_breakdown() {
        let uptime = UptimeSnapshot {
            total_seconds: 90_061,
        };
        assert_eq!(uptime.days(), 1);
        assert_eq!(uptime.hours(), 1);
        assert_eq!(uptime.minutes(), 1);

        let exact_year = UptimeSnapshot {
            total_seconds: 31_536_000,
        };
        assert_eq!(exact_year.days(), 365);
    }

    #[test]
    fn load_percent_guards_against_zero_cores() {
        assert!((LoadSnapshot::percent(2.0, 4) - 50.0).abs() < f64::EPSILON);
        assert!((LoadSnapshot::percent(1.0, 0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bytes_formatting() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_bytes(1_572_864), "1.5 MB");
    }

    #[test]
    fn issue_texts_are_stable() {
        assert_eq!(Issue::HighCpu.to_string(), "High CPU usage");
        assert_eq!(Issue::LowRootDisk.to_string(), "Disk «/» Free < 10%");
        assert_eq!(Issue::DatabaseDown.to_string(), "MySQL not connected");
    }
}
