use crate::report::{Issue, LoadSnapshot, Report};

const CPU_1MIN_PERCENT_MAX: f64 = 80.0;
const CPU_5MIN_PERCENT_MAX: f64 = 60.0;
const CPU_15MIN_PERCENT_MAX: f64 = 60.0;
const RAM_FREE_PERCENT_MIN: f64 = 20.0;
const ROOT_FREE_PERCENT_MIN: f64 = 10.0;
const TMP_FREE_PERCENT_MIN: f64 = 20.0;
const HOME_FREE_PERCENT_MIN: f64 = 20.0;
const UPTIME_DAYS_MAX: u64 = 365;

/// Applies the fixed thresholds to a collected report. Checks run in a fixed
/// order (CPU, RAM, root disk, tmp disk, home disk, uptime, database) and the
/// returned issues keep insertion order. A check whose input carries the
/// unknown sentinel (zero total, absent load averages) is skipped silently.
///
/// All load comparisons use the normalized percentage form,
/// load / cores * 100 against a percent threshold.
pub fn evaluate(report: &Report) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(load) = &report.load {
        let one = LoadSnapshot::percent(load.one, report.cpu_cores);
        let five = LoadSnapshot::percent(load.five, report.cpu_cores);
        let fifteen = LoadSnapshot::percent(load.fifteen, report.cpu_cores);
        if one > CPU_1MIN_PERCENT_MAX
            || five > CPU_5MIN_PERCENT_MAX
            || fifteen > CPU_15MIN_PERCENT_MAX
        {
            issues.push(Issue::HighCpu);
        }
    }

    if let Some(free) = report.memory.available_percent() {
        if free < RAM_FREE_PERCENT_MIN {
            issues.push(Issue::LowFreeRam);
        }
    }

    if let Some(free) = report.root_disk.free_percent() {
        if free < ROOT_FREE_PERCENT_MIN {
            issues.push(Issue::LowRootDisk);
        }
    }

    if let Some(free) = report.tmp_disk.free_percent() {
        if free < TMP_FREE_PERCENT_MIN {
            issues.push(Issue::LowTmpDisk);
        }
    }

    if let Some(free) = report.home_disk.free_percent() {
        if free < HOME_FREE_PERCENT_MIN {
            issues.push(Issue::LowHomeDisk);
        }
    }

    if report.uptime.days() > UPTIME_DAYS_MAX {
        issues.push(Issue::LongUptime);
    }

    if !report.database.connected {
        issues.push(Issue::DatabaseDown);
    }

    issues
}
