use crate::report::{
    DatabaseStatus, DiskSnapshot, LoadSnapshot, MemorySnapshot, Report, UptimeSnapshot,
};
use std::path::Path;
use std::process::Command;
use std::time::SystemTime;
use sysinfo::{DiskExt, System, SystemExt};
use tracing::debug;

/// One mounted filesystem, as reported by the OS disk list.
#[derive(Debug, Clone)]
pub struct MountedDisk {
    pub mount: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

/// Reads every local metric once and assembles a report. The database field
/// is left disconnected; the probe fills it in separately.
///
/// Every read fails softly: an unreadable source yields the zero-total
/// sentinel (or `None` for load averages) and collection continues.
pub fn collect_host() -> Report {
    let mut system = System::new_all();
    system.refresh_memory();
    system.refresh_cpu();
    system.refresh_disks_list();
    system.refresh_disks();

    let home_path = resolve_home_path();
    let mounts = mounted_disks(&system);
    debug!(mounts = mounts.len(), home = %home_path, "collected disk list");

    Report {
        host_name: system.host_name(),
        os_version: system.long_os_version(),
        kernel_version: system.kernel_version(),
        app_version: env!("CARGO_PKG_VERSION"),
        checked_at: humantime::format_rfc3339_seconds(SystemTime::now()).to_string(),
        memory: collect_memory(&system),
        root_disk: disk_for_path("/", &mounts),
        tmp_disk: disk_for_path("/tmp", &mounts),
        home_disk: disk_for_path(&home_path, &mounts),
        load: collect_load(&system),
        cpu_cores: collect_cpu_cores(&system),
        uptime: collect_uptime(&system),
        database: DatabaseStatus::default(),
    }
}

/// Total and available physical memory in kilobytes. Zero values signal an
/// unreadable source; callers must not derive percentages from them.
pub fn collect_memory(system: &System) -> MemorySnapshot {
    MemorySnapshot {
        total_kb: system.total_memory() / 1024,
        available_kb: system.available_memory() / 1024,
    }
}

/// The three standard load averages, or `None` where the platform has no
/// load-average facility. `None` means "unsupported", not "no load".
#[cfg(unix)]
pub fn collect_load(system: &System) -> Option<LoadSnapshot> {
    let load = system.load_average();
    Some(LoadSnapshot {
        one: load.one,
        five: load.five,
        fifteen: load.fifteen,
    })
}

#[cfg(not(unix))]
pub fn collect_load(_system: &System) -> Option<LoadSnapshot> {
    None
}

/// Logical processor count, never below 1 so load normalization cannot
/// divide by zero.
pub fn collect_cpu_cores(system: &System) -> u32 {
    let cores = system.cpus().len() as u32;
    cores.max(1)
}

pub fn collect_uptime(system: &System) -> UptimeSnapshot {
    UptimeSnapshot {
        total_seconds: system.uptime(),
    }
}

pub fn mounted_disks(system: &System) -> Vec<MountedDisk> {
    system
        .disks()
        .iter()
        .map(|d| MountedDisk {
            mount: d.mount_point().to_string_lossy().to_string(),
            total_bytes: d.total_space(),
            free_bytes: d.available_space(),
        })
        .collect()
}

/// Space on the filesystem holding `path`: the mounted disk whose mount
/// point is the longest prefix of the path. No match yields the zero-total
/// sentinel, which the evaluator treats as "unknown".
pub fn disk_for_path(path: &str, mounts: &[MountedDisk]) -> DiskSnapshot {
    let target = Path::new(path);
    let best = mounts
        .iter()
        .filter(|m| target.starts_with(&m.mount))
        .max_by_key(|m| m.mount.len());

    match best {
        Some(m) => DiskSnapshot {
            path: path.to_string(),
            total_bytes: m.total_bytes,
            free_bytes: m.free_bytes,
        },
        None => DiskSnapshot::unknown(path),
    }
}

/// Home directory of the invoking user: `$USER`, then a `whoami` fallback,
/// then the bare `/home` default. Failure to resolve a username is a
/// degraded-but-valid outcome, not an error.
pub fn resolve_home_path() -> String {
    match resolve_username() {
        Some(user) => format!("/home/{user}"),
        None => "/home".to_string(),
    }
}

fn resolve_username() -> Option<String> {
    if let Ok(user) = std::env::var("USER") {
        let user = user.trim().to_string();
        if !user.is_empty() {
            return Some(user);
        }
    }

    let output = Command::new("whoami").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let user = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if user.is_empty() {
        None
    } else {
        Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounts() -> Vec<MountedDisk> {
        vec![
            MountedDisk {
                mount: "/".to_string(),
                total_bytes: 100_000,
                free_bytes: 40_000,
            },
            MountedDisk {
                mount: "/home".to_string(),
                total_bytes: 500_000,
                free_bytes: 250_000,
            },
            MountedDisk {
                mount: "/tmp".to_string(),
                total_bytes: 10_000,
                free_bytes: 9_000,
            },
        ]
    }

    #[test]
    fn path_resolves_to_longest_mount_prefix() {
        let mounts = mounts();
        assert_eq!(disk_for_path("/", &mounts).total_bytes, 100_000);
        assert_eq!(disk_for_path("/tmp", &mounts).total_bytes, 10_000);
        assert_eq!(disk_for_path("/home/deploy", &mounts).total_bytes, 500_000);
        // No dedicated mount: falls through to the root filesystem.
        assert_eq!(disk_for_path("/var/log", &mounts).total_bytes, 100_000);
    }

    #[test]
    fn prefix_match_respects_path_components() {
        let mounts = vec![MountedDisk {
            mount: "/home".to_string(),
            total_bytes: 500_000,
            free_bytes: 250_000,
        }];
        // "/homework" shares a string prefix with "/home" but lives elsewhere.
        assert_eq!(disk_for_path("/homework", &mounts).total_bytes, 0);
    }

    #[test]
    fn unknown_path_yields_zero_total_sentinel() {
        let snapshot = disk_for_path("/nonexistent", &[]);
        assert_eq!(snapshot.total_bytes, 0);
        assert_eq!(snapshot.free_bytes, 0);
        assert_eq!(snapshot.path, "/nonexistent");
    }

    #[test]
    fn home_path_is_absolute() {
        let home = resolve_home_path();
        assert!(home.starts_with("/home"));
    }
}
