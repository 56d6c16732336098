//! Host-wide readings from /proc and /sys.
//!
//! Every reader takes the filesystem root it should look under so the
//! report can be exercised against a fake tree.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Block device names shown in the host summary.
static BLOCK_DEVICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(sd|hd|vd|xvd|nvme|mmcblk)[a-z0-9]*$").expect("valid regex"));

/// System load averages for 1, 5, and 15 minute intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one_min: f64,
    pub five_min: f64,
    pub fifteen_min: f64,
}

/// Memory and swap totals from /proc/meminfo, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
    pub buffers_bytes: u64,
    pub cached_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_free_bytes: u64,
}

impl MemoryInfo {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    pub fn swap_used_bytes(&self) -> u64 {
        self.swap_total_bytes.saturating_sub(self.swap_free_bytes)
    }
}

/// Aggregate CPU time since boot, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Share of `ticks` in the total, as a percentage.
    pub fn percent(&self, ticks: u64) -> f64 {
        match self.total() {
            0 => 0.0,
            total => ticks as f64 * 100.0 / total as f64,
        }
    }
}

/// Reads load average from `<proc>/loadavg`.
///
/// Format: "0.00 0.01 0.05 1/234 5678"
pub fn read_load_average(proc_root: &Path) -> Result<LoadAverage, String> {
    let path = proc_root.join("loadavg");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(format!(
            "Invalid loadavg format: expected at least 3 fields, got {}",
            parts.len()
        ));
    }

    let parse = |idx: usize, label: &str| {
        parts[idx]
            .parse::<f64>()
            .map_err(|e| format!("Failed to parse {} load average: {}", label, e))
    };

    Ok(LoadAverage {
        one_min: parse(0, "1min")?,
        five_min: parse(1, "5min")?,
        fifteen_min: parse(2, "15min")?,
    })
}

/// Parses `/proc/meminfo` content. `MemTotal` is required; other fields
/// default to zero when the kernel does not report them.
pub fn parse_meminfo(content: &str) -> Result<MemoryInfo, String> {
    let mut info = MemoryInfo::default();
    let mut has_total = false;
    let mut has_available = false;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kb) = value.parse::<u64>() else {
            continue;
        };
        let bytes = kb * 1024;
        match key {
            "MemTotal:" => {
                info.total_bytes = bytes;
                has_total = true;
            }
            "MemFree:" => info.free_bytes = bytes,
            "MemAvailable:" => {
                info.available_bytes = bytes;
                has_available = true;
            }
            "Buffers:" => info.buffers_bytes = bytes,
            "Cached:" => info.cached_bytes = bytes,
            "SwapTotal:" => info.swap_total_bytes = bytes,
            "SwapFree:" => info.swap_free_bytes = bytes,
            _ => {}
        }
    }

    if !has_total {
        return Err("Failed to parse MemTotal from meminfo".to_string());
    }
    // Kernels before 3.14 have no MemAvailable.
    if !has_available {
        info.available_bytes = info.free_bytes + info.buffers_bytes + info.cached_bytes;
    }
    Ok(info)
}

pub fn read_memory_info(proc_root: &Path) -> Result<MemoryInfo, String> {
    let path = proc_root.join("meminfo");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_meminfo(&content)
}

/// Reads the aggregate `cpu` line of `<proc>/stat`.
pub fn read_cpu_times(proc_root: &Path) -> Result<CpuTimes, String> {
    let path = proc_root.join("stat");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| "No aggregate cpu line in stat".to_string())?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse().unwrap_or(0))
        .collect();
    if values.len() < 4 {
        return Err(format!("Invalid cpu line in stat: {}", line));
    }
    let at = |i: usize| values.get(i).copied().unwrap_or(0);

    Ok(CpuTimes {
        user: at(0),
        nice: at(1),
        system: at(2),
        idle: at(3),
        iowait: at(4),
        irq: at(5),
        softirq: at(6),
        steal: at(7),
    })
}

/// CPU model name and number of logical processors from `<proc>/cpuinfo`.
pub fn read_cpu_model(proc_root: &Path) -> Result<(String, usize), String> {
    let path = proc_root.join("cpuinfo");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let mut model = None;
    let mut count = 0;
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "processor" => count += 1,
            "model name" | "Model" if model.is_none() => model = Some(value.trim().to_string()),
            _ => {}
        }
    }
    Ok((model.unwrap_or_else(|| "unknown".to_string()), count))
}

/// Kernel name and release, e.g. `Linux 6.1.0`.
pub fn read_kernel(proc_root: &Path) -> Result<String, String> {
    let read = |name: &str| {
        let path = proc_root.join("sys/kernel").join(name);
        fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
    };
    Ok(format!("{} {}", read("ostype")?, read("osrelease")?))
}

pub fn read_hostname(proc_root: &Path) -> Option<String> {
    fs::read_to_string(proc_root.join("sys/kernel/hostname"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Disk-like block devices under `<sys>/block` with their size in bytes,
/// sorted by name.
pub fn read_block_devices(sys_root: &Path) -> Vec<(String, u64)> {
    let mut devices = Vec::new();
    let Ok(entries) = fs::read_dir(sys_root.join("block")) else {
        return devices;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !BLOCK_DEVICE_RE.is_match(&name) {
            continue;
        }
        // `size` is always in 512-byte sectors.
        let sectors = fs::read_to_string(entry.path().join("size"))
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);
        devices.push((name, sectors * 512));
    }
    devices.sort();
    devices
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_read_load_average() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "loadavg", "0.50 1.25 2.00 1/234 5678\n");
        let load = read_load_average(dir.path()).unwrap();
        assert_eq!(load.one_min, 0.5);
        assert_eq!(load.fifteen_min, 2.0);

        write(dir.path(), "loadavg", "0.50\n");
        assert!(read_load_average(dir.path()).is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let info = parse_meminfo(
            "MemTotal:       16000 kB\nMemFree:  2000 kB\nMemAvailable: 8000 kB\n\
             Buffers: 100 kB\nCached: 3000 kB\nSwapTotal: 4000 kB\nSwapFree: 1000 kB\n",
        )
        .unwrap();
        assert_eq!(info.total_bytes, 16000 * 1024);
        assert_eq!(info.used_bytes(), 8000 * 1024);
        assert_eq!(info.swap_used_bytes(), 3000 * 1024);
    }

    #[test]
    fn test_parse_meminfo_without_available() {
        let info = parse_meminfo("MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 250 kB\n")
            .unwrap();
        assert_eq!(info.available_bytes, 400 * 1024);
        assert!(parse_meminfo("MemFree: 1 kB\n").is_err());
    }

    #[test]
    fn test_read_cpu_times_and_percent() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "stat",
            "cpu  600 0 200 1000 200 0 0 0 0 0\ncpu0 300 0 100 500 100 0 0 0\n",
        );
        let cpu = read_cpu_times(dir.path()).unwrap();
        assert_eq!(cpu.total(), 2000);
        assert_eq!(cpu.percent(cpu.user), 30.0);
        assert_eq!(CpuTimes::default().percent(0), 0.0);
    }

    #[test]
    fn test_read_cpu_model() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "cpuinfo",
            "processor\t: 0\nmodel name\t: Example CPU @ 2.0GHz\n\nprocessor\t: 1\nmodel name\t: Example CPU @ 2.0GHz\n",
        );
        let (model, count) = read_cpu_model(dir.path()).unwrap();
        assert_eq!(model, "Example CPU @ 2.0GHz");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_read_kernel_and_hostname() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sys/kernel/ostype", "Linux\n");
        write(dir.path(), "sys/kernel/osrelease", "6.1.0-18-amd64\n");
        write(dir.path(), "sys/kernel/hostname", "db01\n");
        assert_eq!(read_kernel(dir.path()).unwrap(), "Linux 6.1.0-18-amd64");
        assert_eq!(read_hostname(dir.path()).as_deref(), Some("db01"));
    }

    #[test]
    fn test_read_block_devices() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "block/sda/size", "2097152\n");
        write(dir.path(), "block/nvme0n1/size", "4194304\n");
        write(dir.path(), "block/loop0/size", "100\n");
        let devices = read_block_devices(dir.path());
        assert_eq!(
            devices,
            vec![
                ("nvme0n1".to_string(), 2 * 1024 * 1024 * 1024),
                ("sda".to_string(), 1024 * 1024 * 1024),
            ]
        );
    }
}
