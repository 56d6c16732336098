//! Mounted filesystem usage, df style.

use std::fs;
use std::path::Path;

/// A line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fstype: String,
}

/// Usage of a single mount point.
#[derive(Debug, Clone)]
pub struct FilesystemStats {
    pub mount: MountEntry,
    pub size_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

impl FilesystemStats {
    /// Used share of the space visible to unprivileged users, like `df`.
    pub fn use_percent(&self) -> f64 {
        let visible = self.used_bytes + self.available_bytes;
        if visible == 0 {
            0.0
        } else {
            self.used_bytes as f64 * 100.0 / visible as f64
        }
    }
}

/// Parses `/proc/mounts` content, dropping pseudo filesystems.
pub fn parse_mounts(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || should_skip_filesystem(parts[2], parts[1]) {
                return None;
            }
            Some(MountEntry {
                device: parts[0].to_string(),
                mount_point: parts[1].to_string(),
                fstype: parts[2].to_string(),
            })
        })
        .collect()
}

/// Reads `<proc>/mounts` and stats every real filesystem. Mount points that
/// cannot be stat'ed are skipped.
pub fn read_filesystem_stats(proc_root: &Path) -> Result<Vec<FilesystemStats>, String> {
    let path = proc_root.join("mounts");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let mut stats = Vec::new();
    for mount in parse_mounts(&content) {
        if stats
            .iter()
            .any(|s: &FilesystemStats| s.mount.mount_point == mount.mount_point)
        {
            continue;
        }
        if let Ok((size, used, available)) = statvfs_usage(&mount.mount_point) {
            stats.push(FilesystemStats {
                mount,
                size_bytes: size,
                used_bytes: used,
                available_bytes: available,
            });
        }
    }
    Ok(stats)
}

fn should_skip_filesystem(fstype: &str, mount_point: &str) -> bool {
    const SKIP_TYPES: &[&str] = &[
        "proc",
        "sysfs",
        "devpts",
        "devtmpfs",
        "tmpfs",
        "cgroup",
        "cgroup2",
        "pstore",
        "bpf",
        "debugfs",
        "tracefs",
        "fusectl",
        "configfs",
        "securityfs",
        "hugetlbfs",
        "mqueue",
        "autofs",
        "binfmt_misc",
        "overlay",
        "squashfs",
        "nsfs",
    ];

    SKIP_TYPES.contains(&fstype)
        || mount_point.starts_with("/proc")
        || mount_point.starts_with("/sys")
        || mount_point.starts_with("/dev")
        || mount_point.starts_with("/run")
}

/// `(size, used, available)` in bytes via `statvfs(3)`.
fn statvfs_usage(path: &str) -> Result<(u64, u64, u64), String> {
    use std::ffi::CString;
    use std::mem;

    let c_path = CString::new(path).map_err(|e| format!("Invalid path: {}", e))?;

    // SAFETY: `stat` is a plain C struct, zero-initialised and only read
    // after statvfs reports success.
    unsafe {
        let mut stat: libc::statvfs = mem::zeroed();
        if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
            return Err(format!("statvfs failed for {}", path));
        }

        let block_size = stat.f_frsize as u64;
        let size = block_size * stat.f_blocks as u64;
        let free = block_size * stat.f_bfree as u64;
        let available = block_size * stat.f_bavail as u64;
        Ok((size, size.saturating_sub(free), available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mounts() {
        let mounts = parse_mounts(
            "/dev/sda1 / ext4 rw,relatime 0 0\n\
             proc /proc proc rw 0 0\n\
             tmpfs /run tmpfs rw 0 0\n\
             /dev/sdb1 /data xfs rw 0 0\n\
             garbage\n",
        );
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].mount_point, "/");
        assert_eq!(mounts[1].fstype, "xfs");
    }

    #[test]
    fn test_should_skip_filesystem() {
        assert!(should_skip_filesystem("proc", "/proc"));
        assert!(should_skip_filesystem("tmpfs", "/dev/shm"));
        assert!(should_skip_filesystem("ext4", "/run/media"));
        assert!(!should_skip_filesystem("ext4", "/"));
        assert!(!should_skip_filesystem("xfs", "/var/lib/mysql"));
    }

    #[test]
    fn test_use_percent() {
        let stats = FilesystemStats {
            mount: MountEntry {
                device: "/dev/sda1".into(),
                mount_point: "/".into(),
                fstype: "ext4".into(),
            },
            size_bytes: 100,
            used_bytes: 30,
            available_bytes: 60,
        };
        assert!((stats.use_percent() - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_statvfs_root() {
        let (size, used, _) = statvfs_usage("/").unwrap();
        assert!(size >= used);
        assert!(statvfs_usage("/definitely/not/here").is_err());
    }
}
