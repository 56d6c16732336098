//! Resident memory per process, scanned from /proc/<pid>.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

/// Resident memory of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMemory {
    pub pid: u32,
    pub name: String,
    pub rss_bytes: u64,
}

/// Numeric entries of the proc root.
pub fn collect_pid_dirs(proc_root: &Path) -> Vec<(u32, PathBuf)> {
    let Ok(entries) = fs::read_dir(proc_root) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter_map(|entry| {
            let pid = entry.file_name().to_str()?.parse::<u32>().ok()?;
            Some((pid, entry.path()))
        })
        .collect()
}

/// Process name from `comm`, falling back to the first `cmdline` argument.
pub fn read_process_name(proc_path: &Path) -> Option<String> {
    if let Ok(s) = fs::read_to_string(proc_path.join("comm")) {
        let t = s.trim();
        if !t.is_empty() {
            return Some(t.to_string());
        }
    }

    let content = fs::read(proc_path.join("cmdline")).ok()?;
    let first = content.split(|&b| b == 0).next()?;
    let first = std::str::from_utf8(first).ok()?;
    Path::new(first)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// `VmRSS` from a `/proc/<pid>/status` body, in bytes. Kernel threads have
/// none.
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let value = line.strip_prefix("VmRSS:")?;
        let kb: u64 = value.split_whitespace().next()?.parse().ok()?;
        Some(kb * 1024)
    })
}

/// Scans every process in parallel. Processes that vanish mid-scan or
/// have no resident memory are left out.
pub fn scan_process_memory(proc_root: &Path) -> Vec<ProcessMemory> {
    collect_pid_dirs(proc_root)
        .par_iter()
        .filter_map(|(pid, path)| {
            let status = fs::read_to_string(path.join("status")).ok()?;
            let rss_bytes = parse_vm_rss(&status)?;
            if rss_bytes == 0 {
                return None;
            }
            let name = read_process_name(path).unwrap_or_else(|| format!("[{}]", pid));
            Some(ProcessMemory {
                pid: *pid,
                name,
                rss_bytes,
            })
        })
        .collect()
}

/// The `n` largest processes by resident memory, ties broken by pid.
pub fn top_by_memory(mut processes: Vec<ProcessMemory>, n: usize) -> Vec<ProcessMemory> {
    processes.sort_by(|a, b| b.rss_bytes.cmp(&a.rss_bytes).then(a.pid.cmp(&b.pid)));
    processes.truncate(n);
    processes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_process(root: &Path, pid: u32, comm: &str, rss_kb: Option<u64>) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("comm"), format!("{}\n", comm)).unwrap();
        let mut status = format!("Name:\t{}\n", comm);
        if let Some(kb) = rss_kb {
            status.push_str(&format!("VmRSS:\t{} kB\n", kb));
        }
        fs::write(dir.join("status"), status).unwrap();
    }

    #[test]
    fn test_parse_vm_rss() {
        assert_eq!(parse_vm_rss("Name:\tmysqld\nVmRSS:\t  2048 kB\n"), Some(2048 * 1024));
        assert_eq!(parse_vm_rss("Name:\tkthreadd\n"), None);
    }

    #[test]
    fn test_read_process_name_falls_back_to_cmdline() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cmdline"), b"/usr/sbin/mysqld\0--user=mysql\0").unwrap();
        assert_eq!(read_process_name(dir.path()).as_deref(), Some("mysqld"));
    }

    #[test]
    fn test_scan_and_top() {
        let dir = TempDir::new().unwrap();
        fake_process(dir.path(), 1, "systemd", Some(10_000));
        fake_process(dir.path(), 200, "mysqld", Some(500_000));
        fake_process(dir.path(), 2, "kthreadd", None);
        fake_process(dir.path(), 300, "sshd", Some(10_000));
        fs::create_dir_all(dir.path().join("self")).unwrap();

        let processes = scan_process_memory(dir.path());
        assert_eq!(processes.len(), 3);

        let top = top_by_memory(processes, 2);
        assert_eq!(top[0].name, "mysqld");
        assert_eq!(top[1].pid, 1);
    }
}
