//! Host sections of the report: the machine the database runs on.
//!
//! Host probing is best effort. Each section either builds completely or
//! fails with a message; the report logs the message and moves on.

pub mod filesystem;
pub mod netdev;
pub mod processes;
pub mod system;

use std::path::PathBuf;

use crate::table::{Cell, ColumnStyle, ColumnStyles, ReportSection};

pub const LINUX_INFO_TITLE: &str = "Linux info";
pub const FILESYSTEM_INFO_TITLE: &str = "Filesystem info";
pub const LINUX_OVERVIEW_TITLE: &str = "Linux Overview";

/// Source of the host sections.
pub trait HostInspector {
    fn linux_info(&self) -> Result<ReportSection, String>;
    fn filesystem_info(&self) -> Result<ReportSection, String>;
    fn linux_overview(&self) -> Result<ReportSection, String>;
    /// The `n` processes with the most resident memory.
    fn memory_top(&self, n: usize) -> Result<ReportSection, String>;
}

/// Reads the local host through procfs and sysfs.
#[derive(Debug, Clone)]
pub struct ProcHost {
    pub proc_root: PathBuf,
    pub sys_root: PathBuf,
}

impl Default for ProcHost {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
        }
    }
}

impl ProcHost {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
        }
    }
}

/// Formats a byte count with a binary unit, e.g. `1.50 GB`.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.2} KB", b / KB)
    } else if b < KB * KB * KB {
        format!("{:.2} MB", b / (KB * KB))
    } else if b < KB * KB * KB * KB {
        format!("{:.2} GB", b / (KB * KB * KB))
    } else {
        format!("{:.2} TB", b / (KB * KB * KB * KB))
    }
}

fn mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

fn item_styles() -> ColumnStyles {
    ColumnStyles::new(vec![ColumnStyle::left("Item"), ColumnStyle::left("Value")])
}

impl HostInspector for ProcHost {
    fn linux_info(&self) -> Result<ReportSection, String> {
        let mut section = ReportSection::new(LINUX_INFO_TITLE, item_styles());
        let mut item = |name: &str, value: String| {
            section.push_row(vec![Cell::text(name), Cell::Text(value)]);
        };

        if let Some(hostname) = system::read_hostname(&self.proc_root) {
            item("Hostname", hostname);
        }
        item("Kernel", system::read_kernel(&self.proc_root)?);
        item("Architecture", std::env::consts::ARCH.to_string());

        let (model, count) = system::read_cpu_model(&self.proc_root)?;
        item("CPU", format!("{} x {}", model, count));

        let memory = system::read_memory_info(&self.proc_root)?;
        item("Memory", format_bytes(memory.total_bytes));
        item("Swap", format_bytes(memory.swap_total_bytes));

        for (iface, bytes) in netdev::read_netdev(&self.proc_root)? {
            item(
                &format!("Network {}", iface),
                format!(
                    "RX {} MiB / TX {} MiB",
                    mib(bytes.receive_bytes),
                    mib(bytes.transmit_bytes)
                ),
            );
        }
        for (device, size) in system::read_block_devices(&self.sys_root) {
            item(&format!("Disk {}", device), format_bytes(size));
        }

        let processes = processes::collect_pid_dirs(&self.proc_root).len();
        item("Processes", processes.to_string());

        Ok(section)
    }

    fn filesystem_info(&self) -> Result<ReportSection, String> {
        let styles = ColumnStyles::new(vec![
            ColumnStyle::left("Filesystem"),
            ColumnStyle::left("Type"),
            ColumnStyle::right("Size"),
            ColumnStyle::right("Used"),
            ColumnStyle::right("Avail"),
            ColumnStyle::right("Use%"),
            ColumnStyle::left("Mounted on"),
        ]);
        let rows = filesystem::read_filesystem_stats(&self.proc_root)?
            .into_iter()
            .map(|fs| {
                let use_percent = fs.use_percent();
                vec![
                    Cell::Text(fs.mount.device),
                    Cell::Text(fs.mount.fstype),
                    Cell::Text(format_bytes(fs.size_bytes)),
                    Cell::Text(format_bytes(fs.used_bytes)),
                    Cell::Text(format_bytes(fs.available_bytes)),
                    Cell::Percentage(use_percent),
                    Cell::Text(fs.mount.mount_point),
                ]
            })
            .collect();
        Ok(ReportSection::new(FILESYSTEM_INFO_TITLE, styles).with_rows(rows))
    }

    fn linux_overview(&self) -> Result<ReportSection, String> {
        let cpu = system::read_cpu_times(&self.proc_root)?;
        let memory = system::read_memory_info(&self.proc_root)?;
        let load = system::read_load_average(&self.proc_root)?;

        let styles = ColumnStyles::parse_all(&[
            "CPU,l", "cpu %,r", "Memory,l", "memory,r", "Swap,l", "swap,r", "Load,l", "load,r",
        ])
        .map_err(|e| e.to_string())?;

        let pct = |ticks| Cell::Percentage(cpu.percent(ticks));
        let bytes = |b| Cell::Text(format_bytes(b));
        let blank = || Cell::text("");
        let rows = vec![
            vec![
                Cell::text("user"),
                pct(cpu.user + cpu.nice),
                Cell::text("total"),
                bytes(memory.total_bytes),
                Cell::text("total"),
                bytes(memory.swap_total_bytes),
                Cell::text("1 min"),
                Cell::Float(load.one_min),
            ],
            vec![
                Cell::text("system"),
                pct(cpu.system + cpu.irq + cpu.softirq),
                Cell::text("used"),
                bytes(memory.used_bytes()),
                Cell::text("used"),
                bytes(memory.swap_used_bytes()),
                Cell::text("5 min"),
                Cell::Float(load.five_min),
            ],
            vec![
                Cell::text("iowait"),
                pct(cpu.iowait),
                Cell::text("free"),
                bytes(memory.free_bytes),
                Cell::text("free"),
                bytes(memory.swap_free_bytes),
                Cell::text("15 min"),
                Cell::Float(load.fifteen_min),
            ],
            vec![
                Cell::text("idle"),
                pct(cpu.idle),
                Cell::text("available"),
                bytes(memory.available_bytes),
                blank(),
                blank(),
                blank(),
                blank(),
            ],
        ];
        Ok(ReportSection::new(LINUX_OVERVIEW_TITLE, styles).with_rows(rows))
    }

    fn memory_top(&self, n: usize) -> Result<ReportSection, String> {
        let memory = system::read_memory_info(&self.proc_root)?;
        let top = processes::top_by_memory(processes::scan_process_memory(&self.proc_root), n);

        let styles = ColumnStyles::new(vec![
            ColumnStyle::right("No"),
            ColumnStyle::left("Name"),
            ColumnStyle::right("Pid"),
            ColumnStyle::right("Memory percent"),
        ]);
        let rows = top
            .into_iter()
            .enumerate()
            .map(|(idx, p)| {
                let share = if memory.total_bytes == 0 {
                    0.0
                } else {
                    p.rss_bytes as f64 * 100.0 / memory.total_bytes as f64
                };
                vec![
                    Cell::Integer(idx as i64 + 1),
                    Cell::Text(p.name),
                    Cell::Integer(p.pid as i64),
                    Cell::Percentage(share),
                ]
            })
            .collect();
        Ok(ReportSection::new(format!("Host memory top{}", n), styles).with_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fake_host() -> (TempDir, ProcHost) {
        let dir = TempDir::new().unwrap();
        let proc_root = dir.path().join("proc");
        let sys_root = dir.path().join("sys");
        write(&proc_root, "sys/kernel/ostype", "Linux\n");
        write(&proc_root, "sys/kernel/osrelease", "6.1.0\n");
        write(&proc_root, "cpuinfo", "processor : 0\nmodel name : Test CPU\n");
        write(
            &proc_root,
            "meminfo",
            "MemTotal: 1048576 kB\nMemFree: 262144 kB\nMemAvailable: 524288 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n",
        );
        write(
            &proc_root,
            "net/dev",
            "h1\nh2\n  eth0: 1048576 1 0 0 0 0 0 0 2097152 1 0 0 0 0 0 0\n",
        );
        write(&proc_root, "stat", "cpu  25 0 25 50 0 0 0 0\n");
        write(&proc_root, "loadavg", "0.10 0.20 0.30 1/10 99\n");
        write(&proc_root, "42/comm", "mysqld\n");
        write(&proc_root, "42/status", "VmRSS:\t262144 kB\n");
        write(&sys_root, "block/vda/size", "2097152\n");
        (dir, ProcHost::new(proc_root, sys_root))
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_linux_info() {
        let (_dir, host) = fake_host();
        let section = host.linux_info().unwrap();
        assert!(section.validate().is_ok());
        let find = |name: &str| {
            section
                .rows
                .iter()
                .find(|r| r[0] == Cell::text(name))
                .map(|r| r[1].to_string())
        };
        assert_eq!(find("Kernel").as_deref(), Some("Linux 6.1.0"));
        assert_eq!(find("CPU").as_deref(), Some("Test CPU x 1"));
        assert_eq!(find("Memory").as_deref(), Some("1.00 GB"));
        assert_eq!(
            find("Network eth0").as_deref(),
            Some("RX 1.00 MiB / TX 2.00 MiB")
        );
        assert_eq!(find("Disk vda").as_deref(), Some("1.00 GB"));
        assert_eq!(find("Processes").as_deref(), Some("1"));
    }

    #[test]
    fn test_linux_overview() {
        let (_dir, host) = fake_host();
        let section = host.linux_overview().unwrap();
        assert!(section.validate().is_ok());
        assert_eq!(section.rows[0][1], Cell::Percentage(25.0));
        assert_eq!(section.rows[3][1], Cell::Percentage(50.0));
        assert_eq!(section.rows[1][3], Cell::text("512.00 MB"));
        assert_eq!(section.rows[2][7], Cell::Float(0.3));
    }

    #[test]
    fn test_memory_top() {
        let (_dir, host) = fake_host();
        let section = host.memory_top(5).unwrap();
        assert_eq!(section.title, "Host memory top5");
        assert_eq!(
            section.rows,
            vec![vec![
                Cell::Integer(1),
                Cell::text("mysqld"),
                Cell::Integer(42),
                Cell::Percentage(25.0),
            ]]
        );
    }

    #[test]
    fn test_missing_proc_is_an_error() {
        let host = ProcHost::new("/nonexistent/proc", "/nonexistent/sys");
        assert!(host.linux_info().is_err());
        assert!(host.linux_overview().is_err());
    }
}
