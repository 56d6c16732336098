//! Network interface byte counters from /proc/net/dev.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Received and transmitted bytes of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetDevBytes {
    pub receive_bytes: u64,
    pub transmit_bytes: u64,
}

/// Parses `/proc/net/dev` content. The loopback interface is left out.
pub fn parse_netdev(content: &str) -> BTreeMap<String, NetDevBytes> {
    let mut stats = BTreeMap::new();

    // Two header lines precede the interfaces.
    for line in content.lines().skip(2) {
        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };
        let interface = interface.trim();
        if interface == "lo" {
            continue;
        }

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        stats.insert(
            interface.to_string(),
            NetDevBytes {
                receive_bytes: values[0].parse().unwrap_or(0),
                transmit_bytes: values[8].parse().unwrap_or(0),
            },
        );
    }

    stats
}

pub fn read_netdev(proc_root: &Path) -> Result<BTreeMap<String, NetDevBytes>, String> {
    let path = proc_root.join("net/dev");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(parse_netdev(&content))
}
