//! Check command implementation.
//!
//! Connects to the configured server and reports which parts of the report
//! it can serve.

use std::path::Path;

use herakles_mysql_watcher::snapshot::{take_snapshot, SampleSeq};
use herakles_mysql_watcher::{MySqlSession, ServerCapabilities};
use nix::unistd::Uid;

use crate::config::{validate_effective_config, Config};

/// Counters the overview section reads from `SHOW GLOBAL STATUS`.
const OVERVIEW_COUNTERS: &[&str] = &[
    "Uptime",
    "Questions",
    "Com_commit",
    "Com_rollback",
    "Com_select",
    "Com_insert",
    "Com_update",
    "Com_delete",
    "Com_replace",
    "Slow_queries",
    "Threads_connected",
    "Threads_created",
    "Connections",
    "Aborted_connects",
    "Innodb_buffer_pool_reads",
    "Innodb_buffer_pool_read_requests",
    "Innodb_buffer_pool_pages_total",
    "Innodb_buffer_pool_pages_free",
    "Qcache_hits",
    "Qcache_inserts",
    "Select_full_join",
    "Handler_read_first",
    "Handler_read_key",
    "Handler_read_next",
    "Handler_read_prev",
    "Handler_read_rnd",
    "Handler_read_rnd_next",
    "Table_locks_waited",
    "Table_locks_immediate",
    "Open_tables",
    "Opened_tables",
    "Created_tmp_tables",
    "Created_tmp_disk_tables",
];

/// Validates configuration and server reachability.
pub async fn command_check(config: &Config) -> anyhow::Result<()> {
    println!("🔍 Herakles MySQL Watcher - Server Check");
    println!("========================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {:#}", e);
            all_ok = false;
        }
    }

    println!("\n📁 Checking host access...");
    if Path::new("/proc/meminfo").exists() {
        println!("   ✅ /proc accessible");
    } else {
        println!("   ⚠️  /proc not available - host sections will be skipped");
    }
    if Uid::effective().is_root() {
        println!("   ✅ Running as root");
    } else {
        println!("   ℹ️  Not running as root - the error log may not be readable");
    }

    let params = config.connect_params();
    println!(
        "\n🔌 Connecting to {}@{}:{}...",
        params.user, params.host, params.port
    );
    match MySqlSession::connect(&params).await {
        Ok(mut session) => {
            println!("   ✅ Connected");
            let caps = ServerCapabilities::detect(&mut session).await?;
            println!("   ✅ Server version: {}", caps.version);
            println!("   ✅ Variables schema: {}", caps.variables_schema());
            if caps.sys_schema {
                println!("   ✅ sys schema installed");
            } else {
                println!("   ⚠️  sys schema missing - sys-based sections will be skipped");
            }

            let snapshot = take_snapshot(&mut session, SampleSeq::First).await?;
            let present = OVERVIEW_COUNTERS
                .iter()
                .filter(|name| snapshot.raw(name).is_some())
                .count();
            println!(
                "   ✅ {} status counters, {}/{} used by the overview",
                snapshot.len(),
                present,
                OVERVIEW_COUNTERS.len()
            );
            session.close().await?;
        }
        Err(e) => {
            println!("   ❌ Connection failed: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - ready to report");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the messages above");
        std::process::exit(1);
    }
}
