//! Database report sections other than the overview.
//!
//! Most sections are a single query whose rows are printed as-is. They are
//! described by [`PassthroughSpec`] entries in [`CATALOG`] and all run
//! through [`run_passthrough_section`]. The few sections that post-process
//! their rows (system parameters, optimizer switch, error log statistics)
//! have their own builders below.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::session::{ServerCapabilities, Session};
use crate::table::{Cell, ColumnStyle, ColumnStyles, ReportRow, ReportSection};

/// How a section is switched on in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `ON` / `OFF`.
    Toggle,
    /// `OFF` or a row limit.
    TopN,
}

/// Server version condition of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGate {
    Any,
    Contains(&'static str),
    Excludes(&'static str),
}

impl VersionGate {
    pub fn allows(&self, caps: &ServerCapabilities) -> bool {
        match self {
            VersionGate::Any => true,
            VersionGate::Contains(v) => caps.version_contains(v),
            VersionGate::Excludes(v) => !caps.version_contains(v),
        }
    }
}

/// A single-query section.
///
/// `query` may contain `{db}` (the configured schema), `{limit}` (the top-N
/// row limit) and `{vars_schema}` (schema holding `global_variables`).
#[derive(Debug, Clone, Copy)]
pub struct PassthroughSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: SectionKind,
    pub sys_schema: bool,
    pub version: VersionGate,
    pub query: &'static str,
    pub styles: &'static [&'static str],
}

impl PassthroughSpec {
    /// Whether the server can answer this section's query.
    pub fn supported_by(&self, caps: &ServerCapabilities) -> bool {
        (!self.sys_schema || caps.sys_schema) && self.version.allows(caps)
    }

    /// Title, with the row limit appended for top-N sections.
    pub fn title_for(&self, limit: Option<usize>) -> String {
        match (self.kind, limit) {
            (SectionKind::TopN, Some(n)) => format!("{}{}", self.title, n),
            _ => self.title.to_string(),
        }
    }

    pub fn render_query(&self, db: &str, limit: Option<usize>, vars_schema: &str) -> String {
        self.query
            .replace("{db}", &quote_literal(db))
            .replace("{limit}", &limit.unwrap_or(DEFAULT_TOP_N).to_string())
            .replace("{vars_schema}", vars_schema)
    }

    pub fn column_styles(&self) -> Result<ColumnStyles, ReportError> {
        ColumnStyles::parse_all(self.styles)
    }
}

/// Row limit used when a top-N section is simply switched `ON`.
pub const DEFAULT_TOP_N: usize = 10;

/// Escapes a value for use inside a single-quoted SQL string literal.
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// A section declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSection {
    pub title: String,
    pub query: String,
    /// Column styles in `"label,align"` or `"label,width,align"` form.
    pub styles: Vec<String>,
}

impl CustomSection {
    pub fn column_styles(&self) -> Result<ColumnStyles, ReportError> {
        ColumnStyles::parse_all(&self.styles)
    }
}

/// Runs `query` and wraps its rows in a section.
pub async fn run_passthrough_section<S: Session>(
    session: &mut S,
    title: &str,
    query: &str,
    styles: &ColumnStyles,
) -> Result<ReportSection, ReportError> {
    let rows = session.execute(query).await?;
    info!("Section '{}' returned {} rows", title, rows.len());
    Ok(ReportSection::new(title, styles.clone()).with_rows(rows))
}

// ---------------------------------------------------------------------------
// System parameters
// ---------------------------------------------------------------------------

pub const SYSTEM_PARAMETER_TITLE: &str = "System Parameter";

/// Global variables worth showing in every report.
pub static SYSTEM_PARAMETERS: &[&str] = &[
    "autocommit",
    "binlog_cache_size",
    "bulk_insert_buffer_size",
    "character_set_server",
    "tx_isolation",
    "transaction_isolation",
    "tx_read_only",
    "sql_mode",
    // connection
    "interactive_timeout",
    "wait_timeout",
    "lock_wait_timeout",
    "skip_name_resolve",
    "max_connections",
    "max_connect_errors",
    // table cache
    "table_open_cache",
    "table_definition_cache",
    "table_open_cache_instances",
    // performance
    "have_query_cache",
    "join_buffer_size",
    "key_buffer_size",
    "key_cache_age_threshold",
    "key_cache_block_size",
    "key_cache_division_limit",
    "large_pages",
    "locked_in_memory",
    "long_query_time",
    "max_allowed_packet",
    "max_binlog_size",
    "max_length_for_sort_data",
    "max_sort_length",
    "max_tmp_tables",
    "max_user_connections",
    "optimizer_prune_level",
    "optimizer_search_depth",
    "query_cache_size",
    "query_cache_type",
    "query_prealloc_size",
    "range_alloc_block_size",
    // session memory
    "read_buffer_size",
    "read_rnd_buffer_size",
    "sort_buffer_size",
    "tmp_table_size",
    "thread_cache_size",
    // logging
    "log_error",
    "slow_query_log",
    "slow_query_log_file",
    "log_queries_not_using_indexes",
    "log_slow_admin_statements",
    "log_slow_slave_statements",
    "log_throttle_queries_not_using_indexes",
    "expire_logs_days",
    "binlog_expire_logs_seconds",
    "min_examined_row_limit",
    "log_bin_trust_function_creators",
    // innodb
    "innodb_page_size",
    "innodb_buffer_pool_size",
    "innodb_buffer_pool_instances",
    "innodb_buffer_pool_chunk_size",
    "innodb_buffer_pool_load_at_startup",
    "innodb_buffer_pool_dump_at_shutdown",
    "innodb_buffer_pool_dump_pct",
    "innodb_lru_scan_depth",
    "innodb_lock_wait_timeout",
    "innodb_io_capacity",
    "innodb_io_capacity_max",
    "innodb_flush_method",
    "innodb_flush_log_at_trx_commit",
    "innodb_file_format",
    "innodb_file_format_max",
    "innodb_undo_logs",
    "innodb_undo_tablespaces",
    "innodb_undo_log_truncate",
    "innodb_max_undo_log_size",
    "innodb_flush_neighbors",
    "innodb_log_file_size",
    "innodb_log_files_in_group",
    "innodb_log_buffer_size",
    "innodb_purge_threads",
    "innodb_purge_rseg_truncate_frequency",
    "innodb_page_cleaners",
    "innodb_large_prefix",
    "innodb_thread_concurrency",
    "innodb_print_all_deadlocks",
    "innodb_strict_mode",
    "innodb_sort_buffer_size",
    "innodb_write_io_threads",
    "innodb_read_io_threads",
    "innodb_file_per_table",
    "innodb_stats_persistent_sample_pages",
    "innodb_autoinc_lock_mode",
    "innodb_online_alter_log_max_size",
    "innodb_open_files",
    "innodb_numa_interleave",
    // replication
    "master_info_repository",
    "relay_log_info_repository",
    "sync_binlog",
    "gtid_mode",
    "enforce_gtid_consistency",
    "log_slave_updates",
    "binlog_format",
    "binlog_rows_query_log_events",
    "binlog_gtid_simple_recovery",
    "relay_log",
    "relay_log_recovery",
    "slave_skip_errors",
    "slave_rows_search_algorithms",
    "slave_parallel_type",
    "slave_parallel_workers",
    "slave_preserve_commit_order",
    "slave_transaction_retries",
    // semi-sync replication
    "plugin_load",
    "rpl_semi_sync_master_enabled",
    "rpl_semi_sync_master_timeout",
    "rpl_semi_sync_slave_enabled",
    // misc
    "validate_password_policy",
    "metadata_locks_hash_instances",
    "log_timestamps",
    "show_compatibility_56",
];

pub fn system_parameters_query(vars_schema: &str) -> String {
    let names = SYSTEM_PARAMETERS
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "SELECT variable_name, variable_value FROM {}.global_variables \
         WHERE variable_name IN ({}) ORDER BY variable_name",
        vars_schema, names
    )
}

/// Renders `*_size` variables with a binary unit suffix: `134217728` -> `128M`.
pub fn humanize_parameter(name: &str, value: &str) -> String {
    if !name.to_ascii_lowercase().contains("size") {
        return value.to_string();
    }
    let bytes: u64 = match value.trim().parse() {
        Ok(v) => v,
        Err(_) => return value.to_string(),
    };

    const UNITS: [(u64, char); 5] = [
        (1 << 50, 'P'),
        (1 << 40, 'T'),
        (1 << 30, 'G'),
        (1 << 20, 'M'),
        (1 << 10, 'K'),
    ];
    for (size, suffix) in UNITS {
        if bytes >= size {
            return if bytes % size == 0 {
                format!("{}{}", bytes / size, suffix)
            } else {
                format!("{:.2}{}", bytes as f64 / size as f64, suffix)
            };
        }
    }
    bytes.to_string()
}

pub async fn system_parameter_section<S: Session>(
    session: &mut S,
    caps: &ServerCapabilities,
) -> Result<ReportSection, ReportError> {
    let rows = session
        .execute(&system_parameters_query(caps.variables_schema()))
        .await?;
    let rows = rows
        .into_iter()
        .filter(|row| row.len() == 2)
        .map(|row| {
            let name = row[0].to_string();
            let value = match &row[1] {
                Cell::Null => Cell::Null,
                other => Cell::Text(humanize_parameter(&name, &other.to_string())),
            };
            vec![Cell::Text(name), value]
        })
        .collect();
    let styles = ColumnStyles::new(vec![
        ColumnStyle::left("parameter_name"),
        ColumnStyle::right("value"),
    ]);
    Ok(ReportSection::new(SYSTEM_PARAMETER_TITLE, styles).with_rows(rows))
}

// ---------------------------------------------------------------------------
// Optimizer switch
// ---------------------------------------------------------------------------

pub const OPTIMIZER_SWITCH_TITLE: &str = "Optimizer Switch";

/// Splits `index_merge=on,mrr=off` into `(name, value)` rows.
pub fn optimizer_switch_rows(value: &str) -> Vec<ReportRow> {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            let (name, val) = item.split_once('=').unwrap_or((item, ""));
            vec![Cell::text(name.trim()), Cell::text(val.trim())]
        })
        .collect()
}

pub async fn optimizer_switch_section<S: Session>(
    session: &mut S,
    caps: &ServerCapabilities,
) -> Result<ReportSection, ReportError> {
    let query = format!(
        "SELECT variable_value FROM {}.global_variables WHERE variable_name = 'optimizer_switch'",
        caps.variables_schema()
    );
    let value = session.scalar(&query).await?.unwrap_or_default();
    let styles = ColumnStyles::new(vec![
        ColumnStyle::left("switch_name"),
        ColumnStyle::right("value"),
    ]);
    Ok(ReportSection::new(OPTIMIZER_SWITCH_TITLE, styles).with_rows(optimizer_switch_rows(&value)))
}

// ---------------------------------------------------------------------------
// Error log statistics
// ---------------------------------------------------------------------------

pub const LOG_ERROR_TITLE: &str = "Log file Statistics";

/// Startup/shutdown lines and warning/error counts of the server error log.
///
/// `contents` is `None` when the file cannot be read from this host.
pub fn log_error_rows(path: &str, contents: Option<&str>) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    let mut warnings = 0usize;
    let mut errors = 0usize;

    match contents {
        Some(text) => {
            for line in text.lines() {
                if line.contains("ready for connections") || line.contains("Shutdown completed") {
                    rows.push(vec![Cell::text(line.trim_end())]);
                }
                if line.contains("Warning") {
                    warnings += 1;
                }
                if line.contains("ERROR") || line.contains("error") {
                    errors += 1;
                }
            }
        }
        None => rows.push(vec![Cell::text(format!("{} not exists", path))]),
    }

    rows.push(vec![Cell::text("Warning & Error Statistics:")]);
    rows.push(vec![Cell::text(format!("{} contains {} warning(s).", path, warnings))]);
    rows.push(vec![Cell::text(format!("{} contains {} error(s).", path, errors))]);
    rows
}

pub async fn log_error_section<S: Session>(
    session: &mut S,
    caps: &ServerCapabilities,
) -> Result<ReportSection, ReportError> {
    let query = format!(
        "SELECT variable_value FROM {}.global_variables WHERE variable_name = 'log_error'",
        caps.variables_schema()
    );
    let path = session.scalar(&query).await?.unwrap_or_default();
    let contents = match fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Error log '{}' not readable: {}", path, e);
            None
        }
    };
    let styles = ColumnStyles::new(vec![ColumnStyle::left("start & shutdown:")]);
    Ok(ReportSection::new(LOG_ERROR_TITLE, styles)
        .with_rows(log_error_rows(&path, contents.as_deref())))
}

// ---------------------------------------------------------------------------
// Pass-through catalog
// ---------------------------------------------------------------------------

const fn toggle(
    key: &'static str,
    title: &'static str,
    sys_schema: bool,
    version: VersionGate,
    query: &'static str,
    styles: &'static [&'static str],
) -> PassthroughSpec {
    PassthroughSpec {
        key,
        title,
        kind: SectionKind::Toggle,
        sys_schema,
        version,
        query,
        styles,
    }
}

const fn top_n(
    key: &'static str,
    title: &'static str,
    query: &'static str,
    styles: &'static [&'static str],
) -> PassthroughSpec {
    PassthroughSpec {
        key,
        title,
        kind: SectionKind::TopN,
        sys_schema: true,
        version: VersionGate::Any,
        query,
        styles,
    }
}

use VersionGate::{Any, Contains, Excludes};

/// Every pass-through section, in report order. A key may appear more than
/// once with mutually exclusive version gates.
pub static CATALOG: &[PassthroughSpec] = &[
    toggle(
        "replication",
        "Replication",
        false,
        Any,
        "SELECT USER, HOST, command, \
         CONCAT(FLOOR(TIME/86400),'d',FLOOR(TIME/3600)%24,'h',FLOOR(TIME/60)%60,'m',TIME%60,'s') TIMES, state \
         FROM information_schema.processlist \
         WHERE COMMAND = 'Binlog Dump' OR COMMAND = 'Binlog Dump GTID'",
        &["USER,l", "HOST,l", "command,l", "TIMES,r", "state,r"],
    ),
    toggle(
        "connect_count",
        "Connect Count",
        false,
        Any,
        "SELECT SUBSTRING_INDEX(HOST,':',1) HOSTS, USER, db, command, COUNT(*), SUM(TIME) \
         FROM information_schema.processlist \
         WHERE Command != '' AND DB != 'information_schema' \
         GROUP BY HOSTS, USER, db, command",
        &["HOSTS,l", "USER,l", "db,l", "command,l", "COUNT(*),r", "SUM(TIME),r"],
    ),
    toggle(
        "avg_query_time",
        "Avg Query Time",
        false,
        Excludes("5.6"),
        "SELECT schema_name, SUM(count_star) COUNT, \
         ROUND((SUM(sum_timer_wait)/SUM(count_star))/1000000) avg_microsec \
         FROM performance_schema.events_statements_summary_by_digest \
         WHERE schema_name IS NOT NULL GROUP BY schema_name",
        &["schema_name,l", "COUNT,r", "avg_microsec,r"],
    ),
    top_n(
        "slow_query_topN",
        "Slow Query Top",
        "SELECT query, db, exec_count, total_latency, max_latency, avg_latency \
         FROM sys.statements_with_runtimes_in_95th_percentile LIMIT {limit}",
        &["QUERY,l", "db,r", "exec_count,r", "total_latency,r", "max_latency,r", "avg_latency,r"],
    ),
    toggle(
        "err_sql_count",
        "Err Sql Count",
        false,
        Contains("5.7"),
        "SELECT schema_name, SUM(sum_errors) err_count \
         FROM performance_schema.events_statements_summary_by_digest \
         WHERE sum_errors > 0 GROUP BY schema_name",
        &["schema_name,l", "err_count,r"],
    ),
    top_n(
        "err_sql_topN",
        "Err SQL Top",
        "SELECT query, db, exec_count, errors FROM sys.statements_with_errors_or_warnings \
         ORDER BY errors DESC LIMIT {limit}",
        &["QUERY,l", "db,r", "exec_count,r", "ERRORS,r"],
    ),
    top_n(
        "query_analysis_topN",
        "query analysis top",
        "SELECT query, full_scan, exec_count, total_latency, lock_latency, rows_sent_avg, \
         rows_examined_avg, tmp_tables, tmp_disk_tables, rows_sorted, last_seen \
         FROM sys.statement_analysis WHERE db = '{db}' ORDER BY total_latency DESC LIMIT {limit}",
        &[
            "QUERY,l",
            "fscan,l",
            "ex_cot,r",
            "total_ltc,r",
            "lock_ltc,r",
            "rw_st_avg,r",
            "rw_exm_avg,9,r",
            "tmp_table,9,r",
            "tp_dk_tab,9,r",
            "rows_sort,9,r",
            "last_seen,19,r",
        ],
    ),
    top_n(
        "query_full_table_scans_topN",
        "query full table scans top",
        "SELECT query, exec_count, total_latency, no_index_used_count, no_good_index_used_count, \
         no_index_used_pct, rows_sent_avg, rows_examined_avg, last_seen \
         FROM sys.statements_with_full_table_scans WHERE db = '{db}' \
         ORDER BY total_latency DESC LIMIT {limit}",
        &[
            "QUERY,l",
            "ex_cot,r",
            "total_ltc,r",
            "no_idx_use,r",
            "n_g_idx_use,r",
            "n_i_u_pct,r",
            "rw_st_avg,r",
            "rw_exm_avg,r",
            "last_seen,r",
        ],
    ),
    top_n(
        "query_sorting_topN",
        "query sorting top",
        "SELECT query, exec_count, total_latency, sort_merge_passes, avg_sort_merges, \
         sorts_using_scans, sort_using_range, rows_sorted, avg_rows_sorted, last_seen \
         FROM sys.statements_with_sorting WHERE db = '{db}' \
         ORDER BY avg_rows_sorted DESC LIMIT {limit}",
        &[
            "QUERY,l",
            "ex_cot,r",
            "total_ltc,r",
            "st_mg_ps,r",
            "avg_st_mg,r",
            "st_us_scan,r",
            "st_us_rag,r",
            "rows_sort,r",
            "avg_rw_st,r",
            "last_seen,r",
        ],
    ),
    top_n(
        "query_with_temp_tables_topN",
        "query with temp tables top",
        "SELECT query, exec_count, total_latency, memory_tmp_tables, disk_tmp_tables, \
         avg_tmp_tables_per_query, tmp_tables_to_disk_pct, last_seen \
         FROM sys.statements_with_temp_tables WHERE db = '{db}' \
         ORDER BY avg_tmp_tables_per_query DESC LIMIT {limit}",
        &[
            "QUERY,l",
            "ex_cot,r",
            "total_ltc,r",
            "mem_tmp_tab,r",
            "dsk_tmp_tab,r",
            "avg_tt_per_qry,r",
            "tt_to_dk_pct,r",
            "last_seen,r",
        ],
    ),
    toggle(
        "database_size",
        "Database Size",
        false,
        Any,
        "SELECT table_schema, \
         CONCAT(ROUND(SUM(data_length)/(1024*1024),2),'MB') AS 'Table Size', \
         CONCAT(ROUND(SUM(index_length)/(1024*1024),2),'MB') AS 'Index Size', \
         CONCAT(ROUND(SUM(data_length)/(1024*1024),2) + ROUND(SUM(index_length)/(1024*1024),2),'MB') AS 'DB Size' \
         FROM information_schema.tables GROUP BY table_schema \
         UNION \
         SELECT '*** all ***' table_schema, \
         CONCAT(ROUND(SUM(data_length)/(1024*1024),2),'MB') AS 'Table Size', \
         CONCAT(ROUND(SUM(index_length)/(1024*1024),2),'MB') AS 'Index Size', \
         CONCAT(ROUND(SUM(data_length)/(1024*1024),2) + ROUND(SUM(index_length)/(1024*1024),2),'MB') AS 'DB Size' \
         FROM information_schema.tables",
        &["table_schema,l", "Table Size,r", "Index Size,r", "DB Size,r"],
    ),
    toggle(
        "object_count",
        "Object Count",
        false,
        Any,
        "SELECT ROUTINE_TYPE AS object_type, COUNT(0) AS COUNT FROM information_schema.routines \
         WHERE ROUTINE_SCHEMA = '{db}' GROUP BY ROUTINE_TYPE \
         UNION SELECT TABLE_TYPE AS object_type, COUNT(0) AS COUNT FROM information_schema.tables \
         WHERE TABLE_SCHEMA = '{db}' GROUP BY TABLE_TYPE \
         UNION SELECT CONCAT('INDEX (', INDEX_TYPE, ')') AS object_type, COUNT(0) AS COUNT \
         FROM information_schema.statistics WHERE TABLE_SCHEMA = '{db}' GROUP BY INDEX_TYPE \
         UNION SELECT 'TRIGGER' AS object_type, COUNT(0) AS COUNT FROM information_schema.triggers \
         WHERE TRIGGER_SCHEMA = '{db}' \
         UNION SELECT 'EVENT' AS object_type, COUNT(0) AS COUNT FROM information_schema.events \
         WHERE EVENT_SCHEMA = '{db}'",
        &["object_type,l", "COUNT,r"],
    ),
    toggle(
        "table_info",
        "Table Info",
        false,
        Any,
        "SELECT table_name, engine, row_format AS format, table_rows, avg_row_length AS avg_row, \
         ROUND(data_length/1024/1024,2) AS data_mb, \
         ROUND(index_length/1024/1024,2) AS index_mb, \
         ROUND((data_length+index_length)/1024/1024,2) AS total_mb \
         FROM information_schema.tables WHERE table_schema = '{db}'",
        &[
            "table_name,l",
            "engine,l",
            "format,l",
            "table_rows,r",
            "avg_row,r",
            "data_mb,r",
            "index_mb,r",
            "total_mb,r",
        ],
    ),
    toggle(
        "index_info",
        "Index Info",
        false,
        Any,
        "SELECT index_name, non_unique, seq_in_index, column_name, collation, cardinality, \
         nullable, index_type FROM information_schema.statistics WHERE table_schema = '{db}'",
        &[
            "index_name,l",
            "non_unique,l",
            "seq_in_index,l",
            "column_name,l",
            "collation,r",
            "cardinality,r",
            "nullable,r",
            "index_type,r",
        ],
    ),
    toggle(
        "schema_index_statistics",
        "schema_index_statistics",
        true,
        Any,
        "SELECT table_name, index_name, rows_selected, select_latency, rows_inserted, \
         insert_latency, rows_updated, update_latency, rows_deleted, delete_latency \
         FROM sys.schema_index_statistics WHERE table_schema = '{db}' ORDER BY table_name",
        &[
            "table_name,l",
            "index_name,l",
            "rows_selected,r",
            "select_latency,r",
            "rows_inserted,r",
            "insert_latency,r",
            "rows_updated,r",
            "update_latency,r",
            "rows_deleted,r",
            "delete_latency,r",
        ],
    ),
    toggle(
        "schema_table_statistics",
        "schema_table_statistics",
        true,
        Any,
        "SELECT table_name, total_latency, rows_fetched, fetch_latency, rows_inserted, \
         insert_latency, rows_updated, update_latency, rows_deleted, delete_latency, \
         io_read_requests, io_read, io_read_latency, io_write_requests, io_write, \
         io_write_latency, io_misc_requests, io_misc_latency \
         FROM sys.schema_table_statistics WHERE table_schema = '{db}' ORDER BY table_name",
        &[
            "table_name,l",
            "tal_ltc,r",
            "rw_ftc,r",
            "ftc_ltc,r",
            "rw_ins,r",
            "ins_ltc,r",
            "rw_upd,r",
            "upd_ltc,r",
            "rw_del,r",
            "del_ltc,r",
            "io_rd_rq,r",
            "io_read,r",
            "io_rd_ltc,r",
            "io_wt_rq,r",
            "io_write,r",
            "io_wt_ltc,r",
            "io_ms_rq,r",
            "io_ms_ltc,r",
        ],
    ),
    toggle(
        "schema_table_statistics_with_buffer",
        "schema_table_statistics_with_buffer",
        true,
        Any,
        "SELECT table_name, innodb_buffer_allocated, innodb_buffer_data, innodb_buffer_free, \
         innodb_buffer_pages, innodb_buffer_pages_hashed, innodb_buffer_pages_old, \
         innodb_buffer_rows_cached \
         FROM sys.schema_table_statistics_with_buffer WHERE table_schema = '{db}' ORDER BY table_name",
        &[
            "table_name,l",
            "indb_buf_alc,r",
            "indb_buf_data,r",
            "indb_buf_free,r",
            "indb_buf_page,r",
            "indb_buf_page_hash,r",
            "indb_buf_page_old,r",
            "indb_buf_rw_cach,r",
        ],
    ),
    toggle(
        "schema_tables_with_full_table_scans",
        "schema_tables_with_full_table_scans",
        true,
        Any,
        "SELECT object_schema, object_name, rows_full_scanned, latency \
         FROM sys.schema_tables_with_full_table_scans WHERE object_schema = '{db}' ORDER BY object_name",
        &["object_schema,l", "object_name,l", "rows_full_scanned,r", "latency,r"],
    ),
    toggle(
        "schema_unused_indexes",
        "Schema Unused Indexes",
        true,
        Any,
        "SELECT object_schema, object_name, index_name FROM sys.schema_unused_indexes \
         WHERE object_schema = '{db}'",
        &["object_schema,l", "object_name,l", "index_name,l"],
    ),
    toggle(
        "host_summary",
        "host_summary",
        true,
        Contains("5.6"),
        "SELECT host, statements, statement_latency, statement_avg_latency, table_scans, file_ios, \
         file_io_latency, current_connections, total_connections, unique_users FROM sys.host_summary",
        &[
            "host,l",
            "statements,r",
            "st_ltc,r",
            "st_avg_ltc,r",
            "table_scan,r",
            "file_ios,r",
            "f_io_ltc,r",
            "cur_conns,r",
            "total_conn,r",
            "unq_users,r",
        ],
    ),
    toggle(
        "host_summary",
        "host_summary",
        true,
        Excludes("5.6"),
        "SELECT host, statements, statement_latency, statement_avg_latency, table_scans, file_ios, \
         file_io_latency, current_connections, total_connections, unique_users, current_memory, \
         total_memory_allocated FROM sys.host_summary",
        &[
            "host,l",
            "statements,r",
            "st_ltc,r",
            "st_avg_ltc,r",
            "table_scan,r",
            "file_ios,r",
            "f_io_ltc,r",
            "cur_conns,r",
            "total_conn,r",
            "unq_users,r",
            "cur_mem,r",
            "tal_mem_alc,r",
        ],
    ),
    toggle(
        "host_summary_by_file_io_type",
        "host_summary_by_file_io_type",
        true,
        Any,
        "SELECT host, event_name, total, total_latency, max_latency FROM sys.host_summary_by_file_io_type",
        &["host,l", "event_name,l", "total,r", "total_ltc,r", "max_ltc,r"],
    ),
    toggle(
        "host_summary_by_file_io",
        "host_summary_by_file_io",
        true,
        Any,
        "SELECT host, ios, io_latency FROM sys.host_summary_by_file_io",
        &["host,l", "ios,r", "io_latency,r"],
    ),
    toggle(
        "host_summary_by_stages",
        "host_summary_by_stages",
        true,
        Any,
        "SELECT host, event_name, total, total_latency, avg_latency FROM sys.host_summary_by_stages",
        &["host,l", "event_name,l", "total,r", "total_latency,r", "avg_latency,r"],
    ),
    toggle(
        "host_summary_by_statement_latency",
        "host_summary_by_statement_latency",
        true,
        Any,
        "SELECT host, total, total_latency, max_latency, lock_latency, rows_sent, rows_examined, \
         rows_affected, full_scans FROM sys.host_summary_by_statement_latency",
        &[
            "host,l",
            "total,r",
            "total_latency,r",
            "max_latency,r",
            "lock_latency,r",
            "rows_sent,r",
            "rows_examined,r",
            "rows_affected,r",
            "full_scans,r",
        ],
    ),
    toggle(
        "host_summary_by_statement_type",
        "host_summary_by_statement_type",
        true,
        Any,
        "SELECT host, statement, total, total_latency, max_latency, lock_latency, rows_sent, \
         rows_examined, rows_affected, full_scans FROM sys.host_summary_by_statement_type",
        &[
            "host,l",
            "statement,l",
            "total,r",
            "total_latency,r",
            "max_latency,r",
            "lock_latency,r",
            "rows_sent,r",
            "rows_examined,r",
            "rows_affected,r",
            "full_scans,r",
        ],
    ),
    toggle(
        "user_summary",
        "user_summary",
        true,
        Contains("5.6"),
        "SELECT user, statements, statement_latency, statement_avg_latency, table_scans, file_ios, \
         file_io_latency, current_connections, total_connections, unique_hosts FROM sys.user_summary",
        &[
            "user,l",
            "statements,r",
            "st_ltc,r",
            "st_avg_ltc,r",
            "table_scan,r",
            "file_ios,r",
            "f_io_ltc,r",
            "cur_conns,r",
            "total_conn,r",
            "unq_hosts,r",
        ],
    ),
    toggle(
        "user_summary",
        "user_summary",
        true,
        Excludes("5.6"),
        "SELECT user, statements, statement_latency, statement_avg_latency, table_scans, file_ios, \
         file_io_latency, current_connections, total_connections, unique_hosts, current_memory, \
         total_memory_allocated FROM sys.user_summary",
        &[
            "user,l",
            "statements,r",
            "st_ltc,r",
            "st_avg_ltc,r",
            "table_scan,r",
            "file_ios,r",
            "f_io_ltc,r",
            "cur_conns,r",
            "total_conn,r",
            "unq_hosts,r",
            "cur_mem,r",
            "tal_mem_alc,r",
        ],
    ),
    toggle(
        "user_summary_by_file_io_type",
        "user_summary_by_file_io_type",
        true,
        Any,
        "SELECT user, event_name, total, latency, max_latency FROM sys.user_summary_by_file_io_type",
        &["user,l", "event_name,l", "total,r", "latency,r", "max_ltc,r"],
    ),
    toggle(
        "user_summary_by_file_io",
        "user_summary_by_file_io",
        true,
        Any,
        "SELECT user, ios, io_latency FROM sys.user_summary_by_file_io",
        &["user,l", "ios,r", "io_latency,r"],
    ),
    toggle(
        "user_summary_by_stages",
        "user_summary_by_stages",
        true,
        Any,
        "SELECT user, event_name, total, total_latency, avg_latency FROM sys.user_summary_by_stages",
        &["user,l", "event_name,l", "total,r", "total_latency,r", "avg_latency,r"],
    ),
    toggle(
        "user_summary_by_statement_latency",
        "user_summary_by_statement_latency",
        true,
        Any,
        "SELECT user, total, total_latency, max_latency, lock_latency, rows_sent, rows_examined, \
         rows_affected, full_scans FROM sys.user_summary_by_statement_latency",
        &[
            "user,l",
            "total,r",
            "total_latency,r",
            "max_latency,r",
            "lock_latency,r",
            "rows_sent,r",
            "rows_examined,r",
            "rows_affected,r",
            "full_scans,r",
        ],
    ),
    toggle(
        "user_summary_by_statement_type",
        "user_summary_by_statement_type",
        true,
        Any,
        "SELECT user, statement, total, total_latency, max_latency, lock_latency, rows_sent, \
         rows_examined, rows_affected, full_scans FROM sys.user_summary_by_statement_type",
        &[
            "user,l",
            "statement,l",
            "total,r",
            "total_latency,r",
            "max_latency,r",
            "lock_latency,r",
            "rows_sent,r",
            "rows_examined,r",
            "rows_affected,r",
            "full_scans,r",
        ],
    ),
    toggle(
        "innodb_buffer_stats_by_schema",
        "innodb_buffer_stats_by_schema",
        true,
        Any,
        "SELECT object_schema, allocated, data, pages, pages_hashed, pages_old, rows_cached \
         FROM sys.innodb_buffer_stats_by_schema",
        &[
            "object_schema,l",
            "allocated,r",
            "data,r",
            "pages,r",
            "pages_hashed,r",
            "pages_old,r",
            "rows_cached,r",
        ],
    ),
    toggle(
        "innodb_buffer_stats_by_table",
        "innodb_buffer_stats_by_table",
        true,
        Any,
        "SELECT object_schema, object_name, allocated, data, pages, pages_hashed, pages_old, \
         rows_cached FROM sys.innodb_buffer_stats_by_table",
        &[
            "object_schema,l",
            "object_name,l",
            "allocated,r",
            "data,r",
            "pages,r",
            "pages_hashed,r",
            "pages_old,r",
            "rows_cached,r",
        ],
    ),
    top_n(
        "io_by_thread_by_latency_topN",
        "io_by_thread_by_latency top",
        "SELECT user, total, total_latency, min_latency, avg_latency, max_latency, thread_id, \
         processlist_id FROM sys.io_by_thread_by_latency LIMIT {limit}",
        &[
            "user,l",
            "total,r",
            "total_latency,r",
            "min_latency,r",
            "avg_latency,r",
            "max_latency,r",
            "thread_id,r",
            "processlist_id,r",
        ],
    ),
    top_n(
        "io_global_by_file_by_bytes_topN",
        "io_global_by_file_by_bytes top",
        "SELECT file, count_read, total_read, avg_read, count_write, total_written, avg_write, \
         total, write_pct FROM sys.io_global_by_file_by_bytes LIMIT {limit}",
        &[
            "file,l",
            "count_read,r",
            "total_read,r",
            "avg_read,r",
            "count_write,r",
            "total_written,r",
            "avg_write,r",
            "total,r",
            "write_pct,r",
        ],
    ),
    top_n(
        "io_global_by_file_by_latency_topN",
        "io_global_by_file_by_latency top",
        "SELECT file, total, total_latency, count_read, read_latency, count_write, write_latency, \
         count_misc, misc_latency FROM sys.io_global_by_file_by_latency LIMIT {limit}",
        &[
            "file,l",
            "total,r",
            "total_latency,r",
            "count_read,r",
            "read_latency,r",
            "count_write,r",
            "write_latency,r",
            "count_misc,r",
            "misc_latency,r",
        ],
    ),
    top_n(
        "io_global_by_wait_by_bytes_topN",
        "io_global_by_wait_by_bytes top",
        "SELECT event_name, total, total_latency, min_latency, avg_latency, max_latency, \
         count_read, total_read, avg_read, count_write, total_written, avg_written, \
         total_requested FROM sys.io_global_by_wait_by_bytes LIMIT {limit}",
        &[
            "event_name,l",
            "total,r",
            "total_latency,r",
            "min_latency,r",
            "avg_latency,r",
            "max_latency,r",
            "count_read,r",
            "total_read,r",
            "avg_read,r",
            "count_write,r",
            "total_written,r",
            "avg_written,r",
            "total_requested,r",
        ],
    ),
    top_n(
        "io_global_by_wait_by_latency_topN",
        "io_global_by_wait_by_latency top",
        "SELECT event_name, total, total_latency, avg_latency, max_latency, read_latency, \
         write_latency, misc_latency, count_read, total_read, avg_read, count_write, \
         total_written, avg_written FROM sys.io_global_by_wait_by_latency LIMIT {limit}",
        &[
            "event_name,l",
            "total,r",
            "total_latency,r",
            "avg_latency,r",
            "max_latency,r",
            "read_latency,r",
            "write_latency,r",
            "misc_latency,r",
            "count_read,r",
            "total_read,r",
            "avg_read,r",
            "count_write,r",
            "total_written,r",
            "avg_written,r",
        ],
    ),
    toggle(
        "wait_classes_global_by_avg_latency",
        "wait_classes_global_by_avg_latency",
        true,
        Any,
        "SELECT event_class, total, total_latency, min_latency, avg_latency, max_latency \
         FROM sys.wait_classes_global_by_avg_latency",
        &[
            "event_class,l",
            "total,r",
            "total_latency,r",
            "min_latency,r",
            "avg_latency,r",
            "max_latency,r",
        ],
    ),
    toggle(
        "wait_classes_global_by_latency",
        "wait_classes_global_by_latency",
        true,
        Any,
        "SELECT event_class, total, total_latency, min_latency, avg_latency, max_latency \
         FROM sys.wait_classes_global_by_latency",
        &[
            "event_class,l",
            "total,r",
            "total_latency,r",
            "min_latency,r",
            "avg_latency,r",
            "max_latency,r",
        ],
    ),
    toggle(
        "waits_by_host_by_latency",
        "waits_by_host_by_latency",
        true,
        Any,
        "SELECT host, event, total, total_latency, avg_latency, max_latency \
         FROM sys.waits_by_host_by_latency",
        &["host,l", "event,l", "total,r", "total_latency,r", "avg_latency,r", "max_latency,r"],
    ),
    toggle(
        "waits_by_user_by_latency",
        "waits_by_user_by_latency",
        true,
        Any,
        "SELECT user, event, total, total_latency, avg_latency, max_latency \
         FROM sys.waits_by_user_by_latency",
        &["user,l", "event,l", "total,r", "total_latency,r", "avg_latency,r", "max_latency,r"],
    ),
    toggle(
        "waits_global_by_latency",
        "waits_global_by_latency",
        true,
        Any,
        "SELECT events, total, total_latency, avg_latency, max_latency FROM sys.waits_global_by_latency",
        &["event,l", "total,r", "total_latency,r", "avg_latency,r", "max_latency,r"],
    ),
    toggle(
        "schema_table_lock_waits",
        "schema_table_lock_waits",
        true,
        Excludes("5.6"),
        "SELECT object_schema, object_name, waiting_account, waiting_lock_type, \
         waiting_lock_duration, waiting_query, waiting_query_secs, waiting_query_rows_affected, \
         waiting_query_rows_examined, blocking_account, blocking_lock_type, blocking_lock_duration \
         FROM sys.schema_table_lock_waits",
        &[
            "object_schema,l",
            "object_name,r",
            "wait_account,r",
            "wt_lk_tp,l",
            "w_l_dur,l",
            "waiting_query,l",
            "w_qry_s,l",
            "w_q_r_a,l",
            "w_q_r_e,l",
            "blk_account,l",
            "bk_lk_tp,l",
            "b_l_dur,l",
        ],
    ),
    toggle(
        "innodb_lock_waits",
        "innodb_lock_waits",
        true,
        Any,
        "SELECT wait_started, wait_age, locked_table, locked_index, locked_type, waiting_query, \
         waiting_lock_mode, blocking_query, blocking_lock_mode FROM sys.innodb_lock_waits",
        &[
            "wait_start,l",
            "wait_age,r",
            "locked_table,r",
            "locked_index,l",
            "locked_type,l",
            "waiting_query,l",
            "wt_lk_md,l",
            "blocking_query,l",
            "bk_lk_md,l",
        ],
    ),
    toggle(
        "memory_by_host_by_current_bytes",
        "memory_by_host_by_current_bytes",
        true,
        Excludes("5.6"),
        "SELECT host, current_count_used, current_allocated, current_avg_alloc, current_max_alloc, \
         total_allocated FROM sys.memory_by_host_by_current_bytes",
        &[
            "HOST,l",
            "crt_count_used,r",
            "crt_allocatedc,r",
            "crt_avg_alloc,r",
            "crt_max_alloc,r",
            "tal_alloc,r",
        ],
    ),
    toggle(
        "memory_by_thread_by_current_bytes",
        "memory_by_thread_by_current_bytes",
        true,
        Excludes("5.6"),
        "SELECT thread_id, user, current_count_used, current_allocated, current_avg_alloc, \
         current_max_alloc, total_allocated FROM sys.memory_by_thread_by_current_bytes \
         ORDER BY thread_id",
        &[
            "thread_id,r",
            "USER,l",
            "crt_count_used,r",
            "crt_allocatedc,r",
            "crt_avg_alloc,r",
            "crt_max_alloc,r",
            "tal_alloc,r",
        ],
    ),
    toggle(
        "memory_by_user_by_current_bytes",
        "memory_by_user_by_current_bytes",
        true,
        Excludes("5.6"),
        "SELECT user, current_count_used, current_allocated, current_avg_alloc, current_max_alloc, \
         total_allocated FROM sys.memory_by_user_by_current_bytes",
        &[
            "USER,l",
            "crt_count_used,r",
            "crt_alloc,r",
            "crt_avg_alloc,r",
            "crt_max_alloc,r",
            "tal_alloc,r",
        ],
    ),
    toggle(
        "memory_global_by_current_bytes",
        "memory_global_by_current_bytes",
        true,
        Excludes("5.6"),
        "SELECT event_name, current_count, current_alloc, current_avg_alloc, high_count, \
         high_alloc, high_avg_alloc FROM sys.memory_global_by_current_bytes \
         ORDER BY current_alloc DESC",
        &[
            "event_name,l",
            "crt_count,r",
            "crt_alloc,r",
            "crt_avg_alloc,r",
            "high_count,r",
            "high_alloc,r",
            "high_avg_alloc,r",
        ],
    ),
    toggle(
        "memory_global_total",
        "memory_global_total",
        true,
        Excludes("5.6"),
        "SELECT total_allocated FROM sys.memory_global_total",
        &["total_allocated,r"],
    ),
    toggle(
        "processlist",
        "processlist",
        true,
        Any,
        "SELECT thd_id, user, command, time, current_statement, statement_latency, full_scan, \
         last_statement, last_statement_latency FROM sys.processlist WHERE db = '{db}'",
        &[
            "thd_id,r",
            "USER,l",
            "command,r",
            "TIME,r",
            "current_sql,r",
            "sql_ltc,r",
            "fscan,r",
            "last_sql,r",
            "lsql_ltc,r",
        ],
    ),
    toggle(
        "session",
        "session",
        true,
        Any,
        "SELECT thd_id, user, command, time, current_statement, statement_latency, lock_latency, \
         full_scan, last_statement, last_statement_latency FROM sys.session WHERE db = '{db}'",
        &[
            "thd_id,r",
            "USER,l",
            "command,r",
            "TIME,r",
            "current_sql,r",
            "sql_ltc,r",
            "lock_ltc,r",
            "fscan,r",
            "last_sql,r",
            "lsql_ltc,r",
        ],
    ),
    toggle(
        "metrics",
        "metrics",
        true,
        Any,
        "SELECT variable_name, variable_value, type, enabled FROM sys.metrics \
         WHERE variable_name != 'rsa_public_key' AND variable_name != 'ssl_cipher_list' \
         AND enabled = 'YES'",
        &["Variable_name,l", "Variable_value,r", "TYPE,l", "Enabled,r"],
    ),
];

/// Catalog entries for `key`, in catalog order.
pub fn specs_for(key: &str) -> impl Iterator<Item = &'static PassthroughSpec> + '_ {
    CATALOG.iter().filter(move |spec| spec.key == key)
}

/// Distinct catalog keys, in catalog order.
pub fn catalog_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Vec::new();
    for spec in CATALOG {
        if !keys.contains(&spec.key) {
            keys.push(spec.key);
        }
    }
    keys
}
