//! Integration tests for report assembly.
//!
//! A scripted in-memory session stands in for MySQL and a fixed host
//! inspector stands in for /proc, so every gate and failure path can be
//! driven deterministically.

use std::collections::BTreeMap;

use herakles_mysql_watcher::{
    generate_report, Cell, ColumnStyles, CustomSection, HostInspector, OutputFormat, ReportError,
    ReportOptions, ReportSection, SectionToggle, Session,
};

/// Answers queries from a small script and records every query it saw.
struct FakeSession {
    version: &'static str,
    sys_schema: bool,
    status_calls: usize,
    queries: Vec<String>,
    /// Substring -> error returned for matching queries.
    failures: Vec<(&'static str, fn() -> sqlx::Error)>,
}

impl FakeSession {
    fn new(version: &'static str, sys_schema: bool) -> Self {
        Self {
            version,
            sys_schema,
            status_calls: 0,
            queries: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn failing_on(mut self, needle: &'static str, err: fn() -> sqlx::Error) -> Self {
        self.failures.push((needle, err));
        self
    }

    fn saw(&self, needle: &str) -> bool {
        self.queries.iter().any(|q| q.contains(needle))
    }
}

fn row(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::text(*v)).collect()
}

impl Session for FakeSession {
    async fn execute(&mut self, query: &str) -> Result<Vec<Vec<Cell>>, ReportError> {
        self.queries.push(query.to_string());

        if let Some((_, err)) = self.failures.iter().find(|(n, _)| query.contains(n)) {
            return Err(err().into());
        }

        if query == "SELECT @@version" {
            return Ok(vec![row(&[self.version])]);
        }
        if query == "SHOW DATABASES" {
            let mut dbs = vec![row(&["information_schema"]), row(&["mysql"])];
            if self.sys_schema {
                dbs.push(row(&["sys"]));
            }
            return Ok(dbs);
        }
        if query == "SHOW GLOBAL STATUS" {
            self.status_calls += 1;
            let questions = if self.status_calls == 1 { "100" } else { "110" };
            return Ok(vec![
                row(&["Uptime", "5000"]),
                row(&["Questions", questions]),
                row(&["Threads_connected", "4"]),
            ]);
        }
        if query.contains("'optimizer_switch'") {
            return Ok(vec![row(&["index_merge=on,mrr=off"])]);
        }
        if query.contains("'log_error'") {
            return Ok(vec![row(&["/nonexistent/mysqld.err"])]);
        }
        if query.contains("variable_name IN") {
            return Ok(vec![
                row(&["innodb_buffer_pool_size", "134217728"]),
                row(&["max_connections", "151"]),
            ]);
        }
        if query.contains("statements_with_runtimes_in_95th_percentile") {
            return Ok(vec![row(&["SELECT * FROM t", "shop", "3", "1 s", "800 ms", "333 ms"])]);
        }
        Ok(Vec::new())
    }
}

/// Host inspector with canned sections; `broken` makes every probe fail.
struct FakeHost {
    broken: bool,
}

impl FakeHost {
    fn section(&self, title: &str) -> Result<ReportSection, String> {
        if self.broken {
            return Err(format!("{} unavailable", title));
        }
        let styles = ColumnStyles::parse_all(&["Item,l", "Value,l"]).map_err(|e| e.to_string())?;
        Ok(ReportSection::new(title, styles).with_rows(vec![row(&["Kernel", "Linux 6.1.0"])]))
    }
}

impl HostInspector for FakeHost {
    fn linux_info(&self) -> Result<ReportSection, String> {
        self.section("Linux info")
    }

    fn filesystem_info(&self) -> Result<ReportSection, String> {
        self.section("Filesystem info")
    }

    fn linux_overview(&self) -> Result<ReportSection, String> {
        self.section("Linux Overview")
    }

    fn memory_top(&self, n: usize) -> Result<ReportSection, String> {
        self.section(&format!("Host memory top{}", n))
    }
}

fn options(format: OutputFormat) -> ReportOptions {
    ReportOptions {
        host: "db01".into(),
        user: "monitor".into(),
        database: "shop".into(),
        interval_seconds: 0,
        format,
        sections: BTreeMap::new(),
        custom_sections: Vec::new(),
        overview_key_buffer: false,
    }
}

async fn run(
    session: &mut FakeSession,
    host: &FakeHost,
    options: &ReportOptions,
) -> (Result<herakles_mysql_watcher::ReportSummary, ReportError>, String) {
    let mut out = Vec::new();
    let result = generate_report(session, host, options, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_full_text_report() {
    let mut session = FakeSession::new("8.0.36", true);
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;
    let summary = result.unwrap();

    assert!(text.starts_with(&"*".repeat(104)));
    for title in [
        " Basic Information ",
        " Linux info ",
        " Host memory top10 ",
        " MySQL Overview ",
        " System Parameter ",
        " Optimizer Switch ",
        " Log file Statistics ",
        " Slow Query Top10 ",
        " metrics ",
    ] {
        assert!(text.contains(title), "missing section{}", title);
    }
    assert!(text.contains("| db01 | monitor | shop |"));
    assert!(text.contains("In 0s"));
    assert!(text.contains("| innodb_buffer_pool_size |"));
    assert!(text.contains("128M"));
    assert!(text.contains("/nonexistent/mysqld.err not exists"));
    assert!(text
        .trim_end()
        .ends_with(&format!("--@--  End  --@-- {}", "=".repeat(43))));

    // Sections appear in assembly order.
    let pos = |needle: &str| text.find(needle).unwrap();
    assert!(pos(" Linux info ") < pos(" MySQL Overview "));
    assert!(pos(" MySQL Overview ") < pos(" System Parameter "));
    assert!(pos(" Log file Statistics ") < pos(" Replication "));

    assert_eq!(summary.skipped, 0);
    assert_eq!(session.status_calls, 2);
}

#[tokio::test]
async fn test_html_report_frame() {
    let mut session = FakeSession::new("8.0.36", true);
    let (result, html) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Html)).await;
    result.unwrap();

    assert!(html.starts_with("<html><head><title>"));
    assert!(html.contains(r#"<a class="awr" name="mysql_overview"></a>MySQL Overview</h3>"#));
    assert!(html.trim_end().ends_with("End of Report\n</body></html>"));
}

#[tokio::test]
async fn test_toggles_and_top_n_limits() {
    let mut session = FakeSession::new("8.0.36", true);
    let mut opts = options(OutputFormat::Txt);
    opts.sections.insert("linux_info".into(), SectionToggle::Off);
    opts.sections.insert("mysql_overview".into(), SectionToggle::Off);
    opts.sections.insert("slow_query_topN".into(), SectionToggle::TopN(5));
    opts.sections.insert("host_memory_topN".into(), SectionToggle::TopN(3));
    opts.sections.insert("metrics".into(), SectionToggle::Off);

    let (result, text) = run(&mut session, &FakeHost { broken: false }, &opts).await;
    result.unwrap();

    assert!(!text.contains(" Linux info "));
    assert!(!text.contains(" MySQL Overview "));
    assert!(text.contains(" Slow Query Top5 "));
    assert!(text.contains(" Host memory top3 "));
    assert!(session.saw("statements_with_runtimes_in_95th_percentile LIMIT 5"));
    assert!(!session.saw("sys.metrics"));
    assert_eq!(session.status_calls, 0);
}

#[tokio::test]
async fn test_missing_sys_schema_skips_sys_sections() {
    let mut session = FakeSession::new("8.0.36", false);
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;
    result.unwrap();

    assert!(!session.saw("FROM sys."));
    assert!(text.contains(" Database Size "));
    assert!(!text.contains(" Slow Query Top"));
}

#[tokio::test]
async fn test_version_gates_on_5_6() {
    let mut session = FakeSession::new("5.6.51-log", true);
    let (result, _) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;
    result.unwrap();

    assert!(session.saw("FROM information_schema.global_variables"));
    assert!(!session.saw("FROM performance_schema.global_variables"));
    assert!(!session.saw("events_statements_summary_by_digest"));
    assert!(!session.saw("memory_global_total"));
    let host_summary: Vec<&String> = session
        .queries
        .iter()
        .filter(|q| q.ends_with("FROM sys.host_summary"))
        .collect();
    assert_eq!(host_summary.len(), 1);
    assert!(!host_summary[0].contains("current_memory"));
}

#[tokio::test]
async fn test_err_sql_count_only_on_5_7() {
    let mut session = FakeSession::new("5.7.44", true);
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;
    result.unwrap();
    assert!(text.contains(" Err Sql Count "));
    assert!(text.contains(" Avg Query Time "));

    let mut session = FakeSession::new("8.0.36", true);
    let (_, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;
    assert!(!text.contains(" Err Sql Count "));
}

#[tokio::test]
async fn test_query_error_skips_only_that_section() {
    let mut session = FakeSession::new("8.0.36", true)
        .failing_on("sys.innodb_lock_waits", || sqlx::Error::RowNotFound);
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;
    let summary = result.unwrap();

    assert_eq!(summary.skipped, 1);
    assert!(!text.contains(" innodb_lock_waits "));
    assert!(text.contains(" metrics "));
    assert!(text.contains("--@--  End  --@--"));
}

#[tokio::test]
async fn test_connectivity_loss_aborts() {
    let mut session = FakeSession::new("8.0.36", true)
        .failing_on("information_schema.processlist", || sqlx::Error::PoolTimedOut);
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, ReportError::Connectivity(_)));
    assert!(!text.contains("--@--  End  --@--"));
    assert!(!session.saw("sys.metrics"));
}

#[tokio::test]
async fn test_denied_status_query_aborts() {
    let mut session = FakeSession::new("8.0.36", true)
        .failing_on("SHOW GLOBAL STATUS", || sqlx::Error::RowNotFound);
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &options(OutputFormat::Txt)).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ReportError::Connectivity(_)));
    assert!(!text.contains(" MySQL Overview "));
    assert!(!text.contains("--@--  End  --@--"));
}

#[tokio::test]
async fn test_host_failures_are_skipped() {
    let mut session = FakeSession::new("8.0.36", true);
    let (result, text) = run(&mut session, &FakeHost { broken: true }, &options(OutputFormat::Txt)).await;
    let summary = result.unwrap();

    assert_eq!(summary.skipped, 4);
    assert!(!text.contains(" Linux info "));
    assert!(text.contains(" MySQL Overview "));
}

#[tokio::test]
async fn test_overview_values_in_report() {
    let mut session = FakeSession::new("8.0.36", true);
    let mut opts = options(OutputFormat::Txt);
    opts.interval_seconds = 0;
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &opts).await;
    result.unwrap();

    // Zero interval collapses rates; totals use the second snapshot's uptime.
    let qps = text.lines().find(|l| l.contains("QPS")).unwrap();
    assert!(qps.contains("0.0"));
    assert!(qps.contains("0.02"));
    let uptime = text.lines().find(|l| l.contains("Uptimes")).unwrap();
    assert!(uptime.contains("1h23m20s"));
    let tps = text.lines().find(|l| l.contains("TPS")).unwrap();
    assert!(tps.contains("N/A"));
}

#[tokio::test]
async fn test_custom_sections() {
    let mut session = FakeSession::new("8.0.36", true);
    let mut opts = options(OutputFormat::Txt);
    opts.custom_sections.push(CustomSection {
        title: "Slow Query Digest".into(),
        query: "SELECT * FROM sys.statements_with_runtimes_in_95th_percentile".into(),
        styles: vec![
            "query,l".into(),
            "db,l".into(),
            "count,r".into(),
            "total,r".into(),
            "max,r".into(),
            "avg,r".into(),
        ],
    });
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &opts).await;
    result.unwrap();
    assert!(text.contains(" Slow Query Digest "));
    assert!(text.find(" Slow Query Digest ").unwrap() > text.find(" metrics ").unwrap());
}

#[tokio::test]
async fn test_custom_section_arity_mismatch_is_fatal() {
    let mut session = FakeSession::new("8.0.36", true);
    let mut opts = options(OutputFormat::Txt);
    opts.custom_sections.push(CustomSection {
        title: "Too Narrow".into(),
        query: "SELECT * FROM sys.statements_with_runtimes_in_95th_percentile".into(),
        styles: vec!["query,l".into(), "db,l".into(), "count,r".into()],
    });
    let (result, text) = run(&mut session, &FakeHost { broken: false }, &opts).await;

    assert!(matches!(
        result,
        Err(ReportError::StyleArityMismatch { row_arity: 6, style_arity: 3, .. })
    ));
    assert!(!text.contains(" Too Narrow "));
}
