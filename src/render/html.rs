//! HTML renderer in the classic AWR report look.

use std::io::Write;

use super::{ReportHeader, TableRenderer};
use crate::error::ReportError;
use crate::table::{Alignment, ReportSection};

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

const STYLESHEET: &str = r#"body.awr {font:bold 10pt Arial,Helvetica,Geneva,sans-serif;color:black; background:White;}
pre.awr  {font:8pt Courier;color:black; background:White;}
h1.awr   {font:bold 20pt Arial,Helvetica,Geneva,sans-serif;color:#336699;background-color:White;border-bottom:1px solid #cccc99;margin-top:0pt; margin-bottom:0pt;padding:0px 0px 0px 0px;}
h3.awr {font:bold 16pt Arial,Helvetica,Geneva,sans-serif;color:#336699;background-color:White;margin-top:4pt; margin-bottom:0pt;}
th.awrbg {font:bold 8pt Arial,Helvetica,Geneva,sans-serif; color:White; background:#0066CC;padding-left:4px; padding-right:4px;padding-bottom:2px}
td.awrnc {font:8pt Arial,Helvetica,Geneva,sans-serif;color:black;background:White;vertical-align:top;}
td.awrc    {font:8pt Arial,Helvetica,Geneva,sans-serif;color:black;background:#FFFFCC; vertical-align:top;}
a.awr {font:bold 8pt Arial,Helvetica,sans-serif;color:#663300; vertical-align:top;margin-top:0pt; margin-bottom:0pt;}"#;

/// Escapes the five HTML special characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Anchor name derived from a section title: `MySQL Overview` -> `mysql_overview`.
fn anchor(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

fn align_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "",
        Alignment::Right => r#" align="right""#,
        Alignment::Center => r#" align="center""#,
    }
}

impl TableRenderer for HtmlRenderer {
    fn begin_report(&self, header: &ReportHeader, out: &mut dyn Write) -> Result<(), ReportError> {
        let title = escape(&format!("{} V{}", header.name, header.version));
        writeln!(
            out,
            r#"<html><head><title>{title}</title>
<style type="text/css">
{STYLESHEET}
</style></head><body class="awr">
<a name="top"></a>
<h1 class="awr">
{title}
</h1>"#
        )?;
        for line in header.banner_lines().iter().skip(1) {
            writeln!(out, "<p>{}</p>", escape(line))?;
        }
        Ok(())
    }

    fn write_section(&self, section: &ReportSection, out: &mut dyn Write) -> Result<(), ReportError> {
        writeln!(
            out,
            r#"<p /><h3 class="awr"><a class="awr" name="{}"></a>{}</h3><p />"#,
            anchor(&section.title),
            escape(&section.title)
        )?;
        writeln!(out, r#"<table border="1">"#)?;

        write!(out, "<tr>")?;
        for style in &section.styles {
            write!(out, r#"<th class="awrbg">{}</th>"#, escape(&style.label))?;
        }
        writeln!(out, "</tr>")?;

        for (idx, row) in section.rows.iter().enumerate() {
            let class = if (idx + 1) % 2 == 0 { "awrc" } else { "awrnc" };
            write!(out, "<tr>")?;
            for (cell, style) in row.iter().zip(&section.styles) {
                write!(
                    out,
                    r#"<td{} class="{}">{}</td>"#,
                    align_attr(style.alignment),
                    class,
                    escape(&cell.to_string())
                )?;
            }
            writeln!(out, "</tr>")?;
        }

        writeln!(out, "</table>")?;
        writeln!(out, r##"<br /><a class="awr" href="#top">Back to Top</a>"##)?;
        writeln!(out, "<p />")?;
        Ok(())
    }

    fn end_report(&self, out: &mut dyn Write) -> Result<(), ReportError> {
        writeln!(out, "<p />\nEnd of Report\n</body></html>")?;
        out.flush()?;
        Ok(())
    }
}
