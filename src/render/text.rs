//! Plain-text renderer: `=` title rule and a bordered, aligned table.

use std::io::Write;

use super::{ReportHeader, TableRenderer};
use crate::error::ReportError;
use crate::table::{Alignment, ReportSection};

/// Width of title rules and the banner.
pub const LINE_SIZE: usize = 104;

const END_MARKER: &str = "--@--  End  --@--";

#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

/// `==== title =====` padded to [`LINE_SIZE`], surrounded by blank lines.
fn title_rule(title: &str) -> String {
    let half = (LINE_SIZE - 4) / 2;
    let len = title.chars().count() / 2;
    format!(
        "\n{} {} {}\n",
        "=".repeat(half.saturating_sub(len)),
        title,
        "=".repeat((half + 1).saturating_sub(len))
    )
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

fn table_line(cells: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let mut line = String::from("|");
    for ((cell, width), align) in cells.iter().zip(widths).zip(alignments) {
        line.push(' ');
        line.push_str(&align.pad(cell, *width));
        line.push_str(" |");
    }
    line
}

/// Cells are printed on one line; embedded line breaks become spaces.
fn flatten(value: String) -> String {
    if value.contains(['\n', '\r']) {
        value.replace("\r\n", " ").replace(['\n', '\r'], " ")
    } else {
        value
    }
}

impl TableRenderer for TextRenderer {
    fn begin_report(&self, header: &ReportHeader, out: &mut dyn Write) -> Result<(), ReportError> {
        let stars = "*".repeat(LINE_SIZE);
        writeln!(out, "{}", stars)?;
        for line in header.banner_lines() {
            writeln!(out, "* {} *", Alignment::Center.pad(&line, LINE_SIZE - 4))?;
        }
        writeln!(out, "{}", stars)?;
        Ok(())
    }

    fn write_section(&self, section: &ReportSection, out: &mut dyn Write) -> Result<(), ReportError> {
        let labels: Vec<String> = section.styles.iter().map(|s| s.label.clone()).collect();
        let rows: Vec<Vec<String>> = section
            .rows
            .iter()
            .map(|row| row.iter().map(|c| flatten(c.to_string())).collect())
            .collect();

        // Explicit widths are minimums; content is never truncated.
        let widths: Vec<usize> = section
            .styles
            .iter()
            .enumerate()
            .map(|(idx, style)| {
                let content = rows
                    .iter()
                    .map(|r| r.get(idx).map_or(0, |c| c.chars().count()))
                    .chain(std::iter::once(style.label.chars().count()))
                    .max()
                    .unwrap_or(0);
                content.max(style.width.unwrap_or(0))
            })
            .collect();
        let header_align = vec![Alignment::Center; labels.len()];
        let alignments: Vec<Alignment> = section.styles.iter().map(|s| s.alignment).collect();

        write!(out, "{}", title_rule(&section.title))?;
        let rule = border(&widths);
        writeln!(out, "{}", rule)?;
        writeln!(out, "{}", table_line(&labels, &widths, &header_align))?;
        writeln!(out, "{}", rule)?;
        for row in &rows {
            writeln!(out, "{}", table_line(row, &widths, &alignments))?;
        }
        if !rows.is_empty() {
            writeln!(out, "{}", rule)?;
        }
        Ok(())
    }

    fn end_report(&self, out: &mut dyn Write) -> Result<(), ReportError> {
        write!(out, "{}", title_rule(END_MARKER))?;
        out.flush()?;
        Ok(())
    }
}
