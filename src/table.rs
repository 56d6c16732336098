//! Table model shared by every report section.
//!
//! A section is a title, an ordered list of column styles and a set of rows.
//! Rows hold typed [`Cell`]s; formatting decisions are made once when the
//! cell is produced and the renderers only ever call `Display`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// One value in a report row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Percentage(f64),
    Null,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Whether the cell holds a number (used to pick a default alignment).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Float(_) | Cell::Percentage(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Float(v) => f.write_str(&format_rounded(*v)),
            Cell::Percentage(v) => write!(f, "{:.2}%", v),
            Cell::Null => f.write_str("NULL"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

/// Rounds to two decimal places and prints the shortest form that keeps at
/// least one decimal digit: `10.0`, `0.3`, `12.35`.
pub fn format_rounded(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0.0" after rounding tiny negatives.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Horizontal justification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "l" | "left" => Some(Alignment::Left),
            "r" | "right" => Some(Alignment::Right),
            "c" | "center" => Some(Alignment::Center),
            _ => None,
        }
    }

    /// Pads `text` to `width` characters according to this alignment.
    pub fn pad(&self, text: &str, width: usize) -> String {
        let len = text.chars().count();
        if len >= width {
            return text.to_string();
        }
        let fill = width - len;
        match self {
            Alignment::Left => format!("{}{}", text, " ".repeat(fill)),
            Alignment::Right => format!("{}{}", " ".repeat(fill), text),
            Alignment::Center => {
                let left = fill / 2;
                format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
            }
        }
    }
}

/// Display label, optional fixed width and justification for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStyle {
    pub label: String,
    pub width: Option<usize>,
    pub alignment: Alignment,
}

impl ColumnStyle {
    pub fn new(label: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            label: label.into(),
            width: None,
            alignment,
        }
    }

    pub fn left(label: impl Into<String>) -> Self {
        Self::new(label, Alignment::Left)
    }

    pub fn right(label: impl Into<String>) -> Self {
        Self::new(label, Alignment::Right)
    }

    pub fn center(label: impl Into<String>) -> Self {
        Self::new(label, Alignment::Center)
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// Parses the compact `"label,align"` / `"label,width,align"` form used in
/// configuration files. The label itself may not contain a comma.
impl FromStr for ColumnStyle {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        let invalid = || ReportError::InvalidStyle(s.to_string());

        match parts.as_slice() {
            [label, align] => {
                let alignment = Alignment::from_code(align).ok_or_else(invalid)?;
                Ok(ColumnStyle::new(label.trim(), alignment))
            }
            [label, width, align] => {
                let alignment = Alignment::from_code(align).ok_or_else(invalid)?;
                let width: usize = width.trim().parse().map_err(|_| invalid())?;
                Ok(ColumnStyle::new(label.trim(), alignment).with_width(width))
            }
            _ => Err(invalid()),
        }
    }
}

/// Ordered column styles of a section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnStyles(Vec<ColumnStyle>);

impl ColumnStyles {
    pub fn new(styles: Vec<ColumnStyle>) -> Self {
        Self(styles)
    }

    /// Builds styles from 1-based positions. Positions must be exactly
    /// `1..=n` with no gaps.
    pub fn from_indexed(indexed: BTreeMap<usize, ColumnStyle>) -> Result<Self, ReportError> {
        let mut styles = Vec::with_capacity(indexed.len());
        for (expected, (position, style)) in (1..).zip(indexed) {
            if position != expected {
                return Err(ReportError::InvalidStyleIndex(expected));
            }
            styles.push(style);
        }
        Ok(Self(styles))
    }

    /// Parses a list of compact style strings, in column order.
    pub fn parse_all<S: AsRef<str>>(specs: &[S]) -> Result<Self, ReportError> {
        specs
            .iter()
            .map(|s| s.as_ref().parse::<ColumnStyle>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnStyle> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ColumnStyles {
    type Item = &'a ColumnStyle;
    type IntoIter = std::slice::Iter<'a, ColumnStyle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One row of a report table.
pub type ReportRow = Vec<Cell>;

/// A titled table ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub styles: ColumnStyles,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, styles: ColumnStyles) -> Self {
        Self {
            title: title.into(),
            styles,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<ReportRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    /// Checks that every row has exactly one value per declared column.
    pub fn validate(&self) -> Result<(), ReportError> {
        let style_arity = self.styles.len();
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != style_arity {
                return Err(ReportError::StyleArityMismatch {
                    title: self.title.clone(),
                    row: idx + 1,
                    row_arity: row.len(),
                    style_arity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rounded() {
        assert_eq!(format_rounded(10.0), "10.0");
        assert_eq!(format_rounded(0.3), "0.3");
        assert_eq!(format_rounded(12.345_6), "12.35");
        assert_eq!(format_rounded(1.0 / 3.0), "0.33");
        assert_eq!(format_rounded(0.0), "0.0");
        assert_eq!(format_rounded(-0.001), "0.0");
        assert_eq!(format_rounded(-2.5), "-2.5");
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::text("abc").to_string(), "abc");
        assert_eq!(Cell::Integer(-3).to_string(), "-3");
        assert_eq!(Cell::Float(2.0).to_string(), "2.0");
        assert_eq!(Cell::Percentage(99.5).to_string(), "99.50%");
        assert_eq!(Cell::Null.to_string(), "NULL");
        assert!(Cell::Integer(1).is_numeric());
        assert!(!Cell::Null.is_numeric());
    }

    #[test]
    fn test_alignment_pad() {
        assert_eq!(Alignment::Left.pad("ab", 5), "ab   ");
        assert_eq!(Alignment::Right.pad("ab", 5), "   ab");
        assert_eq!(Alignment::Center.pad("ab", 5), " ab  ");
        assert_eq!(Alignment::Left.pad("toolong", 3), "toolong");
    }

    #[test]
    fn test_parse_style_two_parts() {
        let style: ColumnStyle = "parameter_name,l".parse().unwrap();
        assert_eq!(style.label, "parameter_name");
        assert_eq!(style.width, None);
        assert_eq!(style.alignment, Alignment::Left);
    }

    #[test]
    fn test_parse_style_with_width() {
        let style: ColumnStyle = "last_seen,19,r".parse().unwrap();
        assert_eq!(style.label, "last_seen");
        assert_eq!(style.width, Some(19));
        assert_eq!(style.alignment, Alignment::Right);
    }

    #[test]
    fn test_parse_style_invalid() {
        assert!("label".parse::<ColumnStyle>().is_err());
        assert!("label,x".parse::<ColumnStyle>().is_err());
        assert!("label,abc,r".parse::<ColumnStyle>().is_err());
        assert!("a,1,r,extra".parse::<ColumnStyle>().is_err());
    }

    #[test]
    fn test_from_indexed_requires_contiguous_positions() {
        let mut ok = BTreeMap::new();
        ok.insert(1, ColumnStyle::left("a"));
        ok.insert(2, ColumnStyle::right("b"));
        assert_eq!(ColumnStyles::from_indexed(ok).unwrap().len(), 2);

        let mut gap = BTreeMap::new();
        gap.insert(1, ColumnStyle::left("a"));
        gap.insert(3, ColumnStyle::right("c"));
        assert!(matches!(
            ColumnStyles::from_indexed(gap),
            Err(ReportError::InvalidStyleIndex(2))
        ));

        let mut zero_based = BTreeMap::new();
        zero_based.insert(0, ColumnStyle::left("a"));
        assert!(matches!(
            ColumnStyles::from_indexed(zero_based),
            Err(ReportError::InvalidStyleIndex(1))
        ));
    }

    #[test]
    fn test_validate_arity() {
        let styles = ColumnStyles::parse_all(&["a,l", "b,r", "c,r"]).unwrap();
        let ok = ReportSection::new("t", styles.clone())
            .with_rows(vec![vec![Cell::Null, Cell::Integer(1), Cell::Integer(2)]]);
        assert!(ok.validate().is_ok());

        let bad = ReportSection::new("t", styles).with_rows(vec![vec![
            Cell::Null,
            Cell::Integer(1),
            Cell::Integer(2),
            Cell::Integer(3),
        ]]);
        match bad.validate() {
            Err(ReportError::StyleArityMismatch {
                row_arity,
                style_arity,
                ..
            }) => {
                assert_eq!(row_arity, 4);
                assert_eq!(style_arity, 3);
            }
            other => panic!("expected arity mismatch, got {:?}", other),
        }
    }
}
