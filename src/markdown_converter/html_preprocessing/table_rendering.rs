//! HTML table rendering.
//!
//! Tables are the fragment htmd handles worst: cell whitespace collapses,
//! multi-line cells break the pipe grid, and wide tables become unreadable
//! once rendered in a monospace font. Each `<table>` is therefore parsed
//! into a [`Grid`] straight from the markup and rendered here, either as an
//! aligned pipe table or, past [`MAX_TABLE_WIDTH`], as a nested bullet list.

use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

use super::html_cleaning::clean_inline_fragment;
use crate::markdown_converter::placeholder_vault::{FragmentKind, PlaceholderVault};
use crate::utils::constants::{MAX_TABLE_WIDTH, MIN_COLUMN_WIDTH};

static TABLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<table(?:\s[^>]*)?>.*?</table\s*>").expect("TABLE_BLOCK regex is valid")
});

static CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<caption(?:\s[^>]*)?>(.*?)</caption\s*>").expect("CAPTION regex is valid")
});

static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tr(?:\s[^>]*)?>.*?</tr\s*>").expect("ROW regex is valid")
});

static CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<t[hd](?:\s[^>]*)?>.*?</t[hd]\s*>").expect("CELL regex is valid")
});

/// Rectangular cell grid parsed from an HTML table.
///
/// Every row holds exactly `cols` cells; short rows are padded with empty
/// strings. Cell text is stored Markdown-escaped (`|` and `\`), so widths
/// are measured on what is actually written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<String>>,
    cols: usize,
}

impl Grid {
    /// Build a grid from rows of cleaned cell text.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let cells = rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<String> = row.into_iter().map(|cell| escape_cell(&cell)).collect();
                row.resize(cols, String::new());
                row
            })
            .collect();
        Self { cells, cols }
    }

    /// Parse the `<tr>` rows of a table fragment.
    #[must_use]
    pub fn parse(table_html: &str) -> Self {
        let rows = ROW
            .find_iter(table_html)
            .map(|row| {
                CELL.find_iter(row.as_str())
                    .map(|cell| clean_inline_fragment(cell.as_str()))
                    .collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.cells[row][col]
    }

    /// Per-column width: the longest cell, never below [`MIN_COLUMN_WIDTH`].
    #[must_use]
    pub fn column_widths(&self) -> Vec<usize> {
        (0..self.cols)
            .map(|c| {
                self.cells
                    .iter()
                    .map(|row| text_width(&row[c]))
                    .fold(MIN_COLUMN_WIDTH, usize::max)
            })
            .collect()
    }

    #[must_use]
    pub fn total_width(&self) -> usize {
        self.column_widths().iter().sum()
    }

    /// Render as a pipe table with the first row as header.
    #[must_use]
    pub fn to_pipe_table(&self) -> String {
        let widths = self.column_widths();
        let mut output = String::new();

        if self.rows() == 0 || self.cols == 0 {
            return output;
        }

        if self.rows() > 1 {
            self.write_pipe_row(&mut output, 0, &widths);
        }
        output.push('\n');

        output.push('|');
        for width in &widths {
            output.push_str(&"-".repeat(*width));
            output.push('|');
        }
        output.push('\n');

        for r in 1..self.rows() {
            self.write_pipe_row(&mut output, r, &widths);
            output.push('\n');
        }

        output
    }

    fn write_pipe_row(&self, output: &mut String, row: usize, widths: &[usize]) {
        output.push('|');
        for (cell, width) in self.cells[row].iter().zip(widths) {
            output.push_str(&ljust(cell, *width));
            output.push('|');
        }
    }

    /// Render as a nested list, using row 0 and column 0 as labels.
    #[must_use]
    pub fn to_nested_list(&self) -> String {
        let mut output = String::from("\n");

        for r in 1..self.rows() {
            if let Some(line) = labelled(self.cell(0, 0), self.cell(r, 0)) {
                let _ = writeln!(output, "* {line}");
            }
            for c in 1..self.cols {
                if let Some(line) = labelled(self.cell(0, c), self.cell(r, c)) {
                    let _ = writeln!(output, "  * {line}");
                }
            }
        }

        output
    }
}

/// `label: value`, either side dropped when empty, `None` when both are.
fn labelled(label: &str, value: &str) -> Option<String> {
    match (label.is_empty(), value.is_empty()) {
        (true, true) => None,
        (true, false) => Some(value.to_string()),
        (false, true) => Some(format!("{label}: ")),
        (false, false) => Some(format!("{label}: {value}")),
    }
}

/// Escape the characters that would break a pipe row.
fn escape_cell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '|' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Pad `text` with trailing spaces up to `width` characters.
fn ljust(text: &str, width: usize) -> String {
    let len = text_width(text);
    if len >= width {
        return text.to_string();
    }
    let mut padded = String::with_capacity(text.len() + width - len);
    padded.push_str(text);
    padded.extend(std::iter::repeat_n(' ', width - len));
    padded
}

/// Render one `<table>` fragment to Markdown.
///
/// Returns an empty string for tables with fewer than two rows; the caller
/// treats that as nothing to render.
#[must_use]
pub fn render_table(table_html: &str) -> String {
    let grid = Grid::parse(table_html);
    if grid.rows() < 2 {
        tracing::debug!(rows = grid.rows(), "Skipping table with fewer than 2 rows");
        return String::new();
    }

    let mut output = String::from("\n");

    if let Some(caps) = CAPTION.captures(table_html) {
        let caption = clean_inline_fragment(&caps[1]);
        let _ = write!(output, "{caption}\n\n");
    }

    let total_width = grid.total_width();
    if total_width < MAX_TABLE_WIDTH {
        output.push_str(&grid.to_pipe_table());
    } else {
        tracing::debug!(
            total_width,
            limit = MAX_TABLE_WIDTH,
            "Rendering wide table as nested list"
        );
        output.push_str(&grid.to_nested_list());
    }

    output
}

/// Replace every `<table>` in `html` by a placeholder.
///
/// The rendered Markdown (possibly empty) is recorded in `vault`. Nested
/// tables end at the first closing tag; the result is best effort.
pub fn protect_tables(html: &str, vault: &mut PlaceholderVault) -> String {
    TABLE_BLOCK
        .replace_all(html, |caps: &regex::Captures| {
            let markdown = render_table(&caps[0]);
            vault.shield(FragmentKind::Table, markdown)
        })
        .into_owned()
}
