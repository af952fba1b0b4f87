use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: String,
    data: Vec<String>,
    align: Align,
}

// A closed group: columns from some range have been finalized under this name.
struct Group {
    name: Option<String>,
    count: usize,
}

/// A builder for aligned tabular output with optional column grouping.
///
/// Columns are added with `column()` (right-aligned, for numbers) or `text_column()`
/// (left-aligned, for names and descriptions), optionally organized under named groups using
/// `group()`. `render()` produces the formatted table; `print()` writes it to stdout.
#[derive(Default)]
pub struct Table {
    columns: Vec<Column>,
    groups: Vec<Group>,
    // Tracks the in-progress group: columns from current_group_start onwards
    // belong to current_group_name (which may be None for ungrouped columns).
    current_group_start: usize,
    current_group_name: Option<String>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, header: impl Into<String>, data: Vec<String>, align: Align) -> Self {
        self.columns.push(Column {
            header: header.into(),
            data,
            align,
        });
        self
    }

    /// Add a right-aligned column with the given header and data rows.
    pub fn column(self, header: impl Into<String>, data: Vec<String>) -> Self {
        self.push(header, data, Align::Right)
    }

    /// Add a left-aligned column with the given header and data rows.
    pub fn text_column(self, header: impl Into<String>, data: Vec<String>) -> Self {
        self.push(header, data, Align::Left)
    }

    /// Start a new named group. Subsequent columns belong to this group until
    /// another `group()` call or the end of the table.
    pub fn group(mut self, name: impl Into<String>) -> Self {
        // Close the current group
        let count = self.columns.len() - self.current_group_start;
        if count > 0 {
            self.groups.push(Group {
                name: self.current_group_name.take(),
                count,
            });
        }
        self.current_group_start = self.columns.len();
        self.current_group_name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over all groups, including any trailing unclosed group.
    fn all_groups(&self) -> impl Iterator<Item = (Option<&str>, usize)> {
        let trailing_count = self.columns.len() - self.current_group_start;
        self.groups
            .iter()
            .map(|g| (g.name.as_deref(), g.count))
            .chain(
                (trailing_count > 0)
                    .then_some((self.current_group_name.as_deref(), trailing_count)),
            )
    }

    /// Format the table with aligned columns, one line per row.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.columns.is_empty() {
            return out;
        }

        let groups: Vec<_> = self.all_groups().collect();

        // Base column widths: max of header and data widths (using Unicode width)
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|col| {
                let max_data = col.data.iter().map(|v| v.width()).max().unwrap_or(0);
                std::cmp::max(col.header.width(), max_data)
            })
            .collect();

        let has_named_groups = groups.iter().any(|(name, _)| name.is_some());

        // Column ranges and span widths per group. A group name wider than its columns pads
        // after the group instead of widening the columns.
        let group_info: Vec<((usize, usize), usize)> = {
            let mut col = 0;
            groups
                .iter()
                .map(|&(name, count)| {
                    let start = col;
                    col += count;
                    let natural_span = widths[start..col].iter().sum::<usize>() + count - 1;
                    let target_span = if has_named_groups {
                        let name_width = name.map(|n| n.width()).unwrap_or(0);
                        std::cmp::max(natural_span, name_width)
                    } else {
                        natural_span
                    };
                    ((start, col), target_span)
                })
                .collect()
        };

        if has_named_groups {
            let header: Vec<String> = groups
                .iter()
                .zip(&group_info)
                .map(|(&(name, _), &(_, span))| ljust(name.unwrap_or(""), span))
                .collect();
            let _ = writeln!(out, "{}", header.join(" ").trim_ascii_end());
        }

        // Headers are always left-justified.
        let header_line: Vec<String> = group_info
            .iter()
            .map(|&((start, end), span)| {
                let cols: Vec<String> = self.columns[start..end]
                    .iter()
                    .zip(&widths[start..end])
                    .map(|(c, &w)| ljust(&c.header, w))
                    .collect();
                ljust(&cols.join(" "), span)
            })
            .collect();
        let _ = writeln!(out, "{}", header_line.join(" ").trim_ascii_end());

        let num_rows = self.columns.iter().map(|c| c.data.len()).max().unwrap_or(0);
        for row_idx in 0..num_rows {
            let row: Vec<String> = group_info
                .iter()
                .map(|&((start, end), span)| {
                    let vals: Vec<String> = self.columns[start..end]
                        .iter()
                        .zip(&widths[start..end])
                        .map(|(col, &w)| {
                            let val = col.data.get(row_idx).map(|s| s.as_str()).unwrap_or("-");
                            match col.align {
                                Align::Left => ljust(val, w),
                                Align::Right => rjust(val, w),
                            }
                        })
                        .collect();
                    ljust(&vals.join(" "), span)
                })
                .collect();
            let _ = writeln!(out, "{}", row.join(" ").trim_ascii_end());
        }
        out
    }
}

/// Left-justify string to given width (using Unicode display width).
fn ljust(s: &str, width: usize) -> String {
    let current_width = s.width();
    if current_width >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - current_width))
    }
}

/// Right-justify string to given width (using Unicode display width).
fn rjust(s: &str, width: usize) -> String {
    let current_width = s.width();
    if current_width >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - current_width), s)
    }
}
