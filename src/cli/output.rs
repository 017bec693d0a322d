//! CLI output formatting
//!
//! Provides colored output, spinners, tables and the pull request tree.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Output helper for consistent CLI formatting
pub struct Output;

impl Output {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a dimmed hint line
    pub fn hint(message: &str) {
        println!("{}", message.dimmed());
    }

    /// Print a header
    pub fn header(message: &str) {
        println!("\n{}", message.bold());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.dimmed(), value);
    }

    /// Create a spinner with a message
    pub fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("hardcoded template must be valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Stop a spinner, leaving its message followed by a green verdict
    pub fn spinner_done(pb: &ProgressBar, verdict: &str) {
        pb.finish_with_message(format!("{} {}", pb.message(), verdict.green().bold()));
    }

    /// Stop a spinner, leaving its message followed by a red verdict
    pub fn spinner_failed(pb: &ProgressBar, verdict: &str) {
        pb.finish_with_message(format!("{} {}", pb.message(), verdict.red().bold()));
    }

    /// Format a repo name consistently
    pub fn repo_name(name: &str) -> String {
        name.cyan().bold().to_string()
    }

    /// Format a branch name consistently
    pub fn branch_name(name: &str) -> String {
        name.magenta().to_string()
    }

    /// Format a pull request state, merge outcome or review status
    pub fn status(status: &str) -> String {
        match status.to_uppercase().as_str() {
            "OPEN" | "CLEAN" | "APPROVED" => status.green().bold().to_string(),
            "MERGED" => status.magenta().bold().to_string(),
            "DECLINED" | "UNAPPROVED" => status.red().bold().to_string(),
            "CONFLICTED" => status.white().on_red().bold().to_string(),
            "NEEDS_WORK" => status.yellow().bold().to_string(),
            "NOT REVIEWED" => status.cyan().bold().to_string(),
            _ => status.to_string(),
        }
    }

    /// Format a URL as a clickable link (for terminals that support it)
    pub fn link(text: &str, url: &str) -> String {
        // OSC 8 hyperlink escape sequence
        format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text.underline())
    }
}

/// Table builder for formatted output
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with headers
    pub fn new(headers: Vec<&str>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| h.chars().count()).collect();
        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Two-column SUMMARY / DESCRIPTION table
    pub fn summary(rows: &[(&str, &str)]) -> Self {
        let mut table = Self::new(vec!["SUMMARY", "DESCRIPTION"]);
        for (key, value) in rows {
            table.add_row(vec![key, value]);
        }
        table
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<&str>) {
        let row: Vec<String> = row.into_iter().map(|s| s.to_string()).collect();
        for (i, cell) in row.iter().enumerate() {
            if i < self.column_widths.len() {
                let width = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                self.column_widths[i] = self.column_widths[i].max(width);
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn pad(cell: &str, width: usize) -> String {
        let len = cell.chars().count();
        format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
    }

    /// Render the table, one string per output line
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let header_line: String = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| Self::pad(h, self.column_widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(header_line.trim_end().bold().to_string());

        let sep_line: String = self
            .column_widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(sep_line.dimmed().to_string());

        // Multi-line cells continue on following lines in the same column.
        for row in &self.rows {
            let cell_lines: Vec<Vec<&str>> = row
                .iter()
                .map(|c| {
                    let l: Vec<&str> = c.lines().collect();
                    if l.is_empty() {
                        vec![""]
                    } else {
                        l
                    }
                })
                .collect();
            let height = cell_lines.iter().map(Vec::len).max().unwrap_or(1);
            for n in 0..height {
                let line: String = cell_lines
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let width = self.column_widths.get(i).copied().unwrap_or(0);
                        Self::pad(cell.get(n).copied().unwrap_or(""), width)
                    })
                    .collect::<Vec<_>>()
                    .join("  ");
                lines.push(line.trim_end().to_string());
            }
        }

        lines
    }

    /// Print the table
    pub fn print(&self) {
        for line in self.render() {
            println!("{}", line);
        }
    }
}

/// One labelled leaf in a [`Tree`]
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub label: String,
    pub fields: Vec<(String, String)>,
}

/// Three-level tree: root → groups → entries with key/value fields
#[derive(Debug, Clone)]
pub struct Tree {
    root: String,
    groups: Vec<(String, Vec<TreeEntry>)>,
}

impl Tree {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            groups: Vec::new(),
        }
    }

    /// Add an entry under `group`, creating the group on first use
    pub fn push(&mut self, group: &str, entry: TreeEntry) {
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, entries)) => entries.push(entry),
            None => self.groups.push((group.to_string(), vec![entry])),
        }
    }

    /// Render the tree with box-drawing guides
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![Output::repo_name(&self.root)];
        let group_count = self.groups.len();

        for (gi, (group, entries)) in self.groups.iter().enumerate() {
            let last_group = gi + 1 == group_count;
            let (branch, indent) = if last_group {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            lines.push(format!("{}{}", branch, Output::status(group)));

            for (ei, entry) in entries.iter().enumerate() {
                let last_entry = ei + 1 == entries.len();
                let (branch, inner) = if last_entry {
                    ("└── ", "    ")
                } else {
                    ("├── ", "│   ")
                };
                lines.push(format!("{}{}{}", indent, branch, entry.label.bold()));
                for (key, value) in &entry.fields {
                    lines.push(format!("{}{}{}: {}", indent, inner, key.bold(), value));
                }
            }
        }

        lines
    }

    pub fn print(&self) {
        for line in self.render() {
            println!("{}", line);
        }
    }
}
