//! Console output: banner, discovery info and the batch summary.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use bytesize::ByteSize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use console::{Term, style};

use crate::types::{BatchResult, ProcessorMode};

/// Failures listed on screen before pointing at the log file.
const MAX_LISTED_FAILURES: usize = 10;

/// Formats bytes into a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

pub fn show_discovered(count: usize, total_bytes: u64) {
    println!();
    println!("{} {}", style("✓").green(), style(format!("Found {count} file(s), {}", format_bytes(total_bytes))).bold());
    println!();
}

pub fn show_no_files() {
    println!("{}", style("No files found").yellow());
}

pub fn summary_table(mode: ProcessorMode, result: &BatchResult, elapsed: Duration) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic).set_header(vec![Cell::new(mode.label()), Cell::new("Count")]);

    table.add_row(vec![Cell::new("Succeeded"), Cell::new(result.succeeded.len()).fg(Color::Green)]);
    let failed = Cell::new(result.failed.len());
    table.add_row(vec![Cell::new("Failed"), if result.has_failures() { failed.fg(Color::Red) } else { failed }]);
    if !result.warnings.is_empty() {
        table.add_row(vec![Cell::new("Warnings"), Cell::new(result.warnings.len()).fg(Color::Yellow)]);
    }
    table.add_row(vec![Cell::new("Processed"), Cell::new(format_bytes(result.bytes_processed))]);
    table.add_row(vec![Cell::new("Elapsed"), Cell::new(format!("{:.2}s", elapsed.as_secs_f64()))]);

    table
}

pub fn show_summary(mode: ProcessorMode, result: &BatchResult, elapsed: Duration) {
    println!();
    println!("{}", summary_table(mode, result, elapsed));

    for (path, warning) in &result.warnings {
        println!("{} {} : {}", style("!").yellow(), path.display(), warning);
    }

    for failure in result.failed.iter().take(MAX_LISTED_FAILURES) {
        println!("{} {} : {}", style("✗").red(), failure.path.display(), failure.reason);
    }
    if result.failed.len() > MAX_LISTED_FAILURES {
        println!("  {}", style(format!("... and {} more", result.failed.len() - MAX_LISTED_FAILURES)).dim());
    }
}

pub fn show_log_written(path: &Path) {
    println!("{} {}", style("✓").green(), style(format!("Failure log written: {}", path.display())).bold());
}

/// Clears the terminal screen.
pub fn clear_screen() -> Result<()> {
    Term::stdout().clear_screen().map_err(|e| anyhow!("failed to clear screen: {e}"))
}

/// Prints the application banner.
pub fn print_banner() {
    let banner = r"
                 _     _ _
  ___  ___  __ _| | __| (_)_ __
 / __|/ _ \/ _` | |/ _` | | '__|
 \__ \  __/ (_| | | (_| | | |
 |___/\___|\__,_|_|\__,_|_|_|
";

    println!("{}", style(banner).green().bold());
}
