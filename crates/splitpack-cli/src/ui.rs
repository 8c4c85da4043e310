//! Terminal output helpers.

use std::time::Duration;

use owo_colors::OwoColorize;
use splitpack_bundler::BundleStats;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a byte count in the largest fitting unit.
///
/// ```
/// use splitpack_cli::ui::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as milliseconds below one second, seconds above.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Print build statistics to stdout, uncolored so they can be piped.
pub fn print_stats(stats: &BundleStats) {
    println!("Build summary");
    println!("  Chunks:                       {}", stats.chunk_count);
    println!("  Modules:                      {}", stats.modules_count);
    println!(
        "  Modules including duplicates: {}",
        stats.modules_including_duplicates
    );
    println!("  Modules per chunk:            {}", stats.modules_per_chunk);
    println!("  Modules in first chunk:       {}", stats.modules_first_chunk);

    let width = stats.file_sizes.keys().map(String::len).max().unwrap_or(0);
    for (name, size) in &stats.file_sizes {
        println!("  {:>width$}  {}", name, format_size(*size as u64));
    }
}
