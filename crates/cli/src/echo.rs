use owo_colors::OwoColorize;

use folio_core::{RunStats, SiteReport};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Folio".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Split a periodical e-book into article pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print a labelled value, indented under the current step
pub fn print_detail(label: &str, value: impl std::fmt::Display) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.to_string().bright_white());
}

/// Print the run summary
pub fn print_summary(stats: &RunStats, report: &SiteReport, duration: std::time::Duration) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Run Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Documents", format!("{} ({} skipped)", stats.documents, stats.skipped_documents));
    print_detail("Segmented", stats.segmented);
    print_detail("Dropped", stats.dropped_articles);
    print_detail("Filtered", stats.filtered);
    print_detail("Pages", report.pages);
    print_detail("Images", report.images_copied);
    print_detail("Elapsed", format!("{:.2}ms", duration.as_secs_f64() * 1000.0));
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
