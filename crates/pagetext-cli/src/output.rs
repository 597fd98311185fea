use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use pagetext_core::{ExtractionReport, ProgressEvent};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the one-line result of a file extraction, plus failed pages if any.
pub fn print_summary(
    w: &mut dyn Write,
    report: &ExtractionReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "Extracted {} pages to {}",
        report.pages_processed,
        report.destination.display()
    );
    if color.enabled() {
        writeln!(w, "{}", line.green())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    print_failed_pages(w, &report.failed_pages, color)?;
    print_page_limit_note(w, report.pages_processed, report.total_pages, color)
}

/// Summary used when the text went to stdout instead of a file.
pub fn print_stdout_summary(
    w: &mut dyn Write,
    pages_processed: usize,
    total_pages: usize,
    failed_pages: &[usize],
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!("Extracted {} pages", pages_processed);
    if color.enabled() {
        writeln!(w, "{}", line.green())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    print_failed_pages(w, failed_pages, color)?;
    print_page_limit_note(w, pages_processed, total_pages, color)
}

fn print_failed_pages(w: &mut dyn Write, failed: &[usize], color: ColorMode) -> std::io::Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    let numbers: Vec<String> = failed.iter().map(|n| n.to_string()).collect();
    let line = format!(
        "({} {} failed: {})",
        failed.len(),
        if failed.len() == 1 { "page" } else { "pages" },
        numbers.join(", ")
    );
    if color.enabled() {
        writeln!(w, "{}", line.dimmed())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Say so when the page limit cut the document short.
fn print_page_limit_note(
    w: &mut dyn Write,
    pages_processed: usize,
    total_pages: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    if total_pages <= pages_processed {
        return Ok(());
    }
    let line = format!("(page limit reached; document has {} pages)", total_pages);
    if color.enabled() {
        writeln!(w, "{}", line.dimmed())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

fn page_failed_message(index: usize, total: usize) -> String {
    format!("Page {}/{} failed", index + 1, total)
}

/// Progress bar over the pages of one document, drawn on stderr.
pub struct PageProgress {
    bar: ProgressBar,
}

impl PageProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_message("Opening document...");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn handle(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Opened {
                total_pages,
                effective_count,
            } => {
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner:.green} {msg} [{bar:40.green/dim}] {pos}/{len} pages",
                ) {
                    self.bar.set_style(style.progress_chars("=> "));
                }
                self.bar.set_length(effective_count as u64);
                self.bar
                    .set_message(format!("Extracting ({} in document)", total_pages));
            }
            ProgressEvent::Page {
                index,
                total,
                failed,
            } => {
                if failed {
                    self.bar.set_message(page_failed_message(index, total));
                }
                self.bar.inc(1);
            }
            ProgressEvent::Written { .. } => self.bar.finish_and_clear(),
        }
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
