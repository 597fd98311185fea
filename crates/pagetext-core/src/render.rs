//! Output framing: one block per processed page.
//!
//! A block is `"\n--- PAGE {n} ---\n{body}\n"` with `n` the 1-based page
//! number. Blocks are concatenated as-is, so neighbouring pages end up
//! separated by a blank line.

use std::fmt::Write as _;

use crate::PageOutcome;

/// Prefix of the body written in place of a page that failed extraction.
pub const ERROR_PREFIX: &str = "Error: ";

/// The boundary line for the 1-based page `number`, without newlines.
pub fn page_marker(number: usize) -> String {
    format!("--- PAGE {number} ---")
}

/// Append the block for `outcome` to `out`.
pub fn push_block(out: &mut String, outcome: &PageOutcome) {
    // Writing into a String cannot fail.
    let _ = write!(out, "\n{}\n", page_marker(outcome.page_number()));
    match &outcome.text {
        Ok(text) => out.push_str(text),
        Err(err) => {
            out.push_str(ERROR_PREFIX);
            out.push_str(&err.message);
        }
    }
    out.push('\n');
}

/// Render every outcome in the order given.
pub fn render_pages(outcomes: &[PageOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        push_block(&mut out, outcome);
    }
    out
}

/// 1-based page numbers of every boundary line found in `rendered`, in order.
///
/// Test support; page bodies that themselves contain marker lines are counted.
#[doc(hidden)]
pub fn marker_numbers(rendered: &str) -> Vec<usize> {
    rendered
        .lines()
        .filter_map(|line| {
            line.strip_prefix("--- PAGE ")?
                .strip_suffix(" ---")?
                .parse()
                .ok()
        })
        .collect()
}
