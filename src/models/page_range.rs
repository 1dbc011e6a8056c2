//! Page-range expression parsing for the UI shell.
//!
//! Accepts the familiar print-dialog syntax: comma-separated page numbers
//! and inclusive ranges, e.g. `1,3,5-7,10`.

use crate::error::{AppError, Result};

/// Parse a page-range string into a sorted, deduplicated list of 1-based
/// page numbers.
///
/// Malformed segments yield a `Validation` error; nothing is silently
/// dropped.
pub fn parse_page_range(range_str: &str) -> Result<Vec<u32>> {
    let mut pages = Vec::new();

    for part in range_str.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = part.split_once('-') {
            let start = parse_page_number(start_str)?;
            let end = parse_page_number(end_str)?;
            if start > end {
                return Err(AppError::validation(format!(
                    "range '{}' runs backwards",
                    part
                )));
            }
            pages.extend(start..=end);
        } else {
            pages.push(parse_page_number(part)?);
        }
    }

    if pages.is_empty() {
        return Err(AppError::validation("no pages given"));
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn parse_page_number(s: &str) -> Result<u32> {
    let page: u32 = s
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("'{}' is not a page number", s.trim())))?;
    if page == 0 {
        return Err(AppError::validation("page numbers start at 1"));
    }
    Ok(page)
}
