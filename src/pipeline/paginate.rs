// Fixed-size pagination of the final chunk table.

use anyhow::Result;

/// Largest page that still fits a spreadsheet sheet (1,048,576 rows) once
/// the header row is counted.
pub const DEFAULT_PAGE_ROWS: usize = 1_048_575;

/// Split rows into consecutive pages of at most `page_rows` rows.
///
/// Order is preserved and every row lands on exactly one page. An empty
/// table still yields one (empty) page so a run always leaves an output.
pub fn paginate<T>(rows: &[T], page_rows: usize) -> Result<Vec<&[T]>> {
    if page_rows == 0 {
        anyhow::bail!("Page size must be at least 1 row");
    }
    if rows.is_empty() {
        return Ok(vec![rows]);
    }
    Ok(rows.chunks(page_rows).collect())
}
