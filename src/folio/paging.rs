//! # Page Addressing
//!
//! Pure arithmetic between absolute line numbers and pages. Everything is
//! 1-based except the in-page offset, which is a zero-based index into the
//! `lines` of a fetched page.
//!
//! ```text
//! absolute_line = (page - 1) * page_size + offset + 1
//! ```

use crate::error::{FolioError, Result};

/// Lines per page used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

fn check_page_size(page_size: usize) -> Result<()> {
    if page_size < 1 {
        return Err(FolioError::InvalidInput(
            "page size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn check_line(absolute_line: usize) -> Result<()> {
    if absolute_line < 1 {
        return Err(FolioError::InvalidInput(
            "line numbers start at 1".to_string(),
        ));
    }
    Ok(())
}

/// The page that contains `absolute_line`.
pub fn page_of(absolute_line: usize, page_size: usize) -> Result<usize> {
    check_line(absolute_line)?;
    check_page_size(page_size)?;
    Ok(absolute_line.div_ceil(page_size))
}

/// The absolute number of the first line on `page`.
pub fn first_line_of(page: usize, page_size: usize) -> Result<usize> {
    check_page_size(page_size)?;
    if page < 1 {
        return Err(FolioError::InvalidInput("pages start at 1".to_string()));
    }
    (page - 1)
        .checked_mul(page_size)
        .and_then(|before| before.checked_add(1))
        .ok_or_else(|| FolioError::InvalidInput(format!("page {} is too large", page)))
}

/// The absolute number of the last line `page` can hold.
pub fn last_line_of(page: usize, page_size: usize) -> Result<usize> {
    let first = first_line_of(page, page_size)?;
    first
        .checked_add(page_size - 1)
        .ok_or_else(|| FolioError::InvalidInput(format!("page {} is too large", page)))
}

/// Zero-based offset of `absolute_line` within its page.
pub fn line_within_page(absolute_line: usize, page_size: usize) -> Result<usize> {
    check_line(absolute_line)?;
    check_page_size(page_size)?;
    Ok((absolute_line - 1) % page_size)
}

/// Number of pages needed for `total_lines`. An empty file still has one
/// (empty) page.
pub fn total_pages(total_lines: usize, page_size: usize) -> Result<usize> {
    check_page_size(page_size)?;
    Ok(total_lines.div_ceil(page_size).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_of_boundaries() {
        assert_eq!(page_of(1, 1000).unwrap(), 1);
        assert_eq!(page_of(1000, 1000).unwrap(), 1);
        assert_eq!(page_of(1001, 1000).unwrap(), 2);
        assert_eq!(page_of(2001, 1000).unwrap(), 3);
    }

    #[test]
    fn test_first_line_of() {
        assert_eq!(first_line_of(1, 1000).unwrap(), 1);
        assert_eq!(first_line_of(3, 1000).unwrap(), 2001);
        assert_eq!(first_line_of(4, 7).unwrap(), 22);
    }

    #[test]
    fn test_huge_pages_are_rejected() {
        assert!(matches!(
            first_line_of(usize::MAX, 2),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            last_line_of(2, usize::MAX),
            Err(FolioError::InvalidInput(_))
        ));
        assert_eq!(first_line_of(usize::MAX, 1).unwrap(), usize::MAX);
        assert_eq!(last_line_of(1, usize::MAX).unwrap(), usize::MAX);
        assert_eq!(last_line_of(3, 1000).unwrap(), 3000);
    }

    #[test]
    fn test_line_within_page() {
        assert_eq!(line_within_page(1, 1000).unwrap(), 0);
        assert_eq!(line_within_page(1000, 1000).unwrap(), 999);
        assert_eq!(line_within_page(1001, 1000).unwrap(), 0);
        assert_eq!(line_within_page(1200, 1000).unwrap(), 199);
    }

    #[test]
    fn test_rejects_zero_arguments() {
        assert!(matches!(page_of(0, 10), Err(FolioError::InvalidInput(_))));
        assert!(matches!(page_of(5, 0), Err(FolioError::InvalidInput(_))));
        assert!(matches!(
            first_line_of(0, 10),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            line_within_page(0, 10),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            total_pages(10, 0),
            Err(FolioError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 1000).unwrap(), 1);
        assert_eq!(total_pages(1000, 1000).unwrap(), 1);
        assert_eq!(total_pages(1001, 1000).unwrap(), 2);
        assert_eq!(total_pages(2500, 1000).unwrap(), 3);
    }

    #[test]
    fn test_addressing_is_consistent() {
        for page_size in 1..=13 {
            for line in 1..=200 {
                let page = page_of(line, page_size).unwrap();
                let first = first_line_of(page, page_size).unwrap();
                let offset = line_within_page(line, page_size).unwrap();
                assert_eq!(first + offset, line, "line {line}, page size {page_size}");
                assert!(offset < page_size);
            }
        }
    }
}
