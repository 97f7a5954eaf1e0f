// src/utils/mod.rs

//! Utility functions and helpers.

pub mod de;
pub mod http;
pub mod metrics;
pub mod time;
pub mod url;

/// Split `len` items into contiguous `[start, end)` ranges of at most `size`.
///
/// # Examples
/// ```
/// use crawler::utils::chunk_ranges;
///
/// assert_eq!(chunk_ranges(5, 2), vec![(0, 2), (2, 4), (4, 5)]);
/// ```
pub fn chunk_ranges(len: usize, size: usize) -> Vec<(usize, usize)> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| (start, (start + size).min(len)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_ranges_cover_every_index_once() {
        for (len, size) in [(0, 50), (1, 50), (50, 50), (51, 50), (120, 7)] {
            let ranges = chunk_ranges(len, size);
            let visited: Vec<usize> = ranges.iter().flat_map(|&(s, e)| s..e).collect();
            assert_eq!(visited, (0..len).collect::<Vec<_>>());
            assert!(ranges.iter().all(|&(s, e)| e - s <= size));
        }
    }

    #[test]
    fn test_chunk_ranges_zero_size() {
        assert_eq!(chunk_ranges(2, 0), vec![(0, 1), (1, 2)]);
    }
}
