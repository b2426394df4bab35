//! Page arithmetic shared by both fetch strategies.

/// Number of pages needed for `total` items, `0` when there are none.
pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total.div_ceil(page_size)
}

/// Highest valid 0-based page index, `0` for an empty collection.
pub fn last_page_index(total: usize, page_size: usize) -> usize {
    page_count(total, page_size).saturating_sub(1)
}

/// Current 0-based page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page_index: usize,
    page_size: usize,
}

impl PageWindow {
    /// Start on the first page. A zero size is bumped to one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Current 0-based page.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Rows per page, never 0.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to `index`. Returns `true` if the page changed.
    pub fn set_page(&mut self, index: usize) -> bool {
        let changed = self.page_index != index;
        self.page_index = index;
        changed
    }

    /// Change the page size; always goes back to the first page.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        let size = size.max(1);
        let changed = self.page_size != size || self.page_index != 0;
        self.page_size = size;
        self.page_index = 0;
        changed
    }

    /// Go back to the first page. Returns `true` if the page changed.
    pub fn reset(&mut self) -> bool {
        self.set_page(0)
    }

    /// Index of the first item on the current page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Pull the index back inside `[0, last_page_index(total)]`.
    ///
    /// Returns `true` if the index moved.
    pub fn clamp_to(&mut self, total: usize) -> bool {
        let last = last_page_index(total, self.page_size);
        if self.page_index > last {
            self.page_index = last;
            true
        } else {
            false
        }
    }

    /// The slice of `items` on the current page; empty past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let items: Vec<u32> = (0..25).collect();
        let mut window = PageWindow::new(10);
        window.set_page(2);
        assert_eq!(window.slice(&items), &[20, 21, 22, 23, 24]);
        window.set_page(7);
        assert!(window.slice(&items).is_empty());
        window.set_page(usize::MAX);
        assert!(window.slice(&items).is_empty());
    }

    #[test]
    fn clamp_moves_to_last_valid_page() {
        for (total, size, start, expected) in [
            (25, 10, 9, 2),
            (20, 10, 2, 1),
            (0, 10, 4, 0),
            (3, 1, 2, 2),
            (100, 7, 40, 14),
        ] {
            let mut window = PageWindow::new(size);
            window.set_page(start);
            window.clamp_to(total);
            assert_eq!(window.page_index(), expected, "total={total} size={size} start={start}");
        }
    }

    #[test]
    fn clamp_leaves_valid_pages_alone() {
        let mut window = PageWindow::new(10);
        window.set_page(1);
        assert!(!window.clamp_to(25));
        assert_eq!(window.page_index(), 1);
    }

    #[test]
    fn page_size_change_resets_index() {
        let mut window = PageWindow::new(10);
        window.set_page(3);
        assert!(window.set_page_size(25));
        assert_eq!(window.page_index(), 0);
        assert_eq!(window.page_size(), 25);
        window.set_page_size(0);
        assert_eq!(window.page_size(), 1);
    }
}
