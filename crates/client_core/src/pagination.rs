//! Client-side slicing of an already-fetched list into fixed-size pages.

/// Returns the 1-indexed `page_number` of `items`. Pages past the end, page 0,
/// and a zero page size all yield an empty slice.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> &[T] {
    if page_size == 0 || page_number == 0 {
        return &[];
    }
    let start = (page_number - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `item_count` items; never less than one.
pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    item_count.div_ceil(page_size).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: usize,
    page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, item_count: usize) -> usize {
        total_pages(item_count, self.page_size)
    }

    /// Moves to `requested`, clamped into `[1, total_pages]`.
    pub fn go_to(&mut self, requested: i64, item_count: usize) -> usize {
        let last = self.total_pages(item_count);
        self.current_page = if requested < 1 {
            1
        } else {
            usize::try_from(requested).unwrap_or(usize::MAX).min(last)
        };
        self.current_page
    }

    /// Re-establishes the page range after the underlying list changed.
    pub fn clamp_to(&mut self, item_count: usize) {
        self.current_page = self.current_page.clamp(1, self.total_pages(item_count));
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page_size, self.current_page)
    }
}
