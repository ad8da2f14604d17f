//! Page-number pagination shared by every listing.

use serde::Serialize;

/// A requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Build a request; page 0 is treated as page 1 and a zero page size as 1.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// The page actually served once the number of pages is known.
    ///
    /// Out-of-range requests land on the last page; an empty result set
    /// still has a (blank) first page.
    pub fn clamp(&self, total_pages: u64) -> u64 {
        self.page.clamp(1, total_pages.max(1))
    }

    /// Zero-based offset of the first item on `page`.
    pub fn offset(&self, page: u64) -> u64 {
        (page.max(1) - 1) * self.per_page
    }
}

/// One page of results plus enough totals to render navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total_items: u64) -> Self {
        let per_page = per_page.max(1);
        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page),
        }
    }

    /// Slice an already-filtered, already-ordered collection.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let pages = total.div_ceil(request.per_page);
        let page = request.clamp(pages);
        let items = all
            .into_iter()
            .skip(request.offset(page) as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(items, page, request.per_page, total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
