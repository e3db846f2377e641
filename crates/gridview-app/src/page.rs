// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::{Range, RangeInclusive};

pub const PAGE_SIZE: usize = 10;

/// One-based page cursor over the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    current_page: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

impl Paginator {
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// No upper bound: a page past the end yields an empty slice. Zero is
    /// raised to the first page.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn total_pages(&self, rows: usize) -> usize {
        rows.div_ceil(self.page_size)
    }

    pub fn page_numbers(&self, rows: usize) -> RangeInclusive<usize> {
        1..=self.total_pages(rows)
    }

    /// Row indices of the current page, clipped to `rows`.
    pub fn row_range(&self, rows: usize) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(rows);
        let end = start.saturating_add(self.page_size).min(rows);
        start..end
    }

    pub fn page_slice<'a, T>(&self, view: &'a [T]) -> &'a [T] {
        &view[self.row_range(view.len())]
    }
}
