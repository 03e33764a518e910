// Rolegate
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Local pagination over the filtered audit set

/// Rows per dashboard page
pub const AUDIT_PAGE_SIZE: usize = 40;

/// Page cursor over an in-memory list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPager {
    page_size: usize,
    current_page: usize,
    total_count: usize,
}

impl Default for LocalPager {
    fn default() -> Self {
        Self::new(AUDIT_PAGE_SIZE)
    }
}

impl LocalPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            total_count: 0,
        }
    }

    /// Point at page 1 of a list with `total_count` items
    pub fn reset(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.current_page = 1;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`; out-of-range pages are ignored
    pub fn go_to(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn last_page(&mut self) {
        self.current_page = self.total_pages().max(1);
    }

    /// Index range shown on the current page
    pub fn bounds(&self) -> (usize, usize) {
        let start = (self.current_page - 1) * self.page_size;
        let end = (self.current_page * self.page_size).min(self.total_count);
        (start.min(end), end)
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.bounds();
        let end = end.min(items.len());
        &items[start.min(end)..end]
    }
}
