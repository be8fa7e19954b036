//! Card carousel: a window of `per_view` cards sliding over `item_count`
//! cards, one page at a time.

use super::key::{Key, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    item_count: usize,
    per_view: usize,
    /// Index of the first visible card.
    start: usize,
    wrap: bool,
}

impl Carousel {
    /// `per_view` is raised to at least 1.
    pub fn new(item_count: usize, per_view: usize) -> Self {
        Self {
            item_count,
            per_view: per_view.max(1),
            start: 0,
            wrap: false,
        }
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Indices of the cards currently in view.
    pub fn visible(&self) -> std::ops::Range<usize> {
        self.start..(self.start + self.per_view).min(self.item_count)
    }

    fn max_start(&self) -> usize {
        self.item_count.saturating_sub(self.per_view)
    }

    pub fn page_count(&self) -> usize {
        if self.item_count == 0 {
            0
        } else {
            self.item_count.div_ceil(self.per_view)
        }
    }

    pub fn current_page(&self) -> usize {
        if self.start >= self.max_start() && self.item_count > 0 {
            self.page_count() - 1
        } else {
            self.start / self.per_view
        }
    }

    pub fn can_prev(&self) -> bool {
        (self.wrap && self.item_count > self.per_view) || self.start > 0
    }

    pub fn can_next(&self) -> bool {
        (self.wrap && self.item_count > self.per_view) || self.start < self.max_start()
    }

    /// Bring `index` into view as the first card, clamped so the view
    /// stays full.
    pub fn go_to(&mut self, index: usize) {
        self.start = index.min(self.max_start());
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.go_to(page.saturating_mul(self.per_view));
    }

    pub fn next(&mut self) -> bool {
        let before = self.start;
        if self.start >= self.max_start() {
            if self.wrap {
                self.start = 0;
            }
        } else {
            self.go_to(self.start + self.per_view);
        }
        self.start != before
    }

    pub fn prev(&mut self) -> bool {
        let before = self.start;
        if self.start == 0 {
            if self.wrap {
                self.start = self.max_start();
            }
        } else {
            self.start = self.start.saturating_sub(self.per_view);
        }
        self.start != before
    }

    /// Items were added or removed; keep the view inside the new range.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.start = self.start.min(self.max_start());
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        match event.key {
            Key::ArrowRight => self.next(),
            Key::ArrowLeft => self.prev(),
            Key::Home => {
                let moved = self.start != 0;
                self.start = 0;
                moved
            }
            Key::End => {
                let moved = self.start != self.max_start();
                self.start = self.max_start();
                moved
            }
            _ => false,
        }
    }
}
