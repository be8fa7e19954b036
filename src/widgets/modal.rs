//! Modal dialog with a focus trap.
//!
//! While open, Tab and Shift+Tab cycle through the dialog's tabbable
//! descendants only, page scroll is suspended, and Escape or an overlay
//! click may close it. Closing returns focus to where it was before opening.

use tracing::debug;

use super::document::{Document, ElementId};
use super::key::{Key, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalOptions {
    pub close_on_overlay_click: bool,
    pub close_on_escape: bool,
    /// Focused on open instead of the first tabbable descendant.
    pub initial_focus: Option<ElementId>,
    /// Focused on close instead of the element focused before opening.
    pub final_focus: Option<ElementId>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            close_on_overlay_click: true,
            close_on_escape: true,
            initial_focus: None,
            final_focus: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Modal {
    overlay: ElementId,
    dialog: ElementId,
    options: ModalOptions,
    state: ModalState,
    last_focused: Option<ElementId>,
}

impl Modal {
    /// `dialog` is expected to sit inside `overlay`.
    pub fn new(overlay: ElementId, dialog: ElementId, options: ModalOptions) -> Self {
        Self {
            overlay,
            dialog,
            options,
            state: ModalState::Closed,
            last_focused: None,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ModalState::Open
    }

    /// Element that had focus when the modal opened.
    pub fn last_focused(&self) -> Option<ElementId> {
        self.last_focused
    }

    /// Follow an externally owned `is_open` flag.
    pub fn set_open(&mut self, doc: &mut Document, open: bool) {
        if open {
            self.open(doc);
        } else {
            self.close(doc);
        }
    }

    pub fn open(&mut self, doc: &mut Document) {
        if self.is_open() {
            return;
        }
        self.state = ModalState::Open;
        self.last_focused = doc.focused();
        doc.lock_scroll();

        let target = self
            .options
            .initial_focus
            .filter(|id| doc.can_focus(*id))
            .or_else(|| doc.tabbable_within(self.dialog).first().copied())
            .unwrap_or(self.dialog);
        doc.focus(target);
        debug!("modal opened, focus on {:?}", doc.focused());
    }

    pub fn close(&mut self, doc: &mut Document) {
        if !self.is_open() {
            return;
        }
        self.state = ModalState::Closed;
        doc.unlock_scroll();

        let restore = self
            .options
            .final_focus
            .filter(|id| doc.can_focus(*id))
            .or(self.last_focused.filter(|id| doc.is_attached(*id)));
        if let Some(target) = restore {
            doc.focus(target);
        }
        self.last_focused = None;
        debug!("modal closed, focus on {:?}", doc.focused());
    }

    /// Returns true when the key was consumed by the modal.
    pub fn handle_key(&mut self, doc: &mut Document, event: KeyEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        match event.key {
            Key::Tab => {
                self.cycle_focus(doc, event.shift);
                true
            }
            Key::Escape if self.options.close_on_escape => {
                self.close(doc);
                true
            }
            _ => false,
        }
    }

    /// `target` is the element the click originated on. Clicks inside the
    /// dialog never close it.
    pub fn handle_overlay_click(&mut self, doc: &mut Document, target: ElementId) -> bool {
        if self.is_open() && self.options.close_on_overlay_click && target == self.overlay {
            self.close(doc);
            return true;
        }
        false
    }

    fn cycle_focus(&self, doc: &mut Document, backwards: bool) {
        let ring = doc.tabbable_within(self.dialog);
        if ring.is_empty() {
            doc.focus(self.dialog);
            return;
        }

        let last = ring.len() - 1;
        let current = doc
            .focused()
            .and_then(|focused| ring.iter().position(|id| *id == focused));
        let next = match (current, backwards) {
            (Some(i), false) if i == last => 0,
            (Some(i), false) => i + 1,
            (Some(0), true) => last,
            (Some(i), true) => i - 1,
            (None, false) => 0,
            (None, true) => last,
        };
        doc.focus(ring[next]);
    }
}
