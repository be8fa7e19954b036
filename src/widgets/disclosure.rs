//! Show/hide sections: a lone [`Disclosure`] and grouped [`Accordion`]s.

use std::collections::BTreeSet;

use super::key::{Key, KeyEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disclosure {
    open: bool,
}

impl Disclosure {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        match event.key {
            Key::Enter | Key::Space => {
                self.toggle();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccordionMode {
    /// At most one panel open. `collapsible` allows closing the open one.
    Single { collapsible: bool },
    Multiple,
}

#[derive(Debug, Clone)]
pub struct Accordion {
    items: Vec<String>,
    mode: AccordionMode,
    open: BTreeSet<usize>,
    /// Header that has keyboard focus.
    focused: Option<usize>,
}

impl Accordion {
    pub fn new<I, S>(items: I, mode: AccordionMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            mode,
            open: BTreeSet::new(),
            focused: None,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.position(id).is_some_and(|i| self.open.contains(&i))
    }

    pub fn open_items(&self) -> Vec<&str> {
        self.open.iter().map(|i| self.items[*i].as_str()).collect()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.map(|i| self.items[i].as_str())
    }

    pub fn focus(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(i) => {
                self.focused = Some(i);
                true
            }
            None => false,
        }
    }

    /// Returns false when the item is unknown or the change is not allowed.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(i) => self.toggle_index(i),
            None => false,
        }
    }

    fn toggle_index(&mut self, index: usize) -> bool {
        let was_open = self.open.contains(&index);
        match self.mode {
            AccordionMode::Multiple => {
                if was_open {
                    self.open.remove(&index);
                } else {
                    self.open.insert(index);
                }
            }
            AccordionMode::Single { collapsible } => {
                if was_open {
                    if !collapsible {
                        return false;
                    }
                    self.open.clear();
                } else {
                    self.open.clear();
                    self.open.insert(index);
                }
            }
        }
        true
    }

    /// Header keyboard handling: Enter/Space toggle the focused panel,
    /// arrows move between headers with wrap-around.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let len = self.items.len();
        if len == 0 {
            return false;
        }
        let current = self.focused.unwrap_or(0);
        match event.key {
            Key::Enter | Key::Space => match self.focused {
                Some(i) => self.toggle_index(i),
                None => false,
            },
            Key::ArrowDown => {
                self.focused = Some((current + 1) % len);
                true
            }
            Key::ArrowUp => {
                self.focused = Some((current + len - 1) % len);
                true
            }
            Key::Home => {
                self.focused = Some(0);
                true
            }
            Key::End => {
                self.focused = Some(len - 1);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclosure_toggles_on_enter_and_space() {
        let mut d = Disclosure::default();
        assert!(d.handle_key(KeyEvent::new(Key::Enter)));
        assert!(d.is_open());
        d.handle_key(KeyEvent::new(Key::Space));
        assert!(!d.is_open());
        assert!(!d.handle_key(KeyEvent::new(Key::Tab)));
    }

    #[test]
    fn single_mode_keeps_one_panel_open() {
        let mut acc = Accordion::new(["faq", "pricing", "about"], AccordionMode::Single {
            collapsible: false,
        });
        acc.toggle("faq");
        acc.toggle("pricing");
        assert_eq!(acc.open_items(), ["pricing"]);

        assert!(!acc.toggle("pricing"));
        assert!(acc.is_open("pricing"));
        assert!(!acc.toggle("missing"));
    }

    #[test]
    fn collapsible_single_mode_can_close_everything() {
        let mut acc = Accordion::new(["a", "b"], AccordionMode::Single { collapsible: true });
        acc.toggle("a");
        assert!(acc.toggle("a"));
        assert!(acc.open_items().is_empty());
    }

    #[test]
    fn multiple_mode_is_independent() {
        let mut acc = Accordion::new(["a", "b", "c"], AccordionMode::Multiple);
        acc.toggle("a");
        acc.toggle("c");
        assert_eq!(acc.open_items(), ["a", "c"]);
        acc.toggle("a");
        assert_eq!(acc.open_items(), ["c"]);
    }

    #[test]
    fn header_navigation_wraps() {
        let mut acc = Accordion::new(["a", "b", "c"], AccordionMode::Multiple);
        acc.focus("c");
        acc.handle_key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(acc.focused(), Some("a"));
        acc.handle_key(KeyEvent::new(Key::ArrowUp));
        assert_eq!(acc.focused(), Some("c"));
        acc.handle_key(KeyEvent::new(Key::Home));
        acc.handle_key(KeyEvent::new(Key::Space));
        assert!(acc.is_open("a"));
        acc.handle_key(KeyEvent::new(Key::End));
        assert_eq!(acc.focused(), Some("c"));
    }
}
