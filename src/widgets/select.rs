//! Single/multi-select listbox with keyboard navigation and optional text
//! filtering.
//!
//! The active index always points into the *visible* options (the filtered
//! list in searchable mode) and is only meaningful while open. Disabled
//! options are never selected and every index-moving operation skips them.

use super::key::{Key, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Stored in the selection.
    pub value: String,
    /// Shown to the user; matched by search and type-ahead.
    pub label: String,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Case-insensitive substring match on the label.
    pub fn matches(&self, query: &str) -> bool {
        self.label.to_lowercase().contains(&query.to_lowercase())
    }

    fn starts_with_char(&self, c: char) -> bool {
        self.label
            .chars()
            .next()
            .is_some_and(|first| first.to_lowercase().eq(c.to_lowercase()))
    }
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectResponse {
    /// The event was consumed; suppress the host default.
    pub handled: bool,
    /// The committed selection changed.
    pub changed: bool,
    /// Move focus back to the trigger.
    pub focus_trigger: bool,
}

impl SelectResponse {
    fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Combobox {
    options: Vec<SelectOption>,
    multiple: bool,
    searchable: bool,
    disabled: bool,
    open: bool,
    active: Option<usize>,
    selected: Vec<String>,
    query: String,
}

impl Combobox {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Initial selection; unknown and disabled values are dropped. A
    /// single-select keeps only the first, whichever builder runs last.
    pub fn with_selected<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values.into_iter().map(Into::into) {
            let known = self
                .options
                .iter()
                .any(|o| o.value == value && !o.disabled);
            if known && !self.selected.contains(&value) {
                self.selected.push(value);
            }
        }
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_option(&self) -> Option<&SelectOption> {
        self.active
            .and_then(|i| self.visible_options().get(i).copied())
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn selected_values(&self) -> &[String] {
        self.committed()
    }

    /// Committed value in single-select mode.
    pub fn value(&self) -> Option<&str> {
        self.committed().first().map(String::as_str)
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.committed().iter().any(|v| v == value)
    }

    fn committed(&self) -> &[String] {
        if self.multiple {
            &self.selected
        } else {
            &self.selected[..self.selected.len().min(1)]
        }
    }

    /// Options currently listed: all of them, or the ones matching the
    /// search text in searchable mode. The option set itself never changes.
    pub fn visible_options(&self) -> Vec<&SelectOption> {
        if self.searchable && !self.query.is_empty() {
            self.options.iter().filter(|o| o.matches(&self.query)).collect()
        } else {
            self.options.iter().collect()
        }
    }

    /// Trigger text: the selected label(s) or the placeholder.
    pub fn display_text(&self, placeholder: &str) -> String {
        let labels: Vec<&str> = self
            .options
            .iter()
            .filter(|o| self.is_selected(&o.value))
            .map(|o| o.label.as_str())
            .collect();
        match labels.len() {
            0 => placeholder.to_string(),
            1 => labels[0].to_string(),
            n if self.multiple && n > 2 => format!("{} selected", n),
            _ => labels.join(", "),
        }
    }

    pub fn open(&mut self) {
        if self.disabled || self.open {
            return;
        }
        self.open = true;
        self.active = self.first_enabled();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.active = None;
        self.query.clear();
    }

    /// Trigger click.
    pub fn toggle_open(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Search input changed. Opens the list and resets the active option to
    /// the first enabled match.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        if !self.searchable || self.disabled {
            return;
        }
        self.query = query.into();
        self.open = true;
        self.active = self.first_enabled();
    }

    /// Replace the option set, keeping selections that still exist.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        let options = &self.options;
        self.selected
            .retain(|value| options.iter().any(|o| o.value == *value));
        if self.open {
            self.active = self.first_enabled();
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> SelectResponse {
        if self.disabled {
            return SelectResponse::default();
        }

        match event.key {
            Key::Enter => self.open_or_commit(),
            // In searchable mode Space is text for the search input.
            Key::Space if !self.searchable => self.open_or_commit(),
            Key::ArrowDown => {
                if self.open {
                    self.active = match self.active {
                        Some(i) => self.next_enabled(i).or(Some(i)),
                        None => self.first_enabled(),
                    };
                } else {
                    self.open();
                }
                SelectResponse::handled()
            }
            Key::ArrowUp if self.open => {
                self.active = match self.active {
                    Some(i) => self.prev_enabled(i).or(Some(i)),
                    None => self.first_enabled(),
                };
                SelectResponse::handled()
            }
            Key::Home if self.open => {
                self.active = self.first_enabled();
                SelectResponse::handled()
            }
            Key::End if self.open => {
                self.active = self.last_enabled();
                SelectResponse::handled()
            }
            Key::Escape => {
                self.close();
                SelectResponse {
                    handled: true,
                    focus_trigger: true,
                    ..SelectResponse::default()
                }
            }
            Key::Tab => {
                // Let focus move on normally.
                self.close();
                SelectResponse::default()
            }
            _ => match event.printable() {
                Some(c) if !self.searchable => {
                    self.type_ahead(c);
                    SelectResponse::handled()
                }
                _ => SelectResponse::default(),
            },
        }
    }

    /// Pointer selection of the visible option at `index`.
    pub fn click_option(&mut self, index: usize) -> SelectResponse {
        if self.disabled || !self.open {
            return SelectResponse::default();
        }
        let enabled = self
            .visible_options()
            .get(index)
            .is_some_and(|o| !o.disabled);
        if !enabled {
            return SelectResponse::handled();
        }
        self.active = Some(index);
        self.commit_active()
    }

    /// Pointer down anywhere outside the widget's root.
    pub fn handle_outside_click(&mut self) {
        if self.open || !self.query.is_empty() {
            self.close();
        }
    }

    /// Drop one value from a multi-select (chip removal).
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|v| v != value);
        self.selected.len() != before
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.committed().is_empty();
        self.selected.clear();
        changed
    }

    fn open_or_commit(&mut self) -> SelectResponse {
        if self.open {
            self.commit_active()
        } else {
            self.open();
            SelectResponse::handled()
        }
    }

    fn commit_active(&mut self) -> SelectResponse {
        let Some(option) = self.active_option() else {
            return SelectResponse::handled();
        };
        if option.disabled {
            return SelectResponse::handled();
        }
        let value = option.value.clone();

        if self.multiple {
            if !self.remove(&value) {
                self.selected.push(value);
            }
            return SelectResponse {
                handled: true,
                changed: true,
                focus_trigger: false,
            };
        }

        let changed = self.value() != Some(value.as_str());
        self.selected = vec![value];
        self.close();
        SelectResponse {
            handled: true,
            changed,
            focus_trigger: true,
        }
    }

    fn type_ahead(&mut self, c: char) {
        if !self.open {
            self.open();
        }
        let hit = self
            .visible_options()
            .iter()
            .position(|o| !o.disabled && o.starts_with_char(c));
        if hit.is_some() {
            self.active = hit;
        }
    }

    fn enabled_positions(&self) -> Vec<usize> {
        self.visible_options()
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.disabled)
            .map(|(i, _)| i)
            .collect()
    }

    fn first_enabled(&self) -> Option<usize> {
        self.enabled_positions().first().copied()
    }

    fn last_enabled(&self) -> Option<usize> {
        self.enabled_positions().last().copied()
    }

    fn next_enabled(&self, from: usize) -> Option<usize> {
        self.enabled_positions().into_iter().find(|i| *i > from)
    }

    fn prev_enabled(&self, from: usize) -> Option<usize> {
        self.enabled_positions().into_iter().rev().find(|i| *i < from)
    }
}
