//! Searchable combobox over a fixed option list.
//!
//! While open, typed text filters the options (case-insensitive substring) and
//! a highlight cursor picks among the matches. Only list entries can be
//! committed, so the selected value is never free text.

/// Filterable, keyboard-navigable option picker.
#[derive(Debug, Clone)]
pub struct SearchableSelector {
    options: Vec<String>,
    value: Option<String>,
    open: bool,
    query: String,
    highlight: usize,
}

impl SearchableSelector {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            value: None,
            open: false,
            query: String::new(),
            highlight: 0,
        }
    }

    /// Replace the option list. A committed value that is no longer offered is dropped.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        if let Some(value) = &self.value {
            if !self.options.contains(value) {
                self.value = None;
            }
        }
        self.clamp_highlight();
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    /// Options matching the current query, in list order.
    pub fn filtered(&self) -> Vec<&str> {
        let needle = self.query.to_lowercase();
        self.options
            .iter()
            .filter(|o| o.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Open with an empty query (full list) and the first entry highlighted.
    pub fn open(&mut self) {
        self.open = true;
        self.query.clear();
        self.highlight = 0;
    }

    /// Close without committing anything.
    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.highlight = 0;
    }

    /// Escape key.
    pub fn cancel(&mut self) {
        self.close();
    }

    /// Focus left the widget (tab away, click elsewhere).
    pub fn blur(&mut self) {
        self.close();
    }

    pub fn type_char(&mut self, c: char) {
        if !self.open {
            self.open();
        }
        self.query.push(c);
        self.highlight = 0;
    }

    pub fn backspace(&mut self) {
        if self.open {
            self.query.pop();
            self.highlight = 0;
        }
    }

    pub fn move_down(&mut self) {
        if !self.open {
            self.open();
            return;
        }
        let last = self.filtered().len().saturating_sub(1);
        self.highlight = (self.highlight + 1).min(last);
    }

    pub fn move_up(&mut self) {
        self.highlight = self.highlight.saturating_sub(1);
    }

    /// Enter key: commit the highlighted match and close. With no match the
    /// list stays open and nothing changes.
    pub fn commit(&mut self) -> Option<String> {
        if !self.open {
            return None;
        }
        let picked = self.filtered().get(self.highlight).map(|s| s.to_string())?;
        self.value = Some(picked.clone());
        self.close();
        Some(picked)
    }

    /// Click on the `index`-th visible match.
    pub fn click(&mut self, index: usize) -> Option<String> {
        let picked = self.filtered().get(index).map(|s| s.to_string())?;
        self.value = Some(picked.clone());
        self.close();
        Some(picked)
    }

    /// Commit the option equal to `wanted` ignoring case. Returns false when
    /// no option matches.
    pub fn select_value(&mut self, wanted: &str) -> bool {
        let wanted = wanted.trim().to_lowercase();
        match self.options.iter().find(|o| o.to_lowercase() == wanted) {
            Some(found) => {
                self.value = Some(found.clone());
                true
            }
            None => false,
        }
    }

    fn clamp_highlight(&mut self) {
        let last = self.filtered().len().saturating_sub(1);
        self.highlight = self.highlight.min(last);
    }
}
