use strum::{EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, strum::Display)]
pub enum SettingsOption {
    #[strum(to_string = "Fade out")]
    FadeOut,
    #[strum(to_string = "Player layout")]
    Layout,
}

#[derive(Debug, Clone)]
pub struct SettingsState {
    pub items: Vec<SettingsOption>,
    pub selected_index: usize,
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            items: SettingsOption::iter().collect(),
            selected_index: 0,
        }
    }

    pub fn selected(&self) -> Option<SettingsOption> {
        self.items.get(self.selected_index).copied()
    }

    pub fn next_item(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.items.len();
        }
    }

    pub fn prev_item(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = (self.selected_index + self.items.len() - 1) % self.items.len();
        }
    }
}
