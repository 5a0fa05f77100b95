use hushbox_core::{Catalog, Sound};
use ratatui::widgets::ListState;

/// One line of the sound list
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRow {
    Header(String),
    Sound(Sound),
}

/// Sound list navigation and the custom track input
#[derive(Debug, Clone)]
pub struct CatalogState {
    pub rows: Vec<CatalogRow>,
    pub list_state: ListState,
    /// Custom track URL being typed
    pub input: String,
}

impl CatalogState {
    pub fn new(catalog: &Catalog) -> Self {
        let rows: Vec<CatalogRow> = catalog
            .categories()
            .iter()
            .flat_map(|category| {
                std::iter::once(CatalogRow::Header(category.name.clone()))
                    .chain(category.sounds.iter().cloned().map(CatalogRow::Sound))
            })
            .collect();

        let mut state = Self {
            rows,
            list_state: ListState::default(),
            input: String::new(),
        };
        state.select_from(0, true);
        state
    }

    /// Select the first sound row at or after `start`, wrapping around.
    fn select_from(&mut self, start: usize, forward: bool) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        for offset in 0..len {
            let i = if forward {
                (start + offset) % len
            } else {
                (start + len - offset) % len
            };
            if matches!(self.rows[i], CatalogRow::Sound(_)) {
                self.list_state.select(Some(i));
                return;
            }
        }
    }

    pub fn next(&mut self) {
        let start = self.list_state.selected().map_or(0, |i| i + 1);
        self.select_from(start, true);
    }

    pub fn prev(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let start = self.list_state.selected().map_or(0, |i| (i + len - 1) % len);
        self.select_from(start, false);
    }

    pub fn selected_sound(&self) -> Option<&Sound> {
        match self.rows.get(self.list_state.selected()?)? {
            CatalogRow::Sound(sound) => Some(sound),
            CatalogRow::Header(_) => None,
        }
    }

    /// Take the typed URL, leaving the input empty
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }
}
