use crate::assets::{DefinitionTable, ItemCategory};

pub const STATUS_IDLE: &str = "Click an item to start placing";
pub const STATUS_PLACING: &str = "Click on garden to place item";

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub type_id: String,
    pub display_name: String,
    pub category: ItemCategory,
}

/// Panel state: palette, status line and the collectible counter.
#[derive(Debug, Clone)]
pub struct UiState {
    palette: Vec<PaletteEntry>,
    status: String,
    found: u32,
    total: u32,
    summary: String,
}

impl UiState {
    pub fn new(definitions: &DefinitionTable) -> Self {
        let palette = definitions
            .palette()
            .map(|definition| PaletteEntry {
                type_id: definition.type_id.clone(),
                display_name: if definition.display_name.is_empty() {
                    definition.type_id.clone()
                } else {
                    definition.display_name.clone()
                },
                category: definition.category,
            })
            .collect();
        let mut ui = Self {
            palette,
            status: STATUS_IDLE.to_string(),
            found: 0,
            total: 0,
            summary: String::new(),
        };
        ui.refresh_summary();
        ui
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    pub fn palette_entry(&self, index: usize) -> Option<&PaletteEntry> {
        self.palette.get(index)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: &str) {
        if self.status != status {
            self.status = status.to_string();
            self.refresh_summary();
        }
    }

    pub fn reset_status(&mut self) {
        self.set_status(STATUS_IDLE);
    }

    pub fn collectibles(&self) -> (u32, u32) {
        (self.found, self.total)
    }

    pub fn set_collectible_total(&mut self, total: u32) {
        self.total = total;
        self.refresh_summary();
    }

    pub fn collectible_found(&mut self) {
        self.found += 1;
        self.refresh_summary();
    }

    /// One-line summary for the window title.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    fn refresh_summary(&mut self) {
        self.summary = if self.total > 0 {
            format!("{} | Gnomes: {}/{}", self.status, self.found, self.total)
        } else {
            self.status.clone()
        };
    }
}
