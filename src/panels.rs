//! Panel controller: exactly one visible panel at a time, plus the
//! orthogonal pinyin-visibility flag.

use serde::{Deserialize, Serialize};

use crate::surface::UiSurface;

/// The fixed set of mutually exclusive UI panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelId {
    License,
    Input,
    Definition,
    Debug,
    Storage,
}

impl PanelId {
    pub const ALL: [PanelId; 5] = [
        PanelId::License,
        PanelId::Input,
        PanelId::Definition,
        PanelId::Debug,
        PanelId::Storage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PanelId::License => "license",
            PanelId::Input => "input",
            PanelId::Definition => "definition",
            PanelId::Debug => "debug",
            PanelId::Storage => "storage",
        }
    }

    pub fn from_name(name: &str) -> Option<PanelId> {
        PanelId::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Finite-state controller over the panel set. Selecting a panel deselects
/// every other one; re-selecting the active panel is a valid no-op
/// transition. The pinyin flag never affects selection.
#[derive(Debug)]
pub struct PanelController {
    selected: PanelId,
    pinyin_visible: bool,
}

impl PanelController {
    /// Initial state: the license panel, pinyin hidden.
    pub fn new() -> Self {
        Self {
            selected: PanelId::License,
            pinyin_visible: false,
        }
    }

    pub fn selected(&self) -> PanelId {
        self.selected
    }

    pub fn pinyin_visible(&self) -> bool {
        self.pinyin_visible
    }

    pub fn select(&mut self, panel: PanelId, surface: &mut dyn UiSurface) {
        for candidate in PanelId::ALL {
            surface.set_panel_visible(candidate, candidate == panel);
        }
        self.selected = panel;
    }

    pub fn toggle_pinyin(&mut self, surface: &mut dyn UiSurface) -> bool {
        self.set_pinyin(!self.pinyin_visible, surface);
        self.pinyin_visible
    }

    pub fn set_pinyin(&mut self, visible: bool, surface: &mut dyn UiSurface) {
        self.pinyin_visible = visible;
        surface.set_pinyin_visible(visible);
    }

    /// Push the full current state to a surface (used once at startup).
    pub fn sync(&self, surface: &mut dyn UiSurface) {
        for candidate in PanelId::ALL {
            surface.set_panel_visible(candidate, candidate == self.selected);
        }
        surface.set_pinyin_visible(self.pinyin_visible);
    }
}

impl Default for PanelController {
    fn default() -> Self {
        Self::new()
    }
}
